use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{StringRecord, Trim};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::schema::{ColumnKind, ReviewColumn};

/// Days between 0001-01-01 and 1970-01-01, the physical origin of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone)]
enum ColumnBuffer {
    Date(Vec<Option<i32>>),
    Integer(Vec<Option<i64>>),
    Flag(Vec<Option<bool>>),
}

impl ColumnBuffer {
    fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Date => ColumnBuffer::Date(Vec::new()),
            ColumnKind::Integer | ColumnKind::Opinion => ColumnBuffer::Integer(Vec::new()),
            ColumnKind::Flag => ColumnBuffer::Flag(Vec::new()),
        }
    }

    fn push(
        &mut self,
        column: ReviewColumn,
        raw: &str,
        line_number: usize,
    ) -> Result<(), ParserError> {
        match (column.kind(), self) {
            (ColumnKind::Date, ColumnBuffer::Date(values)) => {
                values.push(parse_optional_date(column, raw, line_number)?);
            }
            (ColumnKind::Integer, ColumnBuffer::Integer(values)) => {
                values.push(parse_optional_i64(column, raw, line_number)?);
            }
            (ColumnKind::Opinion, ColumnBuffer::Integer(values)) => {
                values.push(parse_optional_opinion(column, raw, line_number)?);
            }
            (ColumnKind::Flag, ColumnBuffer::Flag(values)) => {
                values.push(parse_optional_flag(column, raw, line_number)?);
            }
            _ => unreachable!("column buffer created for a different column kind"),
        }
        Ok(())
    }

    fn into_column(self, name: &'static str) -> Result<Column, PolarsError> {
        let series = match self {
            ColumnBuffer::Date(days) => Series::new(name.into(), days).cast(&DataType::Date)?,
            ColumnBuffer::Integer(values) => Series::new(name.into(), values),
            ColumnBuffer::Flag(values) => Series::new(name.into(), values),
        };
        Ok(series.into())
    }
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(Trim::All);
    builder
}

/// Parses delimited review text into a typed table with one row per review.
///
/// Cells are only checked for syntax here. Empty cells become nulls and the
/// table keeps the row order of the input; ordering and required-field rules
/// belong to the validator downstream.
pub fn parse_review_table(content: &str) -> Result<DataFrame, ParserError> {
    let mut reader = reader_builder().from_reader(content.as_bytes());
    let mut records = reader.records();

    let header = records.next().ok_or(ParserError::FormatMismatch {
        reason: "input missing header row".to_string(),
    })??;
    let roles = classify_header(&header)?;

    let mut buffers: Vec<ColumnBuffer> = roles
        .iter()
        .map(|column| ColumnBuffer::for_kind(column.kind()))
        .collect();
    let mut row_count = 0usize;

    for (row_idx, record) in records.enumerate() {
        let record = record?;
        let line_number = row_idx + 2;

        if record.iter().all(str::is_empty) {
            continue;
        }

        if record.len() != roles.len() {
            return Err(ParserError::FormatMismatch {
                reason: format!(
                    "line {line_number} has {} fields, expected {}",
                    record.len(),
                    roles.len()
                ),
            });
        }

        for (idx, column) in roles.iter().enumerate() {
            let value = record.get(idx).unwrap_or("");
            buffers[idx].push(*column, value, line_number)?;
        }

        row_count += 1;
    }

    if row_count == 0 {
        return Err(ParserError::EmptyData);
    }

    let mut slots: Vec<Option<ColumnBuffer>> = buffers.into_iter().map(Some).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(ReviewColumn::ALL.len());
    for column in ReviewColumn::ALL {
        let position = roles
            .iter()
            .position(|role| *role == column)
            .ok_or_else(|| ParserError::FormatMismatch {
                reason: format!("missing column '{column}'"),
            })?;
        let buffer = slots[position]
            .take()
            .ok_or_else(|| ParserError::InvalidHeader {
                message: format!("column '{column}' consumed twice"),
            })?;
        columns.push(buffer.into_column(column.canonical_name())?);
    }

    Ok(DataFrame::new(columns)?)
}

fn classify_header(header: &StringRecord) -> Result<Vec<ReviewColumn>, ParserError> {
    let mut roles = Vec::with_capacity(header.len());
    for name in header.iter() {
        let column = ReviewColumn::from_header(name).ok_or_else(|| ParserError::FormatMismatch {
            reason: format!("unrecognized column '{name}'"),
        })?;
        if roles.contains(&column) {
            return Err(ParserError::InvalidHeader {
                message: format!("column '{column}' appears more than once"),
            });
        }
        roles.push(column);
    }

    let missing: Vec<&str> = ReviewColumn::ALL
        .iter()
        .filter(|column| !roles.contains(column))
        .map(|column| column.canonical_name())
        .collect();
    if !missing.is_empty() {
        return Err(ParserError::FormatMismatch {
            reason: format!("missing columns: {}", missing.join(", ")),
        });
    }

    Ok(roles)
}

fn is_null_cell(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null")
}

pub(crate) fn parse_optional_date(
    column: ReviewColumn,
    value: &str,
    line_number: usize,
) -> Result<Option<i32>, ParserError> {
    static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];
    static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    if is_null_cell(value) {
        return Ok(None);
    }

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ParserError::DataRow {
            line_number,
            column: column.canonical_name(),
            message: format!("invalid date '{value}'"),
        })?;

    Ok(Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
}

pub(crate) fn parse_optional_i64(
    column: ReviewColumn,
    value: &str,
    line_number: usize,
) -> Result<Option<i64>, ParserError> {
    if is_null_cell(value) {
        return Ok(None);
    }

    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(Some(parsed));
    }

    // Spreadsheet exports write integer columns holding blanks as floats ("4.0").
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(Some(parsed as i64)),
        _ => Err(ParserError::DataRow {
            line_number,
            column: column.canonical_name(),
            message: format!("failed to parse '{value}' as integer"),
        }),
    }
}

pub(crate) fn parse_optional_flag(
    column: ReviewColumn,
    value: &str,
    line_number: usize,
) -> Result<Option<bool>, ParserError> {
    if is_null_cell(value) {
        return Ok(None);
    }

    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Ok(Some(true)),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Ok(Some(false)),
        other => Err(ParserError::DataRow {
            line_number,
            column: column.canonical_name(),
            message: format!("failed to parse '{other}' as flag"),
        }),
    }
}

/// Accepts the numeric encoding (-1/0/1) or the wording used by review sites.
pub(crate) fn parse_optional_opinion(
    column: ReviewColumn,
    value: &str,
    line_number: usize,
) -> Result<Option<i64>, ParserError> {
    match value.to_ascii_lowercase().as_str() {
        "positive" | "approve" | "approves" => Ok(Some(1)),
        "neutral" | "no opinion" => Ok(Some(0)),
        "negative" | "disapprove" | "disapproves" => Ok(Some(-1)),
        _ => parse_optional_i64(column, value, line_number),
    }
}
