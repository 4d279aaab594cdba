// crates/reviewtrend-core/src/validation.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use tracing::info;

use crate::error::ValidationError;
use crate::types::ReviewRecord;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Largest magnitude below which every whole `f64` is exact.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Inclusive calendar window `[start, end]` applied to loaded reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Reads the raw review table into typed records.
///
/// The table must list reviews newest first (dates non-increasing in row
/// order) and every row must carry `stars`. Accepted records come back in
/// ascending date order, rows sharing a date keeping their table order, and
/// restricted to `window`.
pub fn load_records(
    table: &DataFrame,
    window: &DateWindow,
) -> Result<Vec<ReviewRecord>, ValidationError> {
    let dates = date_values(table)?;
    let stars = integer_values(table, "stars")?;
    let employed = flag_values(table, "employed")?;
    let technical = flag_values(table, "technical")?;
    let recommends = flag_values(table, "recommends")?;
    let outlook = integer_values(table, "outlook")?;
    let ceo_opinion = integer_values(table, "ceo_opinion")?;
    let years = integer_values(table, "years")?;

    let mut records = Vec::with_capacity(table.height());
    let mut previous: Option<NaiveDate> = None;

    for row in 0..table.height() {
        let date = dates[row].ok_or(ValidationError::MissingDate { row })?;
        if let Some(previous) = previous {
            if date > previous {
                return Err(ValidationError::NotMonotonic {
                    row,
                    previous,
                    current: date,
                });
            }
        }
        previous = Some(date);

        let stars = stars[row].ok_or(ValidationError::MissingStars { row })?;
        if !(1..=5).contains(&stars) {
            return Err(ValidationError::OutOfRange {
                row,
                column: "stars",
                value: stars,
                expected: "1..=5",
            });
        }

        let years_employed = match years[row] {
            Some(value) if value < 0 || value > i64::from(u32::MAX) => {
                return Err(ValidationError::OutOfRange {
                    row,
                    column: "years",
                    value,
                    expected: "a non-negative count",
                });
            }
            other => other.map(|value| value as u32),
        };

        records.push(ReviewRecord {
            source_row: row,
            timestamp: date.and_time(NaiveTime::MIN),
            stars: stars as u8,
            employed: employed[row],
            technical: technical[row],
            recommends: recommends[row],
            outlook: opinion(row, "outlook", outlook[row])?,
            ceo_opinion: opinion(row, "ceo_opinion", ceo_opinion[row])?,
            years_employed,
        });
    }

    let total = records.len();
    records.sort_by_key(|record| record.timestamp);
    records.retain(|record| window.contains(record.timestamp.date()));

    info!(
        rows = total,
        kept = records.len(),
        start = %window.start,
        end = %window.end,
        "Validated review table"
    );

    Ok(records)
}

fn opinion(row: usize, column: &'static str, value: Option<i64>) -> Result<Option<i8>, ValidationError> {
    match value {
        Some(v @ -1..=1) => Ok(Some(v as i8)),
        Some(v) => Err(ValidationError::OutOfRange {
            row,
            column,
            value: v,
            expected: "{-1, 0, 1}",
        }),
        None => Ok(None),
    }
}

fn column<'a>(table: &'a DataFrame, name: &'static str) -> Result<&'a Series, ValidationError> {
    table
        .column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| ValidationError::MissingColumn(name))
}

/// Integer view of a column. Integer columns widen losslessly, float columns
/// must hold whole numbers and string cells must parse as integers.
fn integer_values(
    table: &DataFrame,
    name: &'static str,
) -> Result<Vec<Option<i64>>, ValidationError> {
    let series = column(table, name)?;
    match series.dtype() {
        dtype if dtype.is_integer() => {
            let widened = series.strict_cast(&DataType::Int64)?;
            let values = widened.i64()?.into_iter().collect();
            Ok(values)
        }
        dtype if dtype.is_float() => {
            let widened = series.cast(&DataType::Float64)?;
            let values = widened
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT => {
                        Ok(Some(v as i64))
                    }
                    Some(v) => Err(ValidationError::InvalidValue {
                        row,
                        column: name,
                        value: v.to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(values)
        }
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => text.parse::<i64>().map(Some).map_err(|_| {
                    ValidationError::InvalidValue {
                        row,
                        column: name,
                        value: text.to_string(),
                    }
                }),
            })
            .collect(),
        DataType::Null => Ok(vec![None; series.len()]),
        other => Err(ValidationError::UnsupportedColumnType {
            column: name,
            dtype: other.to_string(),
        }),
    }
}

/// Boolean view of a column. Besides boolean columns, accepts 0/1 integers
/// and true/false or yes/no text.
fn flag_values(
    table: &DataFrame,
    name: &'static str,
) -> Result<Vec<Option<bool>>, ValidationError> {
    let series = column(table, name)?;
    match series.dtype() {
        DataType::Boolean => {
            let values = series.bool()?.into_iter().collect();
            Ok(values)
        }
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => flag_from_text(text).map(Some).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        row,
                        column: name,
                        value: text.to_string(),
                    }
                }),
            })
            .collect(),
        _ => integer_values(table, name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                Some(other) => Err(ValidationError::InvalidValue {
                    row,
                    column: name,
                    value: other.to_string(),
                }),
            })
            .collect(),
    }
}

fn flag_from_text(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn date_values(table: &DataFrame) -> Result<Vec<Option<NaiveDate>>, ValidationError> {
    let series = column(table, "date")?;
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            let dates = days
                .i32()?
                .into_iter()
                .map(|value| value.and_then(date_from_epoch_days))
                .collect();
            Ok(dates)
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            let dates = raw
                .i64()?
                .into_iter()
                .map(|value| value.and_then(|v| datetime_from_epoch(v, unit)).map(|dt| dt.date()))
                .collect();
            Ok(dates)
        }
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| ValidationError::InvalidDate {
                        row,
                        value: text.to_string(),
                    }),
            })
            .collect(),
        other => Err(ValidationError::UnsupportedColumnType {
            column: "date",
            dtype: other.to_string(),
        }),
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn datetime_from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    dt.map(|dt| dt.naive_utc())
}
