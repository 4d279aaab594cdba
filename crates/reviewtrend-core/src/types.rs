// crates/reviewtrend-core/src/types.rs

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Numeric view of a review. Booleans read as 0.0 / 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Stars,
    Employed,
    Technical,
    Recommends,
    Outlook,
    CeoOpinion,
    YearsEmployed,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Stars,
        Field::Employed,
        Field::Technical,
        Field::Recommends,
        Field::Outlook,
        Field::CeoOpinion,
        Field::YearsEmployed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Stars => "stars",
            Field::Employed => "employed",
            Field::Technical => "technical",
            Field::Recommends => "recommends",
            Field::Outlook => "outlook",
            Field::CeoOpinion => "ceo_opinion",
            Field::YearsEmployed => "years_employed",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated review, before imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub source_row: usize,
    pub timestamp: NaiveDateTime,
    pub stars: u8,
    pub employed: Option<bool>,
    pub technical: Option<bool>,
    pub recommends: Option<bool>,
    pub outlook: Option<i8>,
    pub ceo_opinion: Option<i8>,
    pub years_employed: Option<u32>,
}

/// A review after imputation. `recommends` is fractional so an undecided
/// reviewer contributes 0.5 when averaged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    pub source_row: usize,
    pub timestamp: NaiveDateTime,
    pub stars: u8,
    pub employed: Option<bool>,
    pub technical: Option<bool>,
    pub recommends: f64,
    pub outlook: i8,
    pub ceo_opinion: i8,
    pub years_employed: Option<u32>,
}

impl CleanedRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Stars => Some(f64::from(self.stars)),
            Field::Employed => self.employed.map(flag_value),
            Field::Technical => self.technical.map(flag_value),
            Field::Recommends => Some(self.recommends),
            Field::Outlook => Some(f64::from(self.outlook)),
            Field::CeoOpinion => Some(f64::from(self.ceo_opinion)),
            Field::YearsEmployed => self.years_employed.map(f64::from),
        }
    }
}

pub fn flag_value(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Spacing of the disambiguated timestamps and of the resampled grid.
/// Always positive and no longer than one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStep(Duration);

impl GridStep {
    pub const MINUTES_PER_DAY: i64 = 24 * 60;

    pub fn from_minutes(minutes: i64) -> Option<Self> {
        if minutes <= 0 || minutes > Self::MINUTES_PER_DAY {
            return None;
        }
        Some(Self(Duration::minutes(minutes)))
    }

    pub fn hourly() -> Self {
        Self(Duration::hours(1))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Number of distinct grid instants that fit in one calendar day.
    pub fn per_day(&self) -> usize {
        (Duration::days(1).num_seconds() / self.seconds()) as usize
    }

    /// Offset of `to` from `from`, in (possibly fractional) grid units.
    pub fn units_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        (to - from).num_seconds() as f64 / self.seconds() as f64
    }

    pub fn nth_after(&self, origin: NaiveDateTime, n: usize) -> NaiveDateTime {
        origin + Duration::seconds(self.seconds() * n as i64)
    }
}

impl Default for GridStep {
    fn default() -> Self {
        Self::hourly()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    pub field: Field,
    pub values: Vec<f64>,
}

/// Fixed-step series with one value per channel at every index instant.
/// Shared shape of the resampled grid and both filtered bands.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    pub step: GridStep,
    pub index: Vec<NaiveDateTime>,
    pub channels: Vec<ChannelSeries>,
}

impl TimeGrid {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.channels.iter().map(|channel| channel.field).collect()
    }

    pub fn channel(&self, field: Field) -> Option<&[f64]> {
        self.channels
            .iter()
            .find(|channel| channel.field == field)
            .map(|channel| channel.values.as_slice())
    }

    /// Row view: the instant and every channel's value at `idx`.
    pub fn row(&self, idx: usize) -> Option<(NaiveDateTime, Vec<(Field, f64)>)> {
        let timestamp = *self.index.get(idx)?;
        let values = self
            .channels
            .iter()
            .filter_map(|channel| channel.values.get(idx).map(|value| (channel.field, *value)))
            .collect();
        Some((timestamp, values))
    }

    /// Column-oriented export: a `timestamp` column followed by one `f64`
    /// column per channel.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let micros: Vec<i64> = self.index.iter().copied().map(naive_to_micros).collect();
        let timestamp = Series::new("timestamp".into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

        let mut columns: Vec<Column> = Vec::with_capacity(self.channels.len() + 1);
        columns.push(timestamp.into());
        for channel in &self.channels {
            columns.push(Series::new(channel.field.as_str().into(), channel.values.clone()).into());
        }

        DataFrame::new(columns)
    }
}

/// Column-oriented export of cleaned records for raw-point overlays.
pub fn cleaned_to_dataframe(records: &[CleanedRecord]) -> Result<DataFrame, PolarsError> {
    let micros: Vec<i64> = records
        .iter()
        .map(|record| naive_to_micros(record.timestamp))
        .collect();
    let timestamp = Series::new("timestamp".into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let stars: Vec<i64> = records.iter().map(|r| i64::from(r.stars)).collect();
    let employed: Vec<Option<bool>> = records.iter().map(|r| r.employed).collect();
    let technical: Vec<Option<bool>> = records.iter().map(|r| r.technical).collect();
    let recommends: Vec<f64> = records.iter().map(|r| r.recommends).collect();
    let outlook: Vec<i64> = records.iter().map(|r| i64::from(r.outlook)).collect();
    let ceo_opinion: Vec<i64> = records.iter().map(|r| i64::from(r.ceo_opinion)).collect();
    let years: Vec<Option<i64>> = records
        .iter()
        .map(|r| r.years_employed.map(i64::from))
        .collect();

    DataFrame::new(vec![
        timestamp.into(),
        Series::new(Field::Stars.as_str().into(), stars).into(),
        Series::new(Field::Employed.as_str().into(), employed).into(),
        Series::new(Field::Technical.as_str().into(), technical).into(),
        Series::new(Field::Recommends.as_str().into(), recommends).into(),
        Series::new(Field::Outlook.as_str().into(), outlook).into(),
        Series::new(Field::CeoOpinion.as_str().into(), ceo_opinion).into(),
        Series::new(Field::YearsEmployed.as_str().into(), years).into(),
    ])
}

pub fn naive_to_micros(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_micros()
}
