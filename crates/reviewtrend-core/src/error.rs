// crates/reviewtrend-core/src/error.rs

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use reviewtrend_parser::ParserError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dual_band_filter::FilterError;
use crate::statistics::StatisticsError;

/// Malformed or incomplete input. Raised before any imputation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("review table is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("column '{column}' has unsupported type {dtype}")]
    UnsupportedColumnType { column: &'static str, dtype: String },

    #[error("row {row}: date is missing")]
    MissingDate { row: usize },

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: stars value is missing")]
    MissingStars { row: usize },

    #[error(
        "row {row}: date {current} follows {previous}; rows must be ordered newest first"
    )]
    NotMonotonic {
        row: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("row {row}: {column} value {value} outside {expected}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: i64,
        expected: &'static str,
    },

    #[error("row {row}: {column} value '{value}' is not a valid {column}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("window start {start} is after window end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Too many reviews share a calendar day to give each its own grid instant.
#[derive(Debug, Error)]
#[error("{group_size} reviews on {date} exceed the {capacity} distinct instants available per day")]
pub struct CapacityError {
    pub date: NaiveDate,
    pub group_size: usize,
    pub capacity: usize,
}

#[derive(Debug, Error)]
#[error("{stage} requires at least {minimum} points, got {available}")]
pub struct InsufficientDataError {
    pub stage: &'static str,
    pub available: usize,
    pub minimum: usize,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Parsing failed: {0}")]
    Parser(#[from] ParserError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Timestamp disambiguation failed: {0}")]
    Capacity(#[from] CapacityError),

    #[error("Insufficient data: {0}")]
    InsufficientData(#[from] InsufficientDataError),

    #[error("Filtering failed: {0}")]
    Filter(FilterError),

    #[error("Statistics failed: {0}")]
    Statistics(#[from] StatisticsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// A grid too short to filter surfaces like any other shortage of data.
impl From<FilterError> for PipelineError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InsufficientData(inner) => PipelineError::InsufficientData(inner),
            other => PipelineError::Filter(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
