// crates/reviewtrend-parser/src/errors.rs

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("review table format mismatch: {reason}")]
    FormatMismatch { reason: String },

    #[error("review table header invalid: {message}")]
    InvalidHeader { message: String },

    #[error("review table CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("review table line {line_number} column '{column}' invalid: {message}")]
    DataRow {
        line_number: usize,
        column: &'static str,
        message: String,
    },

    #[error("review table did not contain any data rows")]
    EmptyData,

    #[error("failed to build review dataframe: {0}")]
    Frame(#[from] PolarsError),
}

impl From<csv::Error> for ParserError {
    fn from(source: csv::Error) -> Self {
        ParserError::Csv { source }
    }
}
