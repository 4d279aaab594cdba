pub mod errors;
pub mod schema;
mod table;

pub use errors::ParserError;
pub use schema::{ColumnKind, ReviewColumn, REVIEW_COLUMNS};
pub use table::parse_review_table;
