pub mod loader;
pub mod table;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("invalid value {value:?} for {instrument} on row {row}")]
    InvalidValue {
        instrument: String,
        row: usize,
        value: String,
    },
    #[error("no data rows found")]
    Empty,
    #[error("table error: {0}")]
    Table(#[from] table::TableError),
}

pub type Result<T> = std::result::Result<T, DataError>;
