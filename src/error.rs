//! Error type shared by the loader and the RFM pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfmError {
    #[error("transaction dataset is empty")]
    EmptyDataset,

    #[error("record {row}: required field '{field}' is missing")]
    MissingField { row: usize, field: &'static str },

    #[error("column '{column}' not found in input")]
    MissingColumn { column: String },

    #[error("record {row}: cannot parse {field} value '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
