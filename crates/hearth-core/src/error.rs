//! Error types for Hearth

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// A required column is absent, or a cell holds a value of the wrong type
    #[error("Malformed input at row {row}, field '{field}': {reason}")]
    MalformedInput {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("Malformed date at row {row}: '{value}' (expected dd/mm/YYYY)")]
    MalformedDate { row: usize, value: String },

    #[error("Unknown property type code at row {row}: '{code}'")]
    UnknownPropertyType { row: usize, code: String },

    /// A named suburb or quarter is absent from an aggregate table
    #[error("Lookup failed in {stage}: '{key}' not found")]
    MissingLookup { stage: &'static str, key: String },

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
