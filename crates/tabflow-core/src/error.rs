// crates/tabflow-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("fetch failed for '{url}': {detail}")]
    Fetch { url: String, detail: String },

    #[error("failed to parse source '{source_name}': {detail}")]
    Parse { source_name: String, detail: String },

    #[error("missing column '{column}': {detail}")]
    MissingColumn { column: String, detail: String },

    #[error("reference mapping has no entry for key '{key}'")]
    UnknownKey { key: String },

    #[error("column '{column}' contains non-numeric value '{value}'")]
    Format { column: String, value: String },

    #[error("storage failure: {detail}")]
    Storage { detail: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataframe operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        EtlError::Storage {
            detail: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
