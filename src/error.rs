//! Error types for the contract report generator.

use thiserror::Error;

/// Result type alias using [`ReportError`].
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// I/O error (missing input file, unwritable output directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No record carries the requested contractor id.
    #[error("no contractor with NIF {nif}")]
    ContractorNotFound { nif: String },

    /// Evolution range where the start year comes after the end year.
    #[error("invalid year range {start}..={end}")]
    InvalidYearRange { start: i32, end: i32 },

    /// Chart drawing or image encoding failed.
    #[error("chart error: {0}")]
    Chart(String),
}

impl ReportError {
    pub fn contractor_not_found(nif: impl Into<String>) -> Self {
        ReportError::ContractorNotFound { nif: nif.into() }
    }

    /// True when the error is an I/O "not found", i.e. the input file is absent.
    pub fn is_missing_file(&self) -> bool {
        match self {
            ReportError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            ReportError::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::NotFound,
                _ => false,
            },
            _ => false,
        }
    }
}
