//! Output writers
//!
//! The collected result set is handed off here as a read-only snapshot and
//! written as a JSON array and a CSV file sharing one base name.

pub mod csv;
pub mod json;

pub use csv::write_csv_report;
pub use json::write_json_report;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
