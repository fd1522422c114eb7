use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that can occur while roster workbooks
/// are consolidated, queried, or exported.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors raised while reading or writing the canonical CSV table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a sheet cannot be interpreted as a grid of records.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a lookup date is malformed or out of range.
    #[error("invalid date '{0}': expected MM-DD or YYYY-MM-DD")]
    InvalidDate(String),

    /// Raised when a file handed to the intake is not a spreadsheet.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
