use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that abort an extraction or a submission.
///
/// Row-level validation problems and per-record rejections are not errors:
/// they are collected in [`ExtractionResult`](crate::model::ExtractionResult)
/// and [`SubmissionReport`](crate::model::SubmissionReport) instead.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization or parsing fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up while decoding the cells of a sheet.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an existing file cannot be opened as an xlsx workbook.
    #[error("cannot open workbook {path}: {source}")]
    UnreadableWorkbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// Raised when the workbook has no sheet with the requested name.
    #[error("workbook has no sheet named '{0}'")]
    MissingSheet(String),

    /// Raised when the accounting application cannot be reached at all.
    #[error("cannot reach the accounting application: {0}")]
    Connection(String),

    /// Raised when a workbook holds no importable payment terms.
    #[error("no payment terms found in {0}")]
    NothingToImport(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification of [`ToolError`] used when reporting to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input file is missing or unreadable.
    File,
    /// The workbook does not have the expected structure.
    Format,
    /// The accounting application is unreachable.
    Connection,
    Other,
}

impl ToolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ToolError::MissingInput(_) | ToolError::UnreadableWorkbook { .. } | ToolError::Io(_) => {
                ErrorCategory::File
            }
            ToolError::MissingSheet(_) | ToolError::ExcelRead(_) => ErrorCategory::Format,
            ToolError::Connection(_) => ErrorCategory::Connection,
            ToolError::Json(_)
            | ToolError::ExcelWrite(_)
            | ToolError::NothingToImport(_)
            | ToolError::Logging(_) => ErrorCategory::Other,
        }
    }
}
