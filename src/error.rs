use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while a
/// workbook is read, reshaped, and written out as CSV.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a JSON catalog cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV writer.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the finished CSV could not be moved over its destination.
    #[error("failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Raised when the user provides a path that does not exist.
    #[error("Excel file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the workbook has no sheet with the requested name.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a sheet lacks one or more of the mapped source headers.
    #[error("Sheet '{sheet}' missing columns: {}", .missing.join(", "))]
    MissingColumns { sheet: String, missing: Vec<String> },

    /// Raised when a `--sheet` filter names no catalog entry.
    #[error("sheet '{0}' is not part of the conversion catalog")]
    UnknownSheet(String),

    /// Raised when a catalog file is structurally unusable.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
