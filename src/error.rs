use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the pipeline
///
/// Per-row problems (bad timestamps, bad volumes) are never errors; they are
/// dropped or coerced inside the normalizer. Everything here aborts the
/// operation that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// A required logical field has no matching column anywhere in the snapshot
    #[error("missing column for '{field}' (accepted names: {})", .aliases.join(", "))]
    MissingColumn { field: String, aliases: Vec<String> },

    /// No record in the current snapshot carries this label
    #[error("no record matches '{0}'")]
    UnknownLabel(String),

    /// Delete attempted without the confirmation flag
    #[error("deletion of '{label}' was not confirmed")]
    NotConfirmed { label: String },

    /// Invalid user input or request parameter
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Row number outside the data rows of the store
    #[error("row {row_number} is outside the data rows (2..={last_row})")]
    RowOutOfRange { row_number: usize, last_row: usize },

    /// Failure reported by a row store backend
    #[error("store error: {0}")]
    Store(String),

    /// Chart rendering or spreadsheet export failure
    #[error("export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by the request rather than the backend
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownLabel(_)
                | Error::NotConfirmed { .. }
                | Error::InvalidInput(_)
                | Error::RowOutOfRange { .. }
        )
    }
}
