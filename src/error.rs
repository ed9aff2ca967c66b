use thiserror::Error;

/// Errors surfaced by the history engine and its collaborators. Nothing is
/// retried internally: caller input problems fail fast, storage failures
/// propagate verbatim.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Caller-supplied input failed a check (window bounds, batch contents,
    /// timestamp syntax).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The queried item was never logged.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Propagated from the snapshot log store.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// I/O outside the store: batch files, database directories.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file or platform directory resolution problems.
    #[error("configuration error: {0}")]
    Config(String),
}
