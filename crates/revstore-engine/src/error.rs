use std::path::PathBuf;

/// Errors from storage engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine could not be opened at the configured location.
    #[error("failed to open storage engine at {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// A transaction could not be started.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The engine failed to read or write inside a transaction.
    #[error("storage error: {0}")]
    Storage(String),

    /// A read-write transaction failed to commit.
    #[error("commit error: {0}")]
    Commit(String),

    /// I/O error while preparing the engine location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
