use revstore_engine::EngineError;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value is stored under the identifier.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The payload or the stored envelope could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A revision string could not be parsed or does not match its object.
    #[error("revision error: {0}")]
    Revision(#[from] RevisionError),

    /// The storage engine failed to open, read, or commit.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from computing, parsing, or checking revisions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevisionError {
    #[error("malformed revision {revision:?}: {reason}")]
    Malformed { revision: String, reason: String },

    #[error("cannot serialize payload for hashing: {0}")]
    Payload(String),

    #[error("hash mismatch: revision records {recorded}, payload hashes to {computed}")]
    HashMismatch { recorded: String, computed: String },

    #[error("sequence {sequence} does not match history length {history_len}")]
    SequenceMismatch { sequence: u64, history_len: usize },

    #[error("latest history entry {latest:?} does not match revision {revision}")]
    HistoryMismatch {
        revision: String,
        latest: Option<String>,
    },
}
