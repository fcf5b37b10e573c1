use crate::error::{EngineError, EngineResult};

/// A key/value pair copied out of the engine.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Iterator over every entry visible to a transaction, in key order.
pub type EntryIter<'a> = Box<dyn Iterator<Item = EngineResult<Entry>> + 'a>;

/// Operations available inside a read-only transaction.
pub trait ReadTxn {
    /// Fetch the value stored under `key`, fully copied out.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>>;

    /// Iterate every entry in the transaction's snapshot.
    ///
    /// Values are always read in full; there is no key-only mode.
    fn entries(&self) -> EngineResult<EntryIter<'_>>;
}

/// Operations available inside a read-write transaction.
pub trait WriteTxn: ReadTxn {
    /// Store `value` under `key`, replacing any existing value.
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()>;

    /// Remove `key`. Returns `true` if the key existed.
    ///
    /// Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> EngineResult<bool>;
}

/// Embedded, transactional, ordered key-value engine.
///
/// Implementations must satisfy these invariants:
/// - `read_txn` closures observe a snapshot that concurrent writers cannot
///   change underneath them.
/// - `write_txn` commits everything the closure did if and only if the
///   closure returns `Ok`. An `Err` from the closure aborts the transaction.
/// - Engine failures are surfaced, never swallowed or retried.
///
/// The closure's error type only has to absorb [`EngineError`], so callers can
/// return their own error types (decoding failures, missing keys) from inside
/// the transaction.
pub trait StorageEngine: Send + Sync {
    /// Run `f` inside a read-only transaction.
    fn read_txn<R, E>(&self, f: impl FnOnce(&dyn ReadTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>;

    /// Run `f` inside a read-write transaction and commit if it succeeds.
    fn write_txn<R, E>(&self, f: impl FnOnce(&mut dyn WriteTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>;
}
