use crate::error::StoreResult;
use crate::object::Object;

/// Versioned CRUD over objects carrying a payload of type `T`.
///
/// All operations are synchronous and rely on the underlying engine's
/// transaction isolation; implementations add no locking of their own.
pub trait Datastore<T>: Send + Sync {
    /// Identifiers of every object in `environment` whose type is `kind`,
    /// or any type when `kind` is `"all"`.
    ///
    /// Reads every stored value inside one read-only transaction. An empty
    /// result is not an error. A single value that cannot be decoded as an
    /// envelope of `T` aborts the scan with a serialization error.
    fn read_all(&self, environment: &str, kind: &str) -> StoreResult<Vec<String>>;

    /// Read the object stored under `identifier`.
    ///
    /// Returns `StoreError::NotFound` if nothing is stored there.
    fn read(&self, identifier: &str) -> StoreResult<Object<T>>;

    /// Advance the object's revision, append it to the history, and store the
    /// envelope under `identifier`. Returns the object as written.
    ///
    /// The next revision is derived from `object.revision` as supplied by the
    /// caller, not from what is currently stored. There is no
    /// compare-and-swap: any existing value is overwritten, so a caller
    /// holding a stale object silently replaces newer history.
    fn write(&self, identifier: &str, object: Object<T>) -> StoreResult<Object<T>>;

    /// Remove whatever is stored under `identifier`. No tombstone is kept.
    ///
    /// Deleting a missing identifier succeeds.
    fn delete(&self, identifier: &str) -> StoreResult<()>;
}
