use std::marker::PhantomData;
use std::sync::Arc;

use revstore_engine::StorageEngine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::filter::ScanFilter;
use crate::object::Object;
use crate::revision::next_revision;
use crate::traits::Datastore;

/// [`Datastore`] backed by an injected [`StorageEngine`] handle.
///
/// The store owns no connection state of its own: the engine is opened by
/// the composing application and shared through an `Arc`, so several stores
/// (for different payload types) can sit on the same engine.
pub struct ObjectStore<T, E> {
    engine: Arc<E>,
    _payload: PhantomData<fn() -> T>,
}

impl<T, E: StorageEngine> ObjectStore<T, E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            _payload: PhantomData,
        }
    }

    /// The shared engine handle.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }
}

impl<T, E> Clone for ObjectStore<T, E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            _payload: PhantomData,
        }
    }
}

impl<T, E> Datastore<T> for ObjectStore<T, E>
where
    T: Serialize + DeserializeOwned,
    E: StorageEngine,
{
    fn read_all(&self, environment: &str, kind: &str) -> StoreResult<Vec<String>> {
        let filter = ScanFilter::new(environment, kind);

        let identifiers = self.engine.read_txn(|txn| {
            let mut identifiers = Vec::new();
            for entry in txn.entries()? {
                let (_, value) = entry?;
                let object = Object::<T>::from_bytes(&value)?;
                if filter.matches(&object) {
                    identifiers.push(object.identifier);
                }
            }
            Ok::<_, StoreError>(identifiers)
        })?;

        debug!(environment, kind, matched = identifiers.len(), "scan complete");
        Ok(identifiers)
    }

    fn read(&self, identifier: &str) -> StoreResult<Object<T>> {
        let bytes = self
            .engine
            .read_txn(|txn| txn.get(identifier.as_bytes()).map_err(StoreError::from))?
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
        Object::from_bytes(&bytes)
    }

    fn write(&self, identifier: &str, mut object: Object<T>) -> StoreResult<Object<T>> {
        let revision = next_revision(&object.revision, &object.payload)?.to_string();
        object.history.push(revision.clone());
        object.revision = revision;

        let bytes = object.to_bytes()?;
        self.engine
            .write_txn(|txn| txn.set(identifier.as_bytes(), &bytes).map_err(StoreError::from))?;

        debug!(
            identifier,
            revision = %object.revision,
            history_len = object.history.len(),
            "object stored"
        );
        Ok(object)
    }

    fn delete(&self, identifier: &str) -> StoreResult<()> {
        let existed = self
            .engine
            .write_txn(|txn| txn.delete(identifier.as_bytes()).map_err(StoreError::from))?;
        debug!(identifier, existed, "object deleted");
        Ok(())
    }
}

impl<T, E: std::fmt::Debug> std::fmt::Debug for ObjectStore<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("engine", &self.engine)
            .finish()
    }
}
