use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::traits::{EntryIter, ReadTxn, StorageEngine, WriteTxn};

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory, `BTreeMap`-based storage engine.
///
/// Intended for tests and embedding. Read transactions hold the read lock for
/// their whole duration, which gives them a stable snapshot. Write
/// transactions stage their changes on a copy of the map and swap it in only
/// when the closure succeeds.
pub struct InMemoryEngine {
    entries: RwLock<Entries>,
}

impl InMemoryEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the engine holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    /// Store raw bytes outside of any transaction closure.
    ///
    /// Used to seed fixtures, including values that are not valid envelopes.
    pub fn insert_raw(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.into(), value.into());
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadTxn for Entries {
    fn get(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        Ok(BTreeMap::get(self, key).cloned())
    }

    fn entries(&self) -> EngineResult<EntryIter<'_>> {
        Ok(Box::new(self.iter().map(|(k, v)| Ok((k.clone(), v.clone())))))
    }
}

impl WriteTxn for Entries {
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> EngineResult<bool> {
        Ok(self.remove(key).is_some())
    }
}

impl StorageEngine for InMemoryEngine {
    fn read_txn<R, E>(&self, f: impl FnOnce(&dyn ReadTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>,
    {
        let entries = self.entries.read().expect("lock poisoned");
        f(&*entries)
    }

    fn write_txn<R, E>(&self, f: impl FnOnce(&mut dyn WriteTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>,
    {
        let mut entries = self.entries.write().expect("lock poisoned");
        let mut staged = entries.clone();
        let out = f(&mut staged)?;
        *entries = staged;
        debug!(keys = entries.len(), "in-memory transaction committed");
        Ok(out)
    }
}

impl std::fmt::Debug for InMemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEngine")
            .field("key_count", &self.len())
            .finish()
    }
}
