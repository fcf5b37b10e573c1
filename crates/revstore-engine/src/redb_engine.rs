use std::fs;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, Table, TableDefinition};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::traits::{EntryIter, ReadTxn, StorageEngine, WriteTxn};

/// Single flat table: raw identifier bytes -> serialized envelope bytes.
const OBJECTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("objects");

impl From<redb::TransactionError> for EngineError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Transaction(e.to_string())
    }
}

impl From<redb::TableError> for EngineError {
    fn from(e: redb::TableError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for EngineError {
    fn from(e: redb::StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for EngineError {
    fn from(e: redb::CommitError) -> Self {
        Self::Commit(e.to_string())
    }
}

/// Persistent storage engine backed by a single `redb` database file.
///
/// Every key lives in one table; there is no namespacing by environment or
/// type. redb provides MVCC snapshots for readers and a single serialized
/// writer, which is exactly the isolation the object store relies on.
pub struct RedbEngine {
    db: Database,
    path: PathBuf,
}

impl RedbEngine {
    /// Open (or create) the database file at `path`.
    ///
    /// Missing parent directories are created. The objects table is created
    /// eagerly so read transactions never observe a missing table.
    pub fn open(path: &Path) -> EngineResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path).map_err(|e| EngineError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let txn = db.begin_write()?;
        {
            txn.open_table(OBJECTS)?;
        }
        txn.commit()?;

        debug!(path = %path.display(), "redb engine ready");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Adapter exposing a redb table through the engine transaction traits.
struct RedbTable<T>(T);

impl<T> ReadTxn for RedbTable<T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    fn get(&self, key: &[u8]) -> EngineResult<Option<Vec<u8>>> {
        Ok(self.0.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn entries(&self) -> EngineResult<EntryIter<'_>> {
        let range = self.0.iter()?;
        Ok(Box::new(range.map(|entry| {
            let (key, value) = entry?;
            Ok((key.value().to_vec(), value.value().to_vec()))
        })))
    }
}

impl WriteTxn for RedbTable<Table<'_, '_, &'static [u8], &'static [u8]>> {
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.0.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> EngineResult<bool> {
        Ok(self.0.remove(key)?.is_some())
    }
}

impl StorageEngine for RedbEngine {
    fn read_txn<R, E>(&self, f: impl FnOnce(&dyn ReadTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>,
    {
        let txn = self.db.begin_read().map_err(EngineError::from)?;
        let table = RedbTable(txn.open_table(OBJECTS).map_err(EngineError::from)?);
        // Bound first so the table is dropped before `txn`.
        let out = f(&table);
        out
    }

    fn write_txn<R, E>(&self, f: impl FnOnce(&mut dyn WriteTxn) -> Result<R, E>) -> Result<R, E>
    where
        E: From<EngineError>,
    {
        let txn = self.db.begin_write().map_err(EngineError::from)?;
        let out = {
            let table = txn.open_table(OBJECTS).map_err(EngineError::from)?;
            // Dropping an uncommitted write transaction aborts it.
            f(&mut RedbTable(table))?
        };
        txn.commit().map_err(EngineError::from)?;
        Ok(out)
    }
}

impl std::fmt::Debug for RedbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbEngine")
            .field("path", &self.path)
            .finish()
    }
}
