use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::error::EngineResult;
use crate::redb_engine::RedbEngine;

/// How a caller intends to use the engine handle it asks for.
///
/// The mode only matters for the call that actually opens the engine, and
/// even then redb has a single handle type for readers and writers. Later
/// callers get the cached handle whatever mode they pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Lazily opens exactly one [`RedbEngine`] for a path and shares it.
///
/// The first successful [`open`](Self::open) caches the handle; every later
/// call returns a clone of the same `Arc`. Concurrent first callers are
/// serialized on an internal mutex, so the database file is opened once.
///
/// A failed open is not cached: the error goes back to that caller and the
/// next call tries again.
pub struct ConnectionManager {
    path: PathBuf,
    handle: Mutex<Option<Arc<RedbEngine>>>,
}

impl ConnectionManager {
    /// Create a manager for the database file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: Mutex::new(None),
        }
    }

    /// Return the shared engine handle, opening it on first use.
    pub fn open(&self, mode: AccessMode) -> EngineResult<Arc<RedbEngine>> {
        let mut handle = self.handle.lock().expect("connection mutex poisoned");
        if let Some(engine) = handle.as_ref() {
            debug!(%mode, "reusing cached engine handle");
            return Ok(Arc::clone(engine));
        }

        let engine = Arc::new(RedbEngine::open(&self.path)?);
        info!(path = %self.path.display(), %mode, "storage engine opened");
        *handle = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// Returns `true` once a handle has been opened and cached.
    pub fn is_open(&self) -> bool {
        self.handle
            .lock()
            .expect("connection mutex poisoned")
            .is_some()
    }

    /// Configured database location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}
