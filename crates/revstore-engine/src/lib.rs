//! Storage engine layer for revstore.
//!
//! revstore does not implement its own storage format. It consumes an
//! embedded, transactional, ordered key-value engine through a small
//! contract: closures run inside a read-only or a read-write transaction and
//! get `get`/`set`/`delete`/iterate access over byte keys and byte values.
//!
//! # Engines
//!
//! All engines implement the [`StorageEngine`] trait:
//!
//! - [`RedbEngine`] -- persistent single-file engine backed by `redb`
//! - [`InMemoryEngine`] -- `BTreeMap`-based engine for tests and embedding
//!
//! # Connections
//!
//! [`ConnectionManager`] lazily opens one [`RedbEngine`] handle for a
//! configured path and hands the same handle to every caller, whatever
//! [`AccessMode`] they ask for.
//!
//! # Rules
//!
//! 1. Read transactions see a consistent snapshot as of transaction start.
//! 2. A write transaction commits atomically or not at all. If the closure
//!    returns an error, nothing it did is visible.
//! 3. Engine failures are returned to the caller; nothing is retried.

pub mod connection;
pub mod error;
pub mod memory;
pub mod redb_engine;
pub mod traits;

pub use connection::{AccessMode, ConnectionManager};
pub use error::{EngineError, EngineResult};
pub use memory::InMemoryEngine;
pub use redb_engine::RedbEngine;
pub use traits::{Entry, EntryIter, ReadTxn, StorageEngine, WriteTxn};
