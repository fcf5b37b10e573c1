//! Versioned object store for revstore.
//!
//! Wraps an embedded key-value engine and stores typed payloads inside a JSON
//! envelope that carries a content-addressed revision and the full revision
//! history of the object.
//!
//! # Revisions
//!
//! A revision is `"<sequence>-<hex sha256 of payload>"`. The sequence starts
//! at 0 for an object that was never written and grows by one on every
//! write; the hash covers the payload only. After every write the sequence
//! equals the length of the history, and the last history entry equals the
//! revision.
//!
//! # Enumeration
//!
//! [`Datastore::read_all`] scans every stored object and keeps the ones whose
//! environment matches exactly and whose type matches exactly, or any type
//! when asked for [`ALL_TYPES`].
//!
//! # Concurrency
//!
//! Writes do not compare the caller's revision with the stored one. Two
//! writers starting from the same object both succeed and the last commit
//! wins, dropping the other writer's history entry.

pub mod error;
pub mod filter;
pub mod object;
pub mod revision;
pub mod store;
pub mod traits;

pub use error::{RevisionError, StoreError, StoreResult};
pub use filter::{ScanFilter, ALL_TYPES};
pub use object::Object;
pub use revision::{next_revision, payload_digest, verify_revision, Revision};
pub use store::ObjectStore;
pub use traits::Datastore;
