//! Local persistence of the plan
//!
//! The plan is kept as a JSON snapshot in a small key-value store, mirroring
//! what a browser would keep in local storage. Every export overwrites the
//! previous snapshot.

pub mod snapshot;
pub mod store;

pub use snapshot::{PLAN_KEY, PlanSnapshot, load_snapshot, save_snapshot};
pub use store::{FileStore, MemoryStore, SnapshotStore, StorageError};
