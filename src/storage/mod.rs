//! Storage abstractions for snapshot and history persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── {account}_followers.json   # Last complete follower snapshot
//! └── {account}_history.json     # Capped gained/lost event log
//! ```
//!
//! Both files are replaced whole on every write. Loads never fail: a
//! missing, empty or unparsable file reads as the empty default.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{HistoryLog, Snapshot, User};

// Re-export for convenience
pub use local::LocalStorage;

/// Holds the last observed follower list.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the persisted snapshot.
    async fn save_snapshot(&self, snapshot: &[User]) -> Result<()>;

    /// The persisted snapshot, or empty if there is none.
    async fn load_snapshot(&self) -> Snapshot;
}

/// Append-only, capped log of gained and lost events.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Timestamp and append the events, cap each sequence, then persist.
    async fn append_history(&self, gained: &[User], lost: &[User], at: DateTime<Utc>)
    -> Result<()>;

    /// The persisted log, or empty if there is none.
    async fn load_history(&self) -> HistoryLog;
}

/// Backend providing both stores.
pub trait TrackerStorage: SnapshotStore + HistoryStore {}

impl<T: SnapshotStore + HistoryStore> TrackerStorage for T {}
