//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {account}_followers.json   # Snapshot: array of users
//! └── {account}_history.json     # History: { gained: [...], lost: [...] }
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so a
//! crash mid-write leaves the previous file intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{HistoryLog, Snapshot, StorageConfig, User};
use crate::storage::{HistoryStore, SnapshotStore};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    account: String,
    max_history: usize,
}

impl LocalStorage {
    /// Create a new LocalStorage for `account` rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, account: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            account: account.into(),
            max_history: StorageConfig::default().max_history,
        }
    }

    /// Create a LocalStorage from the storage section of the config.
    pub fn from_config(config: &StorageConfig, account: impl Into<String>) -> Self {
        Self::new(&config.data_dir, account).with_max_history(config.max_history)
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&format!("{}_followers.json", self.account))
    }

    pub fn history_path(&self) -> PathBuf {
        self.path(&format!("{}_history.json", self.account))
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data. An empty file reads as `None`.
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match self.read_bytes(path).await? {
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read JSON, substituting the default for anything unreadable.
    async fn read_json_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> T {
        match self.read_json(path).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                log::debug!("No data at {}, starting empty", path.display());
                T::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", path.display(), e);
                T::default()
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn save_snapshot(&self, snapshot: &[User]) -> Result<()> {
        let path = self.snapshot_path();
        self.write_json(&path, snapshot).await?;
        log::debug!("Snapshot: {} users written to {}", snapshot.len(), path.display());
        Ok(())
    }

    async fn load_snapshot(&self) -> Snapshot {
        self.read_json_or_default(&self.snapshot_path()).await
    }
}

#[async_trait]
impl HistoryStore for LocalStorage {
    async fn append_history(
        &self,
        gained: &[User],
        lost: &[User],
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut history = self.load_history().await;
        history.append(gained, lost, at, self.max_history);

        let path = self.history_path();
        self.write_json(&path, &history).await?;
        log::debug!(
            "History: {} gained / {} lost entries written to {}",
            history.gained.len(),
            history.lost.len(),
            path.display()
        );
        Ok(())
    }

    async fn load_history(&self) -> HistoryLog {
        self.read_json_or_default(&self.history_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::users;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");
        let path = storage.path("test.txt");

        storage.write_bytes(&path, b"hello").await.unwrap();
        let data = storage.read_bytes(&path).await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");

        let data = storage.read_bytes(&storage.path("nope.txt")).await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_replaced_whole() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");

        storage.save_snapshot(&users("a", 0..5)).await.unwrap();
        storage.save_snapshot(&users("b", 0..2)).await.unwrap();

        let loaded = storage.load_snapshot().await;
        assert_eq!(loaded, users("b", 0..2));
        assert!(storage.snapshot_path().ends_with("octocat_followers.json"));
    }

    #[tokio::test]
    async fn test_snapshot_missing_empty_or_corrupt() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested"), "octocat");
        assert!(storage.load_snapshot().await.is_empty());

        storage.save_snapshot(&users("a", 0..1)).await.unwrap();
        std::fs::write(storage.snapshot_path(), "").unwrap();
        assert!(storage.load_snapshot().await.is_empty());

        std::fs::write(storage.snapshot_path(), "{not json").unwrap();
        assert!(storage.load_snapshot().await.is_empty());

        std::fs::write(storage.snapshot_path(), r#"{"login": "a"}"#).unwrap();
        assert!(storage.load_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_missing_empty_or_corrupt() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");
        assert!(storage.load_history().await.is_empty());

        std::fs::write(storage.history_path(), "  \n").unwrap();
        assert!(storage.load_history().await.is_empty());

        std::fs::write(storage.history_path(), "[1, 2, 3]").unwrap();
        assert!(storage.load_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_append_recovers_from_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");
        std::fs::write(storage.history_path(), "garbage").unwrap();

        storage
            .append_history(&users("g", 0..2), &[], at(0))
            .await
            .unwrap();

        let history = storage.load_history().await;
        assert_eq!(history.gained.len(), 2);
        assert!(history.lost.is_empty());
    }

    #[tokio::test]
    async fn test_history_capped_across_cycles() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat").with_max_history(25);

        for cycle in 0..4 {
            let start = cycle * 10;
            storage
                .append_history(&users("g", start..start + 10), &users("l", 0..1), at(cycle as i64))
                .await
                .unwrap();
        }

        let history = storage.load_history().await;
        assert_eq!(history.gained.len(), 25);
        assert_eq!(history.gained[0].user.login, "g15");
        assert_eq!(history.gained[24].user.login, "g39");
        assert_eq!(history.lost.len(), 4);
    }

    #[tokio::test]
    async fn test_history_file_layout() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "octocat");

        storage
            .append_history(&users("g", 0..1), &users("l", 0..1), at(86_400))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(storage.history_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["gained"][0]["user"]["login"], "g0");
        assert_eq!(value["gained"][0]["timestamp"], "1970-01-02 00:00:00");
        assert_eq!(value["lost"][0]["user"]["profileUrl"], "https://github.com/l0");
    }
}
