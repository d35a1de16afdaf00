// src/pipeline/track.rs

//! Fetch → diff → persist cycle.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, HistoryStats, User};
use crate::services::{FollowerFetcher, ResourceKind};
use crate::storage::{HistoryStore, LocalStorage, SnapshotStore, TrackerStorage};
use crate::utils::{Clock, ReqwestTransport, SystemClock, Transport};

use super::diff::{diff_followers, non_mutual};

/// Outcome of one change check.
///
/// When the fetch fails nothing is persisted, `gained` and `lost` are empty
/// and `failure` holds the cause.
#[derive(Debug, Default, Serialize)]
pub struct ChangeReport {
    pub gained: Vec<User>,
    pub lost: Vec<User>,
    pub total_followers: usize,
    #[serde(skip)]
    pub failure: Option<AppError>,
}

impl ChangeReport {
    fn aborted(failure: AppError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.gained.is_empty() || !self.lost.is_empty()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Accounts followed that do not follow back.
#[derive(Debug, Default, Serialize)]
pub struct NonMutualReport {
    pub users: Vec<User>,
    #[serde(skip)]
    pub failure: Option<AppError>,
}

/// Tracks one account's followers across runs.
pub struct Tracker {
    config: Arc<Config>,
    fetcher: FollowerFetcher,
    storage: Arc<dyn TrackerStorage>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    /// Wire a tracker from explicit collaborators. Rejects invalid configs.
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TrackerStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher = FollowerFetcher::new(
            config.tracker.account.clone(),
            config.api.clone(),
            transport,
            Arc::clone(&clock),
        )?;

        Ok(Self {
            config,
            fetcher,
            storage,
            clock,
        })
    }

    /// Tracker talking to the real API and storing under `storage.data_dir`.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.api, config.tracker.token.as_deref())?;
        let storage = LocalStorage::from_config(&config.storage, config.tracker.account.clone());

        Self::new(
            Arc::clone(&config),
            Arc::new(transport),
            Arc::new(storage),
            Arc::new(SystemClock),
        )
    }

    pub fn account(&self) -> &str {
        self.fetcher.account()
    }

    /// Fetch followers, diff against the stored snapshot, persist both.
    pub async fn check_changes(&self) -> Result<ChangeReport> {
        let current = match self.fetcher.fetch_all(ResourceKind::Followers).await {
            Ok(current) => current,
            Err(e) => {
                log::error!("Change check for {} aborted: {}", self.account(), e);
                return Ok(ChangeReport::aborted(e));
            }
        };

        let previous = self.storage.load_snapshot().await;
        let diff = diff_followers(&current, &previous);
        log::info!(
            "Diff: {} gained, {} lost ({} → {} followers)",
            diff.gained.len(),
            diff.lost.len(),
            previous.len(),
            current.len()
        );

        self.storage.save_snapshot(&current).await?;
        self.storage
            .append_history(&diff.gained, &diff.lost, self.clock.now())
            .await?;

        Ok(ChangeReport {
            gained: diff.gained,
            lost: diff.lost,
            total_followers: current.len(),
            failure: None,
        })
    }

    /// Fetch both lists and report who does not follow back. Persists nothing.
    pub async fn non_mutual(&self) -> NonMutualReport {
        let result = async {
            let followers = self.fetcher.fetch_all(ResourceKind::Followers).await?;
            let following = self.fetcher.fetch_all(ResourceKind::Following).await?;
            Ok::<_, AppError>(non_mutual(&followers, &following))
        }
        .await;

        match result {
            Ok(users) => NonMutualReport {
                users,
                failure: None,
            },
            Err(e) => {
                log::error!("Non-mutual check for {} aborted: {}", self.account(), e);
                NonMutualReport {
                    users: Vec::new(),
                    failure: Some(e),
                }
            }
        }
    }

    /// Summarize persisted history. Never touches the network.
    pub async fn stats(&self) -> HistoryStats {
        history_stats(self.storage.as_ref(), self.config.storage.recent_count).await
    }
}

/// Summarize persisted history straight from storage, no API client needed.
pub async fn history_stats(storage: &dyn TrackerStorage, recent_count: usize) -> HistoryStats {
    let history = storage.load_history().await;
    let snapshot = storage.load_snapshot().await;
    history.stats(recent_count, snapshot.len())
}
