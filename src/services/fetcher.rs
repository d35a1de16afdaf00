// src/services/fetcher.rs

//! Paginated follower/following fetcher.
//!
//! Walks fixed-size pages until the API returns an empty page, pausing
//! between requests and backing off when the quota runs low.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{ApiError, AppError, Result};
use crate::models::{ApiConfig, ApiUser, Snapshot, User, validate_account};
use crate::utils::{ApiResponse, Clock, Transport};

/// Which relation of the account to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Followers,
    Following,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service for retrieving complete follower and following lists.
pub struct FollowerFetcher {
    account: String,
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl FollowerFetcher {
    /// Create a fetcher for `account`. Fails on an empty or path-like account.
    pub fn new(
        account: impl Into<String>,
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let account = account.into();
        validate_account(&account)?;
        Url::parse(&config.base_url)?;

        Ok(Self {
            account,
            config,
            transport,
            clock,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Fetch every page of `kind`.
    ///
    /// Any non-success response aborts the walk and discards the pages
    /// collected so far.
    pub async fn fetch_all(&self, kind: ResourceKind) -> Result<Snapshot> {
        let mut users: Snapshot = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page = 1usize;

        loop {
            let url = self.page_url(kind, page)?;
            let response = self.transport.get(&url).await?;

            if !response.is_success() {
                let error = ApiError::from_status(response.status, response.body);
                log::error!(
                    "Fetching {} of {} failed on page {}: {}",
                    kind,
                    self.account,
                    page,
                    error
                );
                return Err(error.into());
            }

            let batch = Self::parse_page(&response, kind, page)?;
            if batch.is_empty() {
                break;
            }

            log::debug!("Fetched {} {} from page {}", batch.len(), kind, page);
            for user in batch {
                if seen.insert(user.login.clone()) {
                    users.push(user);
                } else {
                    log::debug!("Skipping duplicate {} '{}' on page {}", kind, user.login, page);
                }
            }

            self.clock.sleep(self.config.request_delay()).await;
            if let Some(wait) = self.backoff(&response) {
                log::warn!(
                    "Rate limit nearly exhausted, sleeping {}s until reset",
                    wait.as_secs()
                );
                self.clock.sleep(wait).await;
            }

            page += 1;
        }

        log::info!("Fetched {} {} of {}", users.len(), kind, self.account);
        Ok(users)
    }

    /// Time to wait before the next request, if the quota is below the low-water mark.
    fn backoff(&self, response: &ApiResponse) -> Option<Duration> {
        let limit = response.rate_limit();
        let remaining = limit.remaining?;
        if remaining >= self.config.rate_limit_low_water {
            return None;
        }

        let reset = limit.reset?;
        let wait = reset
            .saturating_sub(self.clock.now().timestamp())
            .saturating_add(1);
        (wait > 0).then(|| Duration::from_secs(wait as u64))
    }

    fn page_url(&self, kind: ResourceKind, page: usize) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("base_url '{}' cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend(["users", self.account.as_str(), kind.as_str()]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &self.config.page_size.to_string());
        Ok(url)
    }

    fn parse_page(response: &ApiResponse, kind: ResourceKind, page: usize) -> Result<Vec<User>> {
        let users: Vec<ApiUser> = serde_json::from_str(&response.body)
            .map_err(|e| AppError::parse(format!("{} page {}", kind, page), e))?;
        Ok(users.into_iter().map(User::from).collect())
    }
}
