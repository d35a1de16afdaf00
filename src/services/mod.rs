//! Service layer for the tracker.
//!
//! This module contains the network-facing logic:
//! - Paginated list retrieval (`FollowerFetcher`)

mod fetcher;

pub use fetcher::{FollowerFetcher, ResourceKind};
