// src/models/mod.rs

//! Domain models for the tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod history;
mod user;

// Re-export all public types
pub use config::{ApiConfig, Config, LoggingConfig, StorageConfig, TrackerConfig};
pub(crate) use config::validate_account;
pub use history::{HistoryEntry, HistoryLog, HistoryStats, TIMESTAMP_FORMAT};
pub use user::{ApiUser, Snapshot, User};
