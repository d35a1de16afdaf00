// src/lib.rs

//! Follow Tracker Library
//!
//! Observes an account's follower list between runs and records who was
//! gained and who was lost.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
