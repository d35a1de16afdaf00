//! Pipeline entry points for tracker operations.
//!
//! - `diff`: set differences between snapshots
//! - `track`: the fetch → diff → persist cycle (`Tracker`)

pub mod diff;
pub mod track;

pub use diff::{FollowerDiff, diff_followers, non_mutual};
pub use track::{ChangeReport, NonMutualReport, Tracker, history_stats};
