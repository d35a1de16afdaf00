//! Diff calculation between follower snapshots.
//!
//! Identity is the login string: an account that renames itself between two
//! observations shows up as one lost (old login) and one gained (new login).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Users gained and lost between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FollowerDiff {
    /// In current but not in previous, in current's order
    pub gained: Vec<User>,
    /// In previous but not in current, in previous's order
    pub lost: Vec<User>,
}

impl FollowerDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.gained.is_empty() || !self.lost.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.gained.len() + self.lost.len()
    }
}

fn logins(users: &[User]) -> HashSet<&str> {
    users.iter().map(|u| u.login.as_str()).collect()
}

/// Members of `users` whose login is not in `exclude`, order preserved.
fn missing_from(users: &[User], exclude: &HashSet<&str>) -> Vec<User> {
    users
        .iter()
        .filter(|u| !exclude.contains(u.login.as_str()))
        .cloned()
        .collect()
}

/// Compare the current follower snapshot with the previous one.
pub fn diff_followers(current: &[User], previous: &[User]) -> FollowerDiff {
    FollowerDiff {
        gained: missing_from(current, &logins(previous)),
        lost: missing_from(previous, &logins(current)),
    }
}

/// Accounts in `following` that do not follow back.
pub fn non_mutual(followers: &[User], following: &[User]) -> Vec<User> {
    missing_from(following, &logins(followers))
}
