//! User record and snapshot types.

use serde::{Deserialize, Serialize};

/// A single account as persisted in snapshots and history.
///
/// `login` is the identity key: two records with the same login are the same
/// account, regardless of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account handle
    pub login: String,

    /// Stable numeric identifier
    pub id: u64,

    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: String,

    /// Public profile page
    #[serde(default, alias = "htmlUrl")]
    pub profile_url: String,
}

impl User {
    /// Create a user with only the identity fields set.
    pub fn new(login: impl Into<String>, id: u64) -> Self {
        Self {
            login: login.into(),
            id,
            avatar_url: String::new(),
            profile_url: String::new(),
        }
    }
}

/// A point-in-time, ordered observation of a follower or following list.
pub type Snapshot = Vec<User>;

/// A user record as returned by the remote API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

impl From<ApiUser> for User {
    fn from(user: ApiUser) -> Self {
        Self {
            login: user.login,
            id: user.id,
            avatar_url: user.avatar_url,
            profile_url: user.html_url,
        }
    }
}
