//! Capped, timestamped log of follower changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Format used for history timestamps. Sorts lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One gained or lost event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub user: User,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn new(user: User, at: DateTime<Utc>) -> Self {
        Self {
            user,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Gained and lost events in append order, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HistoryLog {
    #[serde(default, alias = "newFollowers")]
    pub gained: Vec<HistoryEntry>,

    #[serde(default, alias = "unfollowers")]
    pub lost: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Record one entry per user, then cap each sequence to `max_history`.
    ///
    /// Both sequences are capped independently; the oldest entries go first.
    pub fn append(&mut self, gained: &[User], lost: &[User], at: DateTime<Utc>, max_history: usize) {
        self.gained
            .extend(gained.iter().cloned().map(|u| HistoryEntry::new(u, at)));
        self.lost
            .extend(lost.iter().cloned().map(|u| HistoryEntry::new(u, at)));

        let evicted = truncate_front(&mut self.gained, max_history)
            + truncate_front(&mut self.lost, max_history);
        if evicted > 0 {
            log::debug!("History cap {} reached, evicted {} entries", max_history, evicted);
        }
    }

    /// Summarize the log without touching the network.
    pub fn stats(&self, recent: usize, total_followers: usize) -> HistoryStats {
        HistoryStats {
            total_followers,
            total_gained: self.gained.len(),
            total_lost: self.lost.len(),
            recent_gained: tail(&self.gained, recent),
            recent_lost: tail(&self.lost, recent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gained.is_empty() && self.lost.is_empty()
    }
}

/// Aggregate view over the persisted history.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Size of the last persisted follower snapshot
    pub total_followers: usize,
    pub total_gained: usize,
    pub total_lost: usize,
    /// Most recent gained events, oldest first
    pub recent_gained: Vec<HistoryEntry>,
    /// Most recent lost events, oldest first
    pub recent_lost: Vec<HistoryEntry>,
}

fn truncate_front<T>(entries: &mut Vec<T>, max: usize) -> usize {
    let excess = entries.len().saturating_sub(max);
    if excess > 0 {
        entries.drain(..excess);
    }
    excess
}

fn tail(entries: &[HistoryEntry], count: usize) -> Vec<HistoryEntry> {
    entries[entries.len().saturating_sub(count)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn users(prefix: &str, count: usize) -> Vec<User> {
        (0..count)
            .map(|i| User::new(format!("{}{}", prefix, i), i as u64))
            .collect()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        let entry = HistoryEntry::new(User::new("a", 1), at(0));
        assert_eq!(entry.timestamp, "1970-01-01 00:00:00");
    }

    #[test]
    fn test_append_is_cumulative() {
        let mut log = HistoryLog::default();
        log.append(&users("g", 2), &users("l", 1), at(10), 1000);
        log.append(&users("h", 3), &[], at(20), 1000);

        assert_eq!(log.gained.len(), 5);
        assert_eq!(log.lost.len(), 1);
        assert_eq!(log.gained[0].user.login, "g0");
        assert_eq!(log.gained[4].user.login, "h2");
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let mut log = HistoryLog::default();
        for cycle in 0..5 {
            let batch: Vec<User> = (0..4)
                .map(|i| User::new(format!("c{}u{}", cycle, i), (cycle * 10 + i) as u64))
                .collect();
            log.append(&batch, &[], at(cycle as i64), 10);
        }

        assert_eq!(log.gained.len(), 10);
        // 20 appended, the first 10 evicted
        assert_eq!(log.gained[0].user.login, "c2u2");
        assert_eq!(log.gained[9].user.login, "c4u3");
    }

    #[test]
    fn test_cap_applies_per_sequence() {
        let mut log = HistoryLog::default();
        log.append(&users("g", 5), &users("l", 2), at(0), 3);

        assert_eq!(log.gained.len(), 3);
        assert_eq!(log.lost.len(), 2);
        assert_eq!(log.gained[0].user.login, "g2");
    }

    #[test]
    fn test_stats_recent_tail() {
        let mut log = HistoryLog::default();
        log.append(&users("g", 7), &users("l", 2), at(0), 1000);

        let stats = log.stats(5, 42);
        assert_eq!(stats.total_followers, 42);
        assert_eq!(stats.total_gained, 7);
        assert_eq!(stats.total_lost, 2);
        assert_eq!(stats.recent_gained.len(), 5);
        assert_eq!(stats.recent_gained[0].user.login, "g2");
        assert_eq!(stats.recent_lost.len(), 2);
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let json = r#"{
            "newFollowers": [{"user": {"login": "a", "id": 1}, "timestamp": "2024-01-01 00:00:00"}],
            "unfollowers": []
        }"#;
        let log: HistoryLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.gained.len(), 1);
        assert!(log.lost.is_empty());
    }
}
