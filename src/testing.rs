//! Deterministic stand-ins for the network and the clock.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderValue;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::utils::{ApiResponse, Clock, Transport};

/// Replays queued responses in order and records every requested URL.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = ApiResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::validation(format!("unexpected request to {}", url)))
    }
}

/// Clock that records sleeps and advances instantly.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn at(epoch_secs: i64) -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_opt(epoch_secs, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let step = chrono::Duration::from_std(duration).unwrap();
        *self.now.lock().unwrap() += step;
    }
}

pub fn users(prefix: &str, range: std::ops::Range<usize>) -> Vec<User> {
    range
        .map(|i| User {
            login: format!("{}{}", prefix, i),
            id: i as u64,
            avatar_url: format!("https://avatars.example.com/u/{}", i),
            profile_url: format!("https://github.com/{}{}", prefix, i),
        })
        .collect()
}

/// A 200 page in the remote API's wire format.
pub fn page(users: &[User]) -> ApiResponse {
    let body: Vec<serde_json::Value> = users
        .iter()
        .map(|u| {
            serde_json::json!({
                "login": u.login,
                "id": u.id,
                "avatar_url": u.avatar_url,
                "html_url": u.profile_url,
                "type": "User",
            })
        })
        .collect();
    ApiResponse::new(200, serde_json::Value::Array(body).to_string())
}

pub fn empty_page() -> ApiResponse {
    ApiResponse::new(200, "[]")
}

pub fn with_rate_limit(mut response: ApiResponse, remaining: u64, reset: i64) -> ApiResponse {
    response.headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from_str(&remaining.to_string()).unwrap(),
    );
    response.headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from_str(&reset.to_string()).unwrap(),
    );
    response
}
