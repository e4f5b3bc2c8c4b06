//! Sliding-window rate limiting per client identity.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::AdminConfig;
use crate::security::store::{ClientRecord, ClientStore};

/// Admits at most `max_requests` per identity in any trailing window.
///
/// Rejected requests are still recorded, so a client hammering the limit
/// stays rejected until it actually slows down.
pub struct SlidingWindowLimiter {
    store: Arc<ClientStore>,
    window: Duration,
    max_requests: usize,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<ClientStore>, window: Duration, max_requests: usize) -> Self {
        Self {
            store,
            window,
            max_requests,
        }
    }

    pub fn from_config(store: Arc<ClientStore>, config: &AdminConfig) -> Self {
        Self::new(
            store,
            Duration::from_secs(config.rate_window_secs),
            config.rate_max_requests,
        )
    }

    /// Count a request for `identity` and report whether it is admitted.
    pub fn allow(&self, identity: &str) -> bool {
        let mut record = self.store.entry(identity);
        // Read the clock under the guard so timestamps stay ordered.
        self.admit(&mut record, Instant::now())
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading.
    pub fn allow_at(&self, identity: &str, now: Instant) -> bool {
        let mut record = self.store.entry(identity);
        self.admit(&mut record, now)
    }

    fn admit(&self, record: &mut ClientRecord, now: Instant) -> bool {
        let window = &mut record.rate_window_timestamps;
        window.push_back(now);

        while let Some(&oldest) = window.front() {
            if now.saturating_duration_since(oldest) > self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        // Entries beyond max + 1 can only be the oldest ones and never change the outcome.
        while window.len() > self.max_requests.saturating_add(1) {
            window.pop_front();
        }

        window.len() <= self.max_requests
    }
}
