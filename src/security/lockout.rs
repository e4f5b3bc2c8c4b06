//! Failure-triggered lockout per client identity.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::AdminConfig;
use crate::security::store::{ClientRecord, ClientStore};

/// Longest lockout ever imposed, whatever the configured period.
pub const MAX_LOCKOUT_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Locks an identity out after `threshold` failures within `period`.
///
/// Only failures inside the trailing period count, so sparse mistakes
/// spread over a long time never add up to a lock.
pub struct LockoutTracker {
    store: Arc<ClientStore>,
    threshold: usize,
    period: Duration,
}

impl LockoutTracker {
    pub fn new(store: Arc<ClientStore>, threshold: usize, period: Duration) -> Self {
        Self {
            store,
            threshold,
            period: period.min(MAX_LOCKOUT_PERIOD),
        }
    }

    pub fn from_config(store: Arc<ClientStore>, config: &AdminConfig) -> Self {
        Self::new(
            store,
            config.lockout_threshold,
            Duration::from_secs(config.lockout_period_secs),
        )
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Record a failed attempt. Returns the new lockout deadline if this
    /// failure set or extended one.
    pub fn record_failure(&self, identity: &str) -> Option<Instant> {
        let mut record = self.store.entry(identity);
        let now = Instant::now();
        record.failure_timestamps.push_back(now);
        self.evaluate(&mut record, now)
    }

    /// Same as [`record_failure`](Self::record_failure) with an explicit clock reading.
    pub fn record_failure_at(&self, identity: &str, now: Instant) -> Option<Instant> {
        let mut record = self.store.entry(identity);
        record.failure_timestamps.push_back(now);
        self.evaluate(&mut record, now)
    }

    fn evaluate(&self, record: &mut ClientRecord, now: Instant) -> Option<Instant> {
        let history = &mut record.failure_timestamps;
        while history.len() > self.threshold.saturating_mul(2) {
            history.pop_front();
        }

        let recent = history
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < self.period)
            .count();

        if recent >= self.threshold {
            let expiry = now
                .checked_add(self.period)
                .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
                .unwrap_or(now);
            record.lockout_expiry = Some(expiry);
            Some(expiry)
        } else {
            None
        }
    }

    /// Whether `identity` is currently locked out. Clears an expired lock.
    pub fn is_locked(&self, identity: &str) -> bool {
        self.is_locked_at(identity, Instant::now())
    }

    /// Same as [`is_locked`](Self::is_locked) with an explicit clock reading.
    pub fn is_locked_at(&self, identity: &str, now: Instant) -> bool {
        let Some(mut record) = self.store.get_mut(identity) else {
            return false;
        };
        match record.lockout_expiry {
            Some(expiry) if now < expiry => true,
            Some(_) => {
                record.lockout_expiry = None;
                false
            }
            None => false,
        }
    }

    /// Forget past failures after a successful login.
    ///
    /// An active lockout keeps running until it expires.
    pub fn reset(&self, identity: &str) {
        if let Some(mut record) = self.store.get_mut(identity) {
            record.failure_timestamps.clear();
        }
    }
}
