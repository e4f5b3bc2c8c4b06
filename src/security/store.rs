//! Per-client abuse-control state shared by the limiter and lockout tracker.

use std::collections::VecDeque;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tokio::time::Instant;

/// Everything remembered about one client identity.
///
/// Records are created lazily and live for the life of the process.
#[derive(Debug, Default)]
pub struct ClientRecord {
    /// Recent authentication failures, oldest first.
    pub failure_timestamps: VecDeque<Instant>,
    /// Lockout deadline; expired values are cleared on the next check.
    pub lockout_expiry: Option<Instant>,
    /// Requests seen within the current rate window, oldest first.
    pub rate_window_timestamps: VecDeque<Instant>,
}

/// Identity-keyed record store.
///
/// Each read-modify-write of a record happens while holding the shard
/// guard returned by [`ClientStore::entry`] or [`ClientStore::get_mut`],
/// so concurrent requests from one identity never lose updates.
#[derive(Debug, Default)]
pub struct ClientStore {
    records: DashMap<String, ClientRecord>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to a record, creating it if absent.
    ///
    /// The guard must be dropped before touching the store again.
    pub(crate) fn entry(&self, identity: &str) -> RefMut<'_, String, ClientRecord> {
        if let Some(record) = self.records.get_mut(identity) {
            return record;
        }
        self.records.entry(identity.to_owned()).or_default()
    }

    /// Exclusive access to an existing record.
    pub(crate) fn get_mut(&self, identity: &str) -> Option<RefMut<'_, String, ClientRecord>> {
        self.records.get_mut(identity)
    }

    /// Number of failures currently remembered for `identity`.
    pub fn failure_count(&self, identity: &str) -> usize {
        self.records
            .get(identity)
            .map_or(0, |r| r.failure_timestamps.len())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
