//! Weather response cache.
//!
//! Entries are keyed by [`Fingerprint`](crate::Fingerprint) string and carry
//! the time they were stored. The store never judges freshness itself; the
//! proxy compares `timestamp` against its TTL. Stale entries stay until the
//! next successful fetch overwrites them or capacity pressure evicts them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

/// Default number of fingerprints kept in memory.
pub const DEFAULT_CAPACITY: u64 = 1_000;

/// Default server-side freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Source of "now" for cache timestamps and freshness checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used to exercise TTL expiry
/// without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::milliseconds(duration_millis(by));
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// A cached upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl CacheEntry {
    /// Fresh iff `now - timestamp < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age_ms = (now - self.timestamp).num_milliseconds();
        age_ms < duration_millis(ttl)
    }
}

/// Storage for cached weather payloads.
///
/// At most one entry exists per fingerprint; `put` replaces, never merges.
pub trait CacheStore: Send + Sync {
    /// Look up the entry for a fingerprint, fresh or not.
    fn get(&self, fingerprint: &str) -> Option<Arc<CacheEntry>>;

    /// Store `payload` under `fingerprint`, stamped with the current time.
    fn put(&self, fingerprint: &str, payload: Value);

    /// Number of entries currently held.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process cache bounded by entry count.
///
/// Backed by moka, which evicts entries once `capacity` is exceeded. No
/// moka time-to-live is set; a stale entry stays readable until superseded.
pub struct InMemoryCacheStore {
    entries: moka::sync::Cache<String, Arc<CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCacheStore {
    pub fn new(capacity: u64) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: moka::sync::Cache::new(capacity),
            clock,
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCacheStore")
            .field("entries", &self.entries.entry_count())
            .field("clock", &self.clock)
            .finish()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, fingerprint: &str) -> Option<Arc<CacheEntry>> {
        self.entries.get(fingerprint)
    }

    fn put(&self, fingerprint: &str, payload: Value) {
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            timestamp: self.clock.now(),
            payload,
        };
        self.entries.insert(fingerprint.to_string(), Arc::new(entry));
    }

    fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
