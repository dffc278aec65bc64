//! TTL-bounded cache of upstream snapshots
//!
//! Holds only provider data; overrides are never written here. An entry is
//! served while `now - fetched_at` is inside the freshness window and is
//! treated as absent afterwards.

use chrono::{DateTime, Duration, Utc};
use shared::{freshness_window, OverrideKey, WeatherSnapshot};
use std::collections::HashMap;

use crate::error::UpstreamFetchError;
use crate::upstream::SnapshotFetcher;

/// Time source for freshness checks
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F: Fn() -> DateTime<Utc>> Clock for F {
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: WeatherSnapshot,
    pub fetched_at: DateTime<Utc>,
}

/// Single-owner snapshot cache keyed by (lat, lon, date)
pub struct SnapshotCache<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    ttl: Duration,
    entries: HashMap<OverrideKey, CacheEntry>,
}

impl<F: SnapshotFetcher> SnapshotCache<F, SystemClock> {
    pub fn new(fetcher: F) -> Self {
        Self::with_clock(fetcher, SystemClock)
    }
}

impl<F: SnapshotFetcher, C: Clock> SnapshotCache<F, C> {
    pub fn with_clock(fetcher: F, clock: C) -> Self {
        Self {
            fetcher,
            clock,
            ttl: freshness_window(),
            entries: HashMap::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn fresh_entry(&self, key: &OverrideKey) -> Option<&CacheEntry> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
    }

    /// Fresh snapshot for `key`, fetching upstream on a miss.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn get(&mut self, key: &OverrideKey) -> Result<WeatherSnapshot, UpstreamFetchError> {
        if let Some(entry) = self.fresh_entry(key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(entry.snapshot.clone());
        }

        tracing::debug!("Cache miss for {}, fetching", key);
        let snapshot = self.fetcher.fetch(key).await?;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                snapshot: snapshot.clone(),
                fetched_at: self.clock.now(),
            },
        );
        Ok(snapshot)
    }

    /// Drop any entry for `key`; returns whether one existed
    pub fn invalidate(&mut self, key: &OverrideKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        tracing::debug!("Invalidated cache for {} (present: {})", key, removed);
        removed
    }

    /// Fresh entry without fetching
    pub fn peek(&self, key: &OverrideKey) -> Option<&CacheEntry> {
        self.fresh_entry(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
