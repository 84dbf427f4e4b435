//! Time-boxed encouragement cache.
//!
//! The last fetched text is persisted under
//! [`keys::ENCOURAGEMENT_CACHE`] as `{"data": "<text>", "timestamp": <ms>}`
//! so it survives restarts. An entry older than the TTL counts as absent.
//! Failed fetches leave the stored entry exactly as it was.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hydrohomie_store::{KeyValueStore, SharedStore, keys, load_json_or_default, save_json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::EncouragementResult;
use crate::source::EncouragementSource;

/// Default time-to-live: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Persisted form of one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: String,
    /// Unix epoch milliseconds when `data` was fetched.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Whether the entry is younger than `ttl` right now.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, now_ms())
    }

    fn is_fresh_at(&self, ttl: Duration, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) < ttl_ms
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The stored entry regardless of age. A corrupt entry is removed and
/// reported as absent.
pub fn stored_entry(store: &dyn KeyValueStore) -> EncouragementResult<Option<CacheEntry>> {
    Ok(load_json_or_default(store, keys::ENCOURAGEMENT_CACHE)?)
}

// ═══════════════════════════════════════════════════════════════════════
//  Stats
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl CacheStats {
    /// Fetches answered from the stored entry.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Fetches that had to go to the source, including forced refetches.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Source calls that failed.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} failures={}",
            self.hits(),
            self.misses(),
            self.failures()
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Cache
// ═══════════════════════════════════════════════════════════════════════

pub struct EncouragementCache {
    store: SharedStore,
    source: Arc<dyn EncouragementSource>,
    ttl: Duration,
    stats: CacheStats,
}

impl EncouragementCache {
    pub fn new(store: SharedStore, source: Arc<dyn EncouragementSource>) -> Self {
        Self {
            store,
            source,
            ttl: DEFAULT_TTL,
            stats: CacheStats::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Cached text if a fresh entry exists, otherwise one call to the
    /// source.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> EncouragementResult<String> {
        if let Some(text) = self.cached()? {
            self.stats.record_hit();
            debug!("encouragement served from cache");
            return Ok(text);
        }
        self.stats.record_miss();
        self.fetch_from_source().await
    }

    /// Drop the stored entry, then fetch from the source.
    #[instrument(skip(self))]
    pub async fn refetch(&self) -> EncouragementResult<String> {
        self.store.remove(keys::ENCOURAGEMENT_CACHE)?;
        debug!("encouragement cache invalidated");
        self.stats.record_miss();
        self.fetch_from_source().await
    }

    /// The stored text if it is still within the TTL. Never touches the
    /// network. A corrupt entry is removed and reported as absent.
    pub fn cached(&self) -> EncouragementResult<Option<String>> {
        Ok(stored_entry(self.store.as_ref())?
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.data))
    }

    async fn fetch_from_source(&self) -> EncouragementResult<String> {
        let text = match self.source.fetch_text().await {
            Ok(text) => text,
            Err(err) => {
                self.stats.record_failure();
                warn!(%err, "encouragement fetch failed");
                return Err(err);
            }
        };

        let entry = CacheEntry {
            data: text,
            timestamp: now_ms(),
        };
        save_json(self.store.as_ref(), keys::ENCOURAGEMENT_CACHE, &entry)?;
        info!(chars = entry.data.chars().count(), "encouragement cached");
        Ok(entry.data)
    }
}

// ── tests ────────────────────────────────────────────────────────────
