//! # Tracking Lookup Cache
//!
//! Time-boxed memoization over provider lookups, consulted before any
//! network call. Hits are re-marked as cache-sourced so consumers can tell
//! cached data from a fresh provider response.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::system;
use crate::models::{DataSource, Tracking, TrackingType};

/// Configuration parameters for the lookup cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default entry lifetime
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(system::DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CacheEntry {
    tracking: Tracking,
    stored_at: Instant,
    ttl: Duration,
}

/// TTL cache over tracking lookups, keyed by identifier + type
#[derive(Debug)]
pub struct TrackingCache {
    config: CacheConfig,
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Build the canonical cache key for a lookup
pub fn cache_key(identifier: &str, tracking_type: TrackingType) -> String {
    format!("{}:{tracking_type}", identifier.trim().to_ascii_uppercase())
}

impl TrackingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fetch a cached lookup. Expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<Tracking> {
        // Resolve the lookup before touching the map again: removing while
        // the read guard is alive would deadlock on the shard lock
        enum Lookup {
            Hit(Tracking),
            Expired,
            Miss,
        }
        let lookup = match self.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < entry.ttl => {
                let mut tracking = entry.tracking.clone();
                tracking.data_source = DataSource::Cache;
                Lookup::Hit(tracking)
            }
            Some(_) => Lookup::Expired,
            None => Lookup::Miss,
        };

        match lookup {
            Lookup::Hit(tracking) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Tracking cache hit");
                Some(tracking)
            }
            Lookup::Expired => {
                self.entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Lookup::Miss => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a lookup result with the default TTL
    pub fn put(&self, key: impl Into<String>, tracking: Tracking) {
        self.put_with_ttl(key, tracking, self.config.ttl);
    }

    /// Store a lookup result with an explicit TTL
    pub fn put_with_ttl(&self, key: impl Into<String>, tracking: Tracking, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                tracking,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for TrackingCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackingType;

    #[test]
    fn test_cache_key_normalizes_identifier() {
        assert_eq!(
            cache_key(" msku1234567 ", TrackingType::Container),
            "MSKU1234567:container"
        );
    }

    #[test]
    fn test_hit_is_marked_cache_sourced() {
        let cache = TrackingCache::default();
        let key = cache_key("MSKU1234567", TrackingType::Container);
        let tracking =
            Tracking::new("MSKU1234567", TrackingType::Container).with_data_source(DataSource::Live);
        cache.put(key.clone(), tracking);

        let hit = cache.get(&key).unwrap();
        assert_eq!(hit.data_source, DataSource::Cache);
        assert_eq!(cache.metrics().hits, 1);
    }

    #[test]
    fn test_miss_counts() {
        let cache = TrackingCache::default();
        assert!(cache.get("absent").is_none());
        assert_eq!(cache.metrics().misses, 1);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = TrackingCache::default();
        let key = cache_key("HLCU1234567", TrackingType::Container);
        cache.put_with_ttl(
            key.clone(),
            Tracking::new("HLCU1234567", TrackingType::Container),
            Duration::from_millis(10),
        );

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }
}
