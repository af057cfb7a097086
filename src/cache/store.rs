//! Sliding-expiration storage.
//!
//! Entries hold serialized payloads and a last-access instant; a read
//! inside the window refreshes it, a read after the window reports a miss
//! and drops the entry.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::config::CacheConfig;
use super::lock::{read_guard, write_guard};

struct SlidingEntry {
    payload: String,
    touched: Instant,
}

/// Typed cache client with sliding expiration.
///
/// Values are stored in serialized form under string keys. Concurrent
/// writers are not coordinated; the last write wins, which is acceptable
/// for deterministic regeneration.
pub struct SlidingStore {
    ttl: Duration,
    entries: RwLock<LruCache<String, SlidingEntry>>,
}

impl SlidingStore {
    /// Create a store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: config.sitemap_ttl,
            entries: RwLock::new(LruCache::new(config.entry_limit_non_zero())),
        }
    }

    /// Look up and deserialize the value under `key`, refreshing its
    /// sliding window on a hit. Expired or undecodable entries read as a
    /// miss and are evicted.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = write_guard(&self.entries, "try_get");
        let value = match entries.get_mut(key) {
            None => {
                counter!("brezza_cache_miss_total").increment(1);
                return None;
            }
            Some(entry) => {
                if entry.touched.elapsed() >= self.ttl {
                    None
                } else {
                    entry.touched = Instant::now();
                    match serde_json::from_str(&entry.payload) {
                        Ok(value) => Some(value),
                        Err(err) => {
                            warn!(key, error = %err, "Dropping cache entry that no longer decodes");
                            None
                        }
                    }
                }
            }
        };
        match value {
            Some(value) => {
                counter!("brezza_cache_hit_total").increment(1);
                Some(value)
            }
            None => {
                entries.pop(key);
                counter!("brezza_cache_expired_total").increment(1);
                None
            }
        }
    }

    /// Serialize and store `value` under `key`, restarting its sliding
    /// window. A value that fails to serialize is skipped with a warning
    /// rather than surfacing an error to the caller.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, error = %err, "Skipping cache write for unserializable value");
                return;
            }
        };
        let entry = SlidingEntry {
            payload,
            touched: Instant::now(),
        };
        write_guard(&self.entries, "set").put(key.to_string(), entry);
    }

    /// Drop the entry under `key`, if present.
    pub fn remove(&self, key: &str) {
        write_guard(&self.entries, "remove").pop(key);
    }

    /// Number of stored slots, expired or not.
    pub fn len(&self) -> usize {
        read_guard(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::thread::sleep;

    use super::*;

    fn short_lived(ttl: Duration) -> SlidingStore {
        SlidingStore::new(&CacheConfig {
            sitemap_ttl: ttl,
            ..Default::default()
        })
    }

    #[test]
    fn roundtrip() {
        let store = SlidingStore::new(&CacheConfig::default());
        assert!(store.try_get::<Vec<String>>("docs").is_none());

        store.set("docs", &vec!["a".to_string(), "b".to_string()]);
        let cached = store.try_get::<Vec<String>>("docs").expect("cached value");
        assert_eq!(cached, vec!["a".to_string(), "b".to_string()]);

        store.remove("docs");
        assert!(store.try_get::<Vec<String>>("docs").is_none());
    }

    #[test]
    fn entry_expires_after_idle_window() {
        let store = short_lived(Duration::from_millis(60));
        store.set("docs", &"payload".to_string());

        sleep(Duration::from_millis(120));
        assert!(store.try_get::<String>("docs").is_none());
        // the expired slot is evicted, not retained
        assert!(store.is_empty());
    }

    #[test]
    fn access_refreshes_the_window() {
        let store = short_lived(Duration::from_millis(150));
        store.set("docs", &"payload".to_string());

        // three accesses spanning more than one full window
        for _ in 0..3 {
            sleep(Duration::from_millis(80));
            assert!(store.try_get::<String>("docs").is_some());
        }
    }

    #[test]
    fn lru_eviction_at_slot_limit() {
        let store = SlidingStore::new(&CacheConfig {
            entry_limit: 2,
            ..Default::default()
        });
        store.set("one", &1u32);
        store.set("two", &2u32);
        store.set("three", &3u32);

        assert!(store.try_get::<u32>("one").is_none());
        assert_eq!(store.try_get::<u32>("two"), Some(2));
        assert_eq!(store.try_get::<u32>("three"), Some(3));
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = SlidingStore::new(&CacheConfig::default());
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.entries.write().expect("entries lock");
            panic!("poison entries lock");
        }));

        store.set("docs", &"payload".to_string());
        assert_eq!(
            store.try_get::<String>("docs"),
            Some("payload".to_string())
        );
    }
}
