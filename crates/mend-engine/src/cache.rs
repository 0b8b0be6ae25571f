//! Cache of validated resolutions.
//!
//! Keys combine the element name with a fingerprint of the exact sanitized
//! fragment the model saw, so the same element on a changed page misses.
//! Expiry is checked lazily on read; eviction happens inline on write.
//! Shared across concurrent resolution requests behind a mutex.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub element: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    locator: String,
    expires_at: Instant,
}

pub struct ResolutionCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResolutionCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a previously validated locator. An expired entry is removed
    /// and reported as absent.
    pub fn get(&self, element: &str, fingerprint: &str) -> Option<String> {
        let key = CacheKey {
            element: element.to_string(),
            fingerprint: fingerprint.to_string(),
        };
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.locator.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a validated locator. When the capacity bound would be crossed,
    /// expired entries are purged first and then the entry closest to expiry
    /// is evicted.
    pub fn put(&self, element: &str, fingerprint: &str, locator: &str) {
        let key = CacheKey {
            element: element.to_string(),
            fingerprint: fingerprint.to_string(),
        };
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.capacity {
                let earliest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(k) = earliest {
                    entries.remove(&k);
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                locator: locator.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
