//! Expiring Cache
//! Mission: Generic TTL cache with lazy invalidation, shared by read-heavy
//! endpoints

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

// Opportunistic purge kicks in once the map grows past this.
const PURGE_THRESHOLD: usize = 4096;

/// Maps keys to `(value, insertion time)` under a fixed TTL.
///
/// Entries are never evicted in the background; a stale entry is dropped
/// by the `get` that observes it. Concurrent readers racing an expiry can
/// at worst both miss and refill, which costs a redundant recompute.
pub struct ExpiringCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a live value. Returns `None` for absent keys and for entries
    /// older than the TTL; the latter are removed on the spot.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();

        let stale = matches!(entries.get(key), Some((_, at)) if at.elapsed() >= self.ttl);
        if stale {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|(value, _)| value.clone())
    }

    /// Store a value, stamping it with the current time. Replaces any
    /// previous entry for the key, fresh or stale.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        if entries.len() >= PURGE_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, (_, at)| at.elapsed() < ttl);
        }
        entries.insert(key, (value, Instant::now()));
    }

    /// Drop a key regardless of age, returning its value if one was stored.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.lock().remove(key).map(|(value, _)| value)
    }

    /// Sweep all stale entries at once. Reads already drop what they touch,
    /// so this only matters for bounding memory after a burst of one-off keys.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.lock().retain(|_, (_, at)| at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
