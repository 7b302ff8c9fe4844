use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Concurrent `string → V` map with per-entry deadlines (spec C2).
///
/// Reads take a shared lock and never mutate on an expired hit — only
/// `trim` deletes. `bulk` takes the map's exclusive lock once and hands
/// the closure a handle that inserts directly, so a full repopulation
/// never pays per-entry lock overhead and is atomic with respect to
/// readers.
pub struct Cache<V> {
    store: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> Cache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the current value if present and not expired. An expired
    /// entry counts as a miss but is left in place for `trim` to remove.
    pub fn try_get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let store = self.store.read();
        match store.get(key) {
            Some(entry) if entry.is_valid(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        let expires_at = Instant::now() + self.default_ttl;
        self.insert_with_deadline(key, value, expires_at);
    }

    pub fn insert_with_deadline(&self, key: impl Into<String>, value: V, expires_at: Instant) {
        self.store
            .write()
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Exclusive section for bulk repopulation. `f` receives a handle that
    /// writes straight into the already-locked map.
    pub fn bulk<F>(&self, f: F)
    where
        F: FnOnce(&mut BulkInserter<'_, V>),
    {
        let mut store = self.store.write();
        let mut inserter = BulkInserter {
            store: &mut store,
            default_ttl: self.default_ttl,
        };
        f(&mut inserter);
    }

    /// Removes every entry whose deadline has passed as of now.
    pub fn trim(&self) {
        let now = Instant::now();
        self.store.write().retain(|_, entry| entry.is_valid(now));
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle passed to a `Cache::bulk` closure; performs no locking of its own.
pub struct BulkInserter<'a, V> {
    store: &'a mut HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<'a, V> BulkInserter<'a, V> {
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let expires_at = Instant::now() + self.default_ttl;
        self.insert_with_deadline(key, value, expires_at);
    }

    pub fn insert_with_deadline(&mut self, key: impl Into<String>, value: V, expires_at: Instant) {
        self.store.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Removes entries already expired as of the moment the bulk section
    /// started, per spec step 3's "trim first" ordering.
    pub fn trim(&mut self) {
        let now = Instant::now();
        self.store.retain(|_, entry| entry.is_valid(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_hits() {
        let cache: Cache<String> = Cache::new(Duration::from_secs(60));
        cache.insert("a", "1".to_string());
        assert_eq!(cache.try_get("a"), Some("1".to_string()));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn expired_entry_counts_as_miss_and_is_not_returned() {
        let cache: Cache<String> = Cache::new(Duration::from_secs(60));
        cache.insert_with_deadline("a", "1".to_string(), Instant::now() - Duration::from_secs(1));
        assert_eq!(cache.try_get("a"), None);
        assert_eq!(cache.misses(), 1);
        // entry is still physically present until trim
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn trim_removes_only_expired_entries() {
        let cache: Cache<String> = Cache::new(Duration::from_secs(60));
        cache.insert_with_deadline("stale", "x".to_string(), Instant::now() - Duration::from_secs(1));
        cache.insert("fresh", "y".to_string());
        cache.trim();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.try_get("fresh"), Some("y".to_string()));
    }

    #[test]
    fn later_write_replaces_earlier_regardless_of_deadline() {
        let cache: Cache<String> = Cache::new(Duration::from_secs(60));
        cache.insert_with_deadline("a", "old".to_string(), Instant::now() + Duration::from_secs(600));
        cache.insert_with_deadline("a", "new".to_string(), Instant::now() + Duration::from_secs(1));
        assert_eq!(cache.try_get("a"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bulk_replaces_atomically() {
        let cache: Cache<String> = Cache::new(Duration::from_secs(60));
        cache.insert("old", "stale".to_string());
        cache.bulk(|b| {
            b.trim();
            b.insert("fresh", "value".to_string());
        });
        assert_eq!(cache.try_get("fresh"), Some("value".to_string()));
    }
}
