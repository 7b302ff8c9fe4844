use std::time::Duration;

use crate::services::ttl_cache::Cache;

/// Per-key miss suppression window, built on a dedicated `Cache<String>`
/// (spec C3). Throttling is keyed on `key` alone — the stored client
/// address is diagnostic only, so a second distinct client missing on the
/// same key within the window is throttled too. This caps provider
/// fan-out per key, not per client.
pub struct Throttler {
    cache: Cache<String>,
}

impl Throttler {
    pub fn new() -> Self {
        Self {
            cache: Cache::new(Duration::from_secs(240)),
        }
    }

    /// A client looking itself up (`client_addr == key`) is never
    /// throttled.
    pub fn is_throttled(&self, client_addr: &str, key: &str) -> bool {
        if client_addr == key {
            return false;
        }
        self.cache.try_get(key).is_some()
    }

    /// Records that `client_addr` just missed on `key`, overwriting any
    /// existing entry.
    pub fn on_miss(&self, key: &str, client_addr: &str) {
        self.cache.insert(key, client_addr.to_string());
    }

    pub fn trim(&self) {
        self.cache.trim();
    }
}

impl Default for Throttler {
    fn default() -> Self {
        Self::new()
    }
}
