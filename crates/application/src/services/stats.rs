use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A single named monotonic counter. Cheap to clone and share — increments
/// never take a lock.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn increment(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Named counters exposed to whatever out-of-core endpoint the host process
/// wires up. The registry itself only owns the directory of names; each
/// counter is lock-free once created.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    counters: Mutex<Vec<(String, Arc<Counter>)>>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counter for `name`, creating it on first use.
    pub fn create(&self, name: &str) -> Arc<Counter> {
        let mut counters = self.counters.lock();
        if let Some((_, counter)) = counters.iter().find(|(n, _)| n == name) {
            return Arc::clone(counter);
        }
        let counter = Arc::new(Counter::default());
        counters.push((name.to_string(), Arc::clone(&counter)));
        counter
    }

    /// Snapshot of every counter created so far, in creation order.
    pub fn get_all(&self) -> Vec<(String, u64)> {
        self.counters
            .lock()
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_idempotent_by_name() {
        let registry = StatsRegistry::new();
        let a = registry.create("api_requests");
        let b = registry.create("api_requests");
        a.increment(1);
        b.increment(2);
        assert_eq!(registry.get_all(), vec![("api_requests".to_string(), 3)]);
    }

    #[test]
    fn get_all_snapshots_every_counter() {
        let registry = StatsRegistry::new();
        registry.create("api_success").increment(5);
        registry.create("api_failure").increment(1);
        let snapshot = registry.get_all();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(&("api_success".to_string(), 5)));
        assert!(snapshot.contains(&("api_failure".to_string(), 1)));
    }
}
