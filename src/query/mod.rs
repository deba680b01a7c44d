//! Keyed request cache for paginated fetches.
//!
//! Each page request is identified by a [`QueryKey`]. The cache keeps the
//! last successful value per key, tracks which keys have a request in
//! flight (so the same key is never requested twice concurrently), and
//! evicts entries that have not been refreshed within `gc_time`.
//!
//! The cache does not decide what is displayed. Callers compare the key of
//! an incoming result with their current key; results for any other key
//! only refresh the cache.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Identity of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u32,
    pub per_page: u32,
}

impl QueryKey {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }
}

struct Entry<V> {
    value: V,
    updated_at: Instant,
}

pub struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    in_flight: HashSet<QueryKey>,
    gc_time: Duration,
}

impl<V> QueryCache<V> {
    pub fn new(gc_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
            gc_time,
        }
    }

    /// Last successful value for `key`, if still cached.
    pub fn get(&self, key: &QueryKey) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Mark `key` as being fetched.
    ///
    /// Returns `false` when a request for the same key is already running,
    /// in which case the caller must not issue another one.
    pub fn begin(&mut self, key: QueryKey) -> bool {
        self.in_flight.insert(key)
    }

    /// Store a successful result.
    pub fn complete(&mut self, key: QueryKey, value: V) {
        self.in_flight.remove(&key);
        self.entries.insert(
            key,
            Entry {
                value,
                updated_at: Instant::now(),
            },
        );
    }

    /// Record a failed request. Any previously cached value is dropped.
    pub fn fail(&mut self, key: QueryKey) {
        self.in_flight.remove(&key);
        self.entries.remove(&key);
    }

    /// Forget that `key` is being fetched without touching its cached
    /// value. Used when a request was never sent or its answer will never
    /// arrive.
    pub fn abort(&mut self, key: QueryKey) {
        self.in_flight.remove(&key);
    }

    pub fn abort_all(&mut self) {
        self.in_flight.clear();
    }

    /// Evict stale entries, never touching `active`. Returns the number evicted.
    pub fn gc(&mut self, active: Option<QueryKey>) -> usize {
        self.gc_at(Instant::now(), active)
    }

    fn gc_at(&mut self, now: Instant, active: Option<QueryKey>) -> usize {
        let gc_time = self.gc_time;
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            Some(*key) == active || now.saturating_duration_since(entry.updated_at) < gc_time
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_deduplicates() {
        let mut cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(1, 5);

        assert!(cache.begin(key));
        assert!(!cache.begin(key));
        assert!(cache.is_in_flight(&key));

        // A different page is independent.
        assert!(cache.begin(QueryKey::new(2, 5)));
        // So is a different page size.
        assert!(cache.begin(QueryKey::new(1, 10)));
    }

    #[test]
    fn test_complete_stores_and_clears_in_flight() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(1, 5);

        cache.begin(key);
        cache.complete(key, "page one");
        assert!(!cache.is_in_flight(&key));
        assert_eq!(cache.get(&key), Some(&"page one"));

        // Refetch replaces the value wholesale.
        assert!(cache.begin(key));
        cache.complete(key, "page one v2");
        assert_eq!(cache.get(&key), Some(&"page one v2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fail_drops_cached_value() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(3, 5);

        cache.begin(key);
        cache.complete(key, 1);
        cache.begin(key);
        cache.fail(key);

        assert!(cache.get(&key).is_none());
        assert!(!cache.is_in_flight(&key));
    }

    #[test]
    fn test_abort_allows_new_request_and_keeps_value() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new(2, 5);
        cache.complete(key, "cached");

        assert!(cache.begin(key));
        cache.abort(key);
        assert!(!cache.is_in_flight(&key));
        assert_eq!(cache.get(&key), Some(&"cached"));
        assert!(cache.begin(key));

        assert!(cache.begin(QueryKey::new(3, 5)));
        cache.abort_all();
        assert!(!cache.is_in_flight(&key));
        assert!(!cache.is_in_flight(&QueryKey::new(3, 5)));
    }

    #[test]
    fn test_gc_evicts_stale_but_keeps_active() {
        let mut cache = QueryCache::new(Duration::ZERO);
        let a = QueryKey::new(1, 5);
        let b = QueryKey::new(2, 5);
        cache.complete(a, 'a');
        cache.complete(b, 'b');

        let later = Instant::now() + Duration::from_millis(1);
        let evicted = cache.gc_at(later, Some(b));

        assert_eq!(evicted, 1);
        assert!(cache.get(&a).is_none());
        assert_eq!(cache.get(&b), Some(&'b'));
    }

    #[test]
    fn test_gc_keeps_fresh_entries() {
        let mut cache = QueryCache::new(Duration::from_secs(300));
        cache.complete(QueryKey::new(1, 5), ());
        assert_eq!(cache.gc(None), 0);
        assert!(!cache.is_empty());
    }
}
