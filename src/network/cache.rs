//! Read-result cache shared by every clone of a dispatcher
//!
//! Entries are keyed by `("read", url)`. Invalidation is global: one
//! successful write marks every entry stale. Entries nobody has used for the
//! gc time are evicted, unless a read for them is in flight.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, Shared};

use crate::constants::DEFAULT_GC_TIME_SECS;
use crate::models::ApiResponse;

/// A read call that several callers may await at once
pub type ReadFuture = Shared<BoxFuture<'static, Result<ApiResponse, String>>>;

const READ_SCOPE: &str = "read";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: &'static str,
    url: String,
}

impl QueryKey {
    pub fn read(url: impl Into<String>) -> Self {
        QueryKey {
            scope: READ_SCOPE,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

struct CacheEntry {
    response: ApiResponse,
    fetched_at: Instant,
    last_used: Instant,
    invalidated: bool,
}

pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, ReadFuture>,
    stale_time: Duration,
    gc_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self::with_gc_time(stale_time, Duration::from_secs(DEFAULT_GC_TIME_SECS))
    }

    pub fn with_gc_time(stale_time: Duration, gc_time: Duration) -> Self {
        QueryCache {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            stale_time,
            gc_time,
        }
    }

    /// Cached response, if present, not invalidated and within the stale time
    pub fn get_fresh(&self, key: &QueryKey) -> Option<ApiResponse> {
        self.entries
            .get(key)
            .filter(|entry| !entry.invalidated && entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.response.clone())
    }

    /// Cached response regardless of freshness
    pub fn get(&self, key: &QueryKey) -> Option<&ApiResponse> {
        self.entries.get(key).map(|entry| &entry.response)
    }

    pub fn store(&mut self, key: QueryKey, response: ApiResponse) {
        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                response,
                fetched_at: now,
                last_used: now,
                invalidated: false,
            },
        );
    }

    /// Record that `key` is being looked at
    pub fn touch(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = Instant::now();
        }
    }

    /// Drop entries unused for longer than the gc time. `observed` and keys
    /// with a read in flight are kept. Returns how many were dropped.
    pub fn evict_unused(&mut self, observed: &QueryKey) -> usize {
        let before = self.entries.len();
        let gc_time = self.gc_time;
        let in_flight = &self.in_flight;
        self.entries.retain(|key, entry| {
            key == observed || in_flight.contains_key(key) || entry.last_used.elapsed() < gc_time
        });
        before - self.entries.len()
    }

    /// Mark every cached read stale
    pub fn invalidate_all(&mut self) -> usize {
        for entry in self.entries.values_mut() {
            entry.invalidated = true;
        }
        self.entries.len()
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.get_fresh(key).is_none()
    }

    pub fn in_flight(&self, key: &QueryKey) -> Option<ReadFuture> {
        self.in_flight.get(key).cloned()
    }

    pub fn begin(&mut self, key: QueryKey, call: ReadFuture) {
        self.in_flight.insert(key, call);
    }

    /// Forget the in-flight call for `key`, but only if it is still `call`
    pub fn finish(&mut self, key: &QueryKey, call: &ReadFuture) {
        if self.in_flight.get(key).is_some_and(|current| current.ptr_eq(call)) {
            self.in_flight.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use serde_json::json;

    fn response(n: u64) -> ApiResponse {
        ApiResponse {
            data: json!({ "n": n }),
            status: 200,
            status_text: "OK".into(),
            time_ms: n,
            size_bytes: 7,
        }
    }

    #[test]
    fn test_store_and_get_fresh() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::read("http://a");
        assert!(cache.is_stale(&key));

        cache.store(key.clone(), response(1));
        assert_eq!(cache.get_fresh(&key), Some(response(1)));
        assert!(cache.get_fresh(&QueryKey::read("http://b")).is_none());
    }

    #[test]
    fn test_invalidate_all_marks_every_key() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.store(QueryKey::read("http://a"), response(1));
        cache.store(QueryKey::read("http://b"), response(2));

        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.is_stale(&QueryKey::read("http://a")));
        assert!(cache.is_stale(&QueryKey::read("http://b")));
        // Stale data is still there for display
        assert_eq!(cache.get(&QueryKey::read("http://a")), Some(&response(1)));
    }

    #[test]
    fn test_zero_stale_time_is_never_fresh() {
        let mut cache = QueryCache::new(Duration::ZERO);
        let key = QueryKey::read("http://a");
        cache.store(key.clone(), response(1));
        assert!(cache.is_stale(&key));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_unused_keeps_observed_and_in_flight() {
        let mut cache = QueryCache::with_gc_time(Duration::from_secs(60), Duration::ZERO);
        let a = QueryKey::read("http://a");
        let b = QueryKey::read("http://b");
        let c = QueryKey::read("http://c");
        cache.store(a.clone(), response(1));
        cache.store(b.clone(), response(2));
        cache.store(c.clone(), response(3));
        let call: ReadFuture = async { Ok(response(4)) }.boxed().shared();
        cache.begin(c.clone(), call);

        assert_eq!(cache.evict_unused(&a), 1);
        assert_eq!(cache.get(&a), Some(&response(1)));
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_recently_used_entries_survive_eviction() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let a = QueryKey::read("http://a");
        cache.store(a.clone(), response(1));
        cache.store(QueryKey::read("http://b"), response(2));
        cache.invalidate_all();
        cache.touch(&a);

        assert_eq!(cache.evict_unused(&QueryKey::read("http://z")), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_finish_ignores_replaced_call() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::read("http://a");
        let first: ReadFuture = async { Ok(response(1)) }.boxed().shared();
        let second: ReadFuture = async { Ok(response(2)) }.boxed().shared();

        cache.begin(key.clone(), first.clone());
        cache.begin(key.clone(), second.clone());
        cache.finish(&key, &first);
        assert!(cache.in_flight(&key).is_some());

        cache.finish(&key, &second);
        assert!(cache.in_flight(&key).is_none());
    }
}
