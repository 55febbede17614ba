//! In-memory store of rendered public responses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

/// A cached response, keyed by request path and query string hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub path: String,
    pub query_hash: u64,
}

impl ResponseKey {
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        Self {
            path: path.into(),
            query_hash: hash_query(query),
        }
    }

    /// Whether the entry belongs to `route` or a sub-path of it.
    pub fn under(&self, route: &str) -> bool {
        self.path == route
            || self
                .path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

pub fn hash_query(query: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

pub struct ResponseStore {
    responses: RwLock<LruCache<ResponseKey, CachedResponse>>,
}

impl ResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            responses: RwLock::new(LruCache::new(config.response_limit_non_zero())),
        }
    }

    pub fn get(&self, key: &ResponseKey) -> Option<CachedResponse> {
        // LRU lookups reorder entries, so even reads take the write lock.
        let cached = rw_write(&self.responses, "get").get(key).cloned();
        if cached.is_some() {
            counter!("jdigital_cache_hit_total").increment(1);
        } else {
            counter!("jdigital_cache_miss_total").increment(1);
        }
        cached
    }

    pub fn set(&self, key: ResponseKey, response: CachedResponse) {
        let evicted = rw_write(&self.responses, "set").push(key.clone(), response);
        if matches!(evicted, Some((evicted_key, _)) if evicted_key != key) {
            counter!("jdigital_cache_evict_total").increment(1);
        }
    }

    /// Drop every entry under `route`, whatever its query string. Returns the count removed.
    pub fn invalidate_route(&self, route: &str) -> usize {
        let mut responses = rw_write(&self.responses, "invalidate_route");
        let stale: Vec<ResponseKey> = responses
            .iter()
            .filter(|(key, _)| key.under(route))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            responses.pop(key);
        }
        stale.len()
    }

    pub fn clear(&self) {
        rw_write(&self.responses, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.responses, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
