//! Response cache for the public API.
//!
//! Successful GET responses are kept in an LRU store keyed by path and
//! query. Admin mutations consult the [`InvalidationTable`] to evict the
//! routes whose data changed.
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 200
//! ```

mod config;
mod invalidation;
mod lock;
mod middleware;
mod store;

pub use config::CacheConfig;
pub use invalidation::{CacheInvalidator, InvalidationTable, cached_routes};
pub use middleware::{CacheState, response_cache_layer};
pub use store::{CachedResponse, ResponseKey, ResponseStore, hash_query};
