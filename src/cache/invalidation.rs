//! Which pages go stale when an entity changes.
//!
//! The table speaks in site paths (`/pricing`, `/admin/leads`); the
//! response store speaks in API routes. Site paths without a cached
//! public route are recorded in the log only.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::types::EntityKind;

use super::store::ResponseStore;

const DEFAULT_TABLE: &[(EntityKind, &[&str])] = &[
    (EntityKind::SiteSettings, &["/", "/contact", "/admin/site"]),
    (EntityKind::Service, &["/", "/services"]),
    (EntityKind::PortfolioProject, &["/", "/portfolio"]),
    (EntityKind::ProjectCategory, &["/admin/portfolio"]),
    (EntityKind::ProcessStep, &["/", "/process"]),
    (EntityKind::PricingPackage, &["/", "/pricing"]),
    (EntityKind::Faq, &["/", "/pricing", "/contact"]),
    (EntityKind::Testimonial, &["/", "/about"]),
    (EntityKind::Lead, &["/admin/leads"]),
    (EntityKind::MediaAsset, &["/admin/media"]),
    (EntityKind::User, &["/admin/users"]),
];

#[derive(Debug, Clone)]
pub struct InvalidationTable {
    entries: Vec<(EntityKind, &'static [&'static str])>,
}

impl Default for InvalidationTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_TABLE.to_vec(),
        }
    }
}

impl InvalidationTable {
    pub fn paths(&self, kind: EntityKind) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == kind)
            .map(|(_, paths)| *paths)
            .unwrap_or(&[])
    }
}

/// Cached API routes serving the data behind a site path.
pub fn cached_routes(site_path: &str) -> &'static [&'static str] {
    match site_path {
        "/" => &["/api/site"],
        "/services" => &["/api/services"],
        "/portfolio" => &["/api/portfolio", "/sitemap.xml"],
        "/process" => &["/api/process"],
        "/pricing" => &["/api/pricing"],
        "/about" => &["/api/about"],
        "/contact" => &["/api/contact"],
        _ => &[],
    }
}

/// Applies the table to the response store after a successful mutation.
#[derive(Clone)]
pub struct CacheInvalidator {
    table: Arc<InvalidationTable>,
    store: Option<Arc<ResponseStore>>,
}

impl CacheInvalidator {
    pub fn new(table: InvalidationTable, store: Option<Arc<ResponseStore>>) -> Self {
        Self {
            table: Arc::new(table),
            store,
        }
    }

    /// An invalidator with no store; useful when caching is off.
    pub fn detached() -> Self {
        Self::new(InvalidationTable::default(), None)
    }

    /// Returns the site paths that were marked stale.
    pub fn invalidate(&self, kind: EntityKind) -> &'static [&'static str] {
        let paths = self.table.paths(kind);
        let mut removed = 0;
        for path in paths {
            let routes = cached_routes(path);
            if routes.is_empty() {
                debug!(
                    target = "jdigital::cache::invalidation",
                    entity = kind.as_str(),
                    path,
                    "path has no cached route"
                );
                continue;
            }
            if let Some(store) = &self.store {
                for route in routes {
                    removed += store.invalidate_route(route);
                }
            }
        }
        info!(
            target = "jdigital::cache::invalidation",
            entity = kind.as_str(),
            paths = ?paths,
            removed,
            "invalidated cached pages"
        );
        paths
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::cache::config::CacheConfig;
    use crate::cache::store::{CachedResponse, ResponseKey};

    fn cached() -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: Vec::new(),
            body: Bytes::from_static(b"{}"),
        }
    }

    #[test]
    fn faq_change_touches_home_pricing_and_contact() {
        let table = InvalidationTable::default();
        assert_eq!(table.paths(EntityKind::Faq), ["/", "/pricing", "/contact"]);
        assert_eq!(table.paths(EntityKind::ProjectCategory), ["/admin/portfolio"]);
    }

    #[test]
    fn pricing_save_evicts_only_affected_routes() {
        let store = Arc::new(ResponseStore::new(&CacheConfig::default()));
        for route in ["/api/site", "/api/pricing", "/api/about"] {
            store.set(ResponseKey::new(route, ""), cached());
        }

        let invalidator = CacheInvalidator::new(InvalidationTable::default(), Some(store.clone()));
        invalidator.invalidate(EntityKind::PricingPackage);

        assert!(store.get(&ResponseKey::new("/api/site", "")).is_none());
        assert!(store.get(&ResponseKey::new("/api/pricing", "")).is_none());
        assert!(store.get(&ResponseKey::new("/api/about", "")).is_some());
    }

    #[test]
    fn admin_only_paths_leave_store_untouched() {
        let store = Arc::new(ResponseStore::new(&CacheConfig::default()));
        store.set(ResponseKey::new("/api/site", ""), cached());

        let invalidator = CacheInvalidator::new(InvalidationTable::default(), Some(store.clone()));
        assert_eq!(invalidator.invalidate(EntityKind::Lead), ["/admin/leads"]);
        assert_eq!(store.len(), 1);
    }
}
