//! Response cache middleware for the public router.
//!
//! Serves successful GET responses from memory until an admin mutation
//! invalidates their route.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header::CACHE_CONTROL},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use super::{
    CacheConfig,
    store::{CachedResponse, ResponseKey, ResponseStore},
};

const MAX_CACHED_BODY: usize = 1024 * 1024;

#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<ResponseStore>,
}

impl CacheState {
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(ResponseStore::new(&config));
        Self { config, store }
    }
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = ResponseKey::new(
        request.uri().path(),
        request.uri().query().unwrap_or_default(),
    );

    if let Some(cached) = cache.store.get(&key) {
        debug!(cache = "response", outcome = "hit", "serving cached response");
        return build_response(cached);
    }
    debug!(cache = "response", outcome = "miss", "executing handler");

    let response = next.run(request).await;
    if response.status() != StatusCode::OK || forbids_storage(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_CACHED_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    cache.store.set(
        key,
        CachedResponse {
            status: parts.status.as_u16(),
            headers: parts
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.to_string(), value.to_string()))
                })
                .collect(),
            body: bytes.clone(),
        },
    );

    Response::from_parts(parts, Body::from(bytes))
}

/// Fallback pages rendered during a store outage carry `no-store`.
fn forbids_storage(response: &Response) -> bool {
    response
        .headers()
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|directive| {
            let directive = directive.trim();
            directive.eq_ignore_ascii_case("no-store") || directive.eq_ignore_ascii_case("private")
        })
}

fn build_response(cached: CachedResponse) -> Response {
    let mut builder = Response::builder().status(cached.status);
    for (name, value) in cached.headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, value);
        }
    }
    builder
        .header("x-cache", "hit")
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app(cache: CacheState, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/api/pricing",
                get(move || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "packages"
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(cache, response_cache_layer))
    }

    fn get_pricing() -> Request<Body> {
        Request::builder()
            .uri("/api/pricing")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache_until_invalidated() {
        let cache = CacheState::new(CacheConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(cache.clone(), calls.clone());

        app.clone().oneshot(get_pricing()).await.unwrap();
        let second = app.clone().oneshot(get_pricing()).await.unwrap();
        assert_eq!(second.headers()["x-cache"], "hit");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.store.invalidate_route("/api/pricing");
        app.oneshot(get_pricing()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_store_responses_are_not_kept() {
        let cache = CacheState::new(CacheConfig::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new()
            .route(
                "/api/site",
                get(move || {
                    let calls = counter.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        ([(CACHE_CONTROL, "no-store")], "fallback")
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(cache, response_cache_layer));
        let request = || Request::builder().uri("/api/site").body(Body::empty()).unwrap();

        app.clone().oneshot(request()).await.unwrap();
        let second = app.oneshot(request()).await.unwrap();
        assert!(second.headers().get("x-cache").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disabled_cache_always_runs_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = app(CacheState::new(CacheConfig::disabled()), calls.clone());
        app.clone().oneshot(get_pricing()).await.unwrap();
        app.oneshot(get_pricing()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
