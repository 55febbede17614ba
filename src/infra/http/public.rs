use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{ConnectInfo, Path, Query, State, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    application::{
        error::{ErrorReport, HttpError},
        leads::{LeadIntakeError, LeadIntakeService, SubmissionResult, UNREADABLE_MESSAGE},
        public::{PublicPage, PublicSiteService},
        rate_limit::client_ip,
        repos::PublicContentRepo,
        sitemap::SitemapService,
        validation::{AuditSubmission, ConsultationSubmission},
    },
    cache::{CacheState, response_cache_layer},
};

use super::{
    health_response,
    middleware::{log_responses, set_request_context},
};

const NO_STORE: &str = "no-store";

#[derive(Clone)]
pub struct PublicState {
    pub site: Arc<PublicSiteService>,
    pub sitemap: Arc<SitemapService>,
    pub leads: Arc<LeadIntakeService>,
    pub repo: Arc<dyn PublicContentRepo>,
    pub trust_forwarded_for: bool,
    pub cache: Option<CacheState>,
}

pub fn build_public_router(state: PublicState) -> Router {
    let cached_routes = Router::new()
        .route("/api/site", get(site))
        .route("/api/services", get(services))
        .route("/api/portfolio", get(portfolio))
        .route("/api/portfolio/{slug}", get(portfolio_detail))
        .route("/api/process", get(process))
        .route("/api/pricing", get(pricing))
        .route("/api/about", get(about))
        .route("/api/contact", get(contact))
        .route("/sitemap.xml", get(sitemap));

    let cached_routes = if let Some(cache_state) = state.cache.clone() {
        cached_routes.layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        cached_routes
    };

    let uncached_routes = Router::new()
        .route("/api/leads", post(submit_consultation))
        .route("/api/leads/audit", post(submit_audit))
        .route("/_health", get(health));

    cached_routes
        .merge(uncached_routes)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PortfolioQuery {
    industry: Option<String>,
}

async fn site(State(state): State<PublicState>) -> Response {
    page_response(state.site.home().await)
}

async fn services(State(state): State<PublicState>) -> Response {
    page_response(state.site.services().await)
}

async fn portfolio(
    State(state): State<PublicState>,
    Query(query): Query<PortfolioQuery>,
) -> Response {
    let page = state.site.portfolio(query.industry.as_deref()).await;
    let degraded = page.page.degraded;
    json_response(&page, degraded)
}

async fn portfolio_detail(State(state): State<PublicState>, Path(slug): Path<String>) -> Response {
    match state.site.portfolio_detail(&slug).await {
        Some(project) => Json(project).into_response(),
        None => HttpError::new(
            "infra::http::public::portfolio_detail",
            StatusCode::NOT_FOUND,
            "Project not found.",
            format!("no portfolio project with slug `{slug}`"),
        )
        .into_response(),
    }
}

async fn process(State(state): State<PublicState>) -> Response {
    page_response(state.site.process().await)
}

async fn pricing(State(state): State<PublicState>) -> Response {
    page_response(state.site.pricing().await)
}

async fn about(State(state): State<PublicState>) -> Response {
    page_response(state.site.about().await)
}

async fn contact(State(state): State<PublicState>) -> Response {
    page_response(state.site.contact().await)
}

async fn sitemap(State(state): State<PublicState>) -> Response {
    let sitemap = state.sitemap.render(OffsetDateTime::now_utc()).await;
    let mut response = sitemap.xml.into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/xml; charset=utf-8"),
    );
    let cache_control = if sitemap.partial {
        NO_STORE
    } else {
        "public, max-age=3600"
    };
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    response
}

fn page_response(page: PublicPage) -> Response {
    let degraded = page.degraded;
    json_response(&page, degraded)
}

/// Fallback pages are marked `no-store` so the response cache and browsers skip them.
fn json_response<T: Serialize>(body: &T, degraded: bool) -> Response {
    let mut response = Json(body).into_response();
    if degraded {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    }
    response
}

async fn health(State(state): State<PublicState>) -> Response {
    health_response(&state.repo).await
}

fn visitor_key(
    state: &PublicState,
    headers: &HeaderMap,
    peer: Option<Extension<ConnectInfo<SocketAddr>>>,
) -> String {
    let peer = peer.map(|Extension(ConnectInfo(addr))| addr);
    client_ip(headers, peer, state.trust_forwarded_for)
}

async fn submit_consultation(
    State(state): State<PublicState>,
    headers: HeaderMap,
    peer: Option<Extension<ConnectInfo<SocketAddr>>>,
    input: Result<Json<ConsultationSubmission>, JsonRejection>,
) -> Response {
    let source = "infra::http::public::submit_consultation";
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return unreadable_submission(source, rejection),
    };
    let ip = visitor_key(&state, &headers, peer);
    submission_response(
        source,
        state.leads.submit_consultation(&input, &ip).await,
    )
}

async fn submit_audit(
    State(state): State<PublicState>,
    headers: HeaderMap,
    peer: Option<Extension<ConnectInfo<SocketAddr>>>,
    input: Result<Json<AuditSubmission>, JsonRejection>,
) -> Response {
    let source = "infra::http::public::submit_audit";
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return unreadable_submission(source, rejection),
    };
    let ip = visitor_key(&state, &headers, peer);
    submission_response(
        source,
        state.leads.submit_audit(&input, &ip).await,
    )
}

fn submission_response(
    source: &'static str,
    outcome: Result<SubmissionResult, LeadIntakeError>,
) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            let status = match &err {
                LeadIntakeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LeadIntakeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                LeadIntakeError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let mut response = (status, Json(err.to_result())).into_response();
            ErrorReport::from_error(source, status, &err).attach(&mut response);
            response
        }
    }
}

/// Bodies that are not JSON or do not fit the form still get the submission envelope.
fn unreadable_submission(source: &'static str, rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let mut response = (status, Json(SubmissionResult::rejected(UNREADABLE_MESSAGE))).into_response();
    ErrorReport::from_error(source, status, &rejection).attach(&mut response);
    response
}
