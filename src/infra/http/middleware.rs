use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use metrics::histogram;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request id, echoed in the `x-request-id` response header.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Reuses a well-formed inbound `x-request-id` (from the reverse proxy) or mints one.
pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= 64)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    request.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(
        "jdigital_http_request_ms",
        "method" => method.to_string(),
        "status" => status_class(status.as_u16()),
    )
    .record(elapsed_ms);

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (source, chain) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = chain.first().map(String::as_str).unwrap_or("no diagnostic");

    if status.is_server_error() {
        error!(
            target = "jdigital::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms,
            source,
            detail,
            chain = ?chain,
            request_id = %request_id,
            "request failed"
        );
    } else {
        warn!(
            target = "jdigital::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            source,
            detail,
            request_id = %request_id,
            "request rejected"
        );
    }

    response
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_bucketed() {
        assert_eq!(status_class(200), "2xx");
        assert_eq!(status_class(303), "3xx");
        assert_eq!(status_class(429), "4xx");
        assert_eq!(status_class(503), "5xx");
    }
}
