mod admin;
mod middleware;
mod public;

pub use admin::{AdminSession, AdminState, build_admin_router};
pub use public::{PublicState, build_public_router};

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::repos::{PublicContentRepo, RepoError};

async fn health_response(repo: &Arc<dyn PublicContentRepo>) -> Response {
    match repo.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            let mut response = (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a repository error to a consistent HTTP error response for admin/public surfaces.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::InvalidInput { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Integrity constraint violated",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            "Database timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Persistence error",
            message,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_conflict() {
        let err = repo_error_to_http(
            "test",
            RepoError::Duplicate {
                constraint: "services_slug_key".into(),
            },
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(
            repo_error_to_http("test", RepoError::Timeout).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
