//! Session cookie handling for the admin listener.

use axum::{
    Extension, Form, Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, Request, StatusCode,
        header::{ACCEPT, AUTHORIZATION},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use time::OffsetDateTime;
use tracing::debug;
use url::form_urlencoded;
use uuid::Uuid;

use crate::application::{
    admin::{ActionResult, SessionClaims, auth::SESSION_COOKIE},
    error::ErrorReport,
    validation::FormData,
};

use super::{AdminState, errors::auth_error};

pub(super) const LOGIN_PATH: &str = "/admin/login";
const DEFAULT_CALLBACK: &str = "/admin";

/// The signed-in admin, inserted into request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: Uuid,
    pub email: String,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

pub(super) async fn admin_login(
    State(state): State<AdminState>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    let callback = safe_callback(form.get("callbackUrl"));

    match state.auth.login(&form, OffsetDateTime::now_utc()).await {
        Ok(session) => {
            let cookie = Cookie::build((SESSION_COOKIE, session.token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.secure_cookies)
                .max_age(state.auth.ttl());
            (
                jar.add(cookie),
                Json(ActionResult::success("Signed in.").with_url(callback)),
            )
                .into_response()
        }
        Err(err) => auth_error("infra::http::admin::auth::login", err).into_response(),
    }
}

pub(super) async fn admin_logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (
        jar,
        Json(ActionResult::success("Signed out.").with_url(LOGIN_PATH)),
    )
        .into_response()
}

pub(super) async fn admin_session(Extension(session): Extension<AdminSession>) -> Response {
    Json(json!({
        "user": {
            "id": session.user_id,
            "email": session.email,
        }
    }))
    .into_response()
}

/// Rejects requests without a valid session token for an existing user.
/// The token is read from the `jd_session` cookie or a Bearer header.
pub(super) async fn require_session(
    State(state): State<AdminState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(request.headers()));

    let claims = match token {
        Some(token) => state.auth.authenticate(&token).await,
        None => {
            return unauthorized(request.headers(), request.uri().path(), request.uri().query());
        }
    };

    match claims {
        Ok(claims) => {
            request.extensions_mut().insert(AdminSession::from(claims));
            next.run(request).await
        }
        Err(err) => {
            debug!(
                target = "jdigital::http::admin::auth",
                error = %err,
                "rejected admin session"
            );
            unauthorized(request.headers(), request.uri().path(), request.uri().query())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Browsers navigating to a page are sent to the login form; API callers get 401.
fn unauthorized(headers: &HeaderMap, path: &str, query: Option<&str>) -> Response {
    let accept = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if accept.contains("text/html") && !accept.contains("application/json") {
        let target = match query {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
        return Redirect::to(&format!("{LOGIN_PATH}?callbackUrl={encoded}")).into_response();
    }

    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response();
    ErrorReport::from_message(
        "infra::http::admin::auth::require_session",
        StatusCode::UNAUTHORIZED,
        format!("missing or invalid session for {path}"),
    )
    .attach(&mut response);
    response
}

/// Only same-site absolute paths are followed after login.
fn safe_callback(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => DEFAULT_CALLBACK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn callback_rejects_foreign_targets() {
        assert_eq!(safe_callback(Some("/admin/leads")), "/admin/leads");
        assert_eq!(safe_callback(Some("//evil.example")), "/admin");
        assert_eq!(safe_callback(Some("https://evil.example")), "/admin");
        assert_eq!(safe_callback(None), "/admin");
    }

    #[test]
    fn html_requests_are_redirected_with_callback() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        let response = unauthorized(&headers, "/admin/leads", Some("status=NEW"));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/admin/login?callbackUrl=%2Fadmin%2Fleads%3Fstatus%3DNEW"
        );
    }

    #[test]
    fn json_requests_get_401() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let response = unauthorized(&headers, "/admin/leads", None);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_header_is_read() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }
}
