//! Admin sessions: credential checks and signed session tokens.
//!
//! Sessions are HS256 tokens carrying the user id and email. Without a
//! signing secret nobody can log in and every token is rejected.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::repos::{RepoError, UsersRepo};
use crate::application::validation::{FieldErrors, FormData, users::validate_login};
use crate::domain::entities::UserRecord;

pub const SESSION_COOKIE: &str = "jd_session";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication is not configured. Set auth.secret and restart the server.")]
    NotConfigured,
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Unauthorized")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("Unauthorized")]
    UnknownUser(Uuid),
    #[error("failed to sign session token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: SessionClaims,
    pub user: UserRecord,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    secret: Option<Arc<str>>,
    ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, secret: Option<String>, ttl_hours: i64) -> Self {
        Self {
            users,
            secret: secret
                .filter(|value| !value.trim().is_empty())
                .map(Arc::from),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn login(&self, form: &FormData, now: OffsetDateTime) -> Result<Session, AuthError> {
        let secret = self.secret.as_deref().ok_or(AuthError::NotConfigured)?;
        let credentials = validate_login(form).map_err(AuthError::Validation)?;

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            warn!(target = "jdigital::admin::auth", "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(credentials.password, user.password_hash.clone()).await? {
            warn!(
                target = "jdigital::admin::auth",
                user_id = %user.id,
                "login with wrong password"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(AuthError::Signing)?;

        info!(target = "jdigital::admin::auth", user_id = %user.id, "admin logged in");
        Ok(Session {
            token,
            claims,
            user,
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let secret = self.secret.as_deref().ok_or(AuthError::NotConfigured)?;
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(AuthError::InvalidToken)
    }

    /// Verifies the token and confirms its user still exists.
    pub async fn authenticate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self.verify(token)?;
        if self.users.find_by_id(claims.sub).await?.is_none() {
            warn!(
                target = "jdigital::admin::auth",
                user_id = %claims.sub,
                "session for a deleted user"
            );
            return Err(AuthError::UnknownUser(claims.sub));
        }
        Ok(claims)
    }
}

/// Runs bcrypt on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
        .map_err(|err| AuthError::Hashing(err.to_string()))
}
