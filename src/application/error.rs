use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    application::repos::RepoError, domain::error::DomainError, infra::error::InfraError,
};

/// Diagnostic carried in response extensions for the response logger.
/// Never serialized to the visitor or the admin panel.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Module path of the handler or service that produced the failure.
    pub source: &'static str,
    pub status: StatusCode,
    /// The error's message followed by each `source()` in the chain.
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let messages = std::iter::successors(Some(error), |current| (*current).source())
            .map(ToString::to_string)
            .collect();
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A failure with a fixed public message and a detailed report for the logs.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: String,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response =
            (self.status, Json(json!({ "error": self.public_message }))).into_response();
        self.report.attach(&mut response);
        response
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Repo(RepoError::NotFound) | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Domain(_)
            | AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Repo(RepoError::Duplicate { .. }) => StatusCode::CONFLICT,
            AppError::Repo(RepoError::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Repo(RepoError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Repo(RepoError::Integrity { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Infra(InfraError::Configuration { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Infra(InfraError::Telemetry(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Infra(InfraError::Database { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(InfraError::Bind { .. } | InfraError::Migration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Repo(RepoError::NotFound) | AppError::NotFound => "Resource not found",
            AppError::Domain(_)
            | AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Validation(_) => "Request could not be processed",
            AppError::Repo(RepoError::Duplicate { .. }) => "Resource already exists",
            AppError::Repo(RepoError::Timeout | RepoError::Persistence(_))
            | AppError::Infra(InfraError::Database { .. }) => "Service temporarily unavailable",
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Bind { .. }) => "Listener could not start",
            AppError::Infra(InfraError::Migration(_)) => "Database schema could not be migrated",
            AppError::Repo(RepoError::Integrity { .. })
            | AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, Json(json!({ "error": message }))).into_response();
        report.attach(&mut response);
        response
    }
}
