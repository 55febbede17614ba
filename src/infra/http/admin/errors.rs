//! Maps admin service failures onto HTTP errors.
//!
//! The public message is the service error's own text, so the panel can show
//! it as-is in its `{error}` body.

use axum::http::StatusCode;

use crate::{
    application::{
        admin::{
            AdminContentError, AdminLeadError, AdminSettingsError, AuthError, MediaError,
            StorageError, UserAdminError,
        },
        error::HttpError,
    },
    infra::http::repo_error_to_http,
};

pub(super) fn admin_content_error(source: &'static str, err: AdminContentError) -> HttpError {
    let status = match err {
        AdminContentError::Repo(repo) => return repo_error_to_http(source, repo),
        AdminContentError::Validation(_) | AdminContentError::MissingId(_) => {
            StatusCode::BAD_REQUEST
        }
        AdminContentError::NotFound(_) => StatusCode::NOT_FOUND,
        AdminContentError::Conflict(_) => StatusCode::CONFLICT,
    };
    HttpError::from_error(source, status, err.to_string(), &err)
}

pub(super) fn admin_settings_error(source: &'static str, err: AdminSettingsError) -> HttpError {
    match err {
        AdminSettingsError::Validation(errors) => HttpError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            errors.to_string(),
            &errors,
        ),
        AdminSettingsError::Repo(repo) => repo_error_to_http(source, repo),
    }
}

pub(super) fn admin_lead_error(source: &'static str, err: AdminLeadError) -> HttpError {
    let status = match err {
        AdminLeadError::MissingField | AdminLeadError::InvalidStatus => StatusCode::BAD_REQUEST,
        AdminLeadError::NotFound => StatusCode::NOT_FOUND,
        AdminLeadError::Repo(repo) => return repo_error_to_http(source, repo),
    };
    HttpError::new(source, status, err.to_string(), err.to_string())
}

pub(super) fn admin_media_error(source: &'static str, err: MediaError) -> HttpError {
    let status = match err {
        MediaError::Repo(repo) => return repo_error_to_http(source, repo),
        MediaError::NoFile | MediaError::MissingId => StatusCode::BAD_REQUEST,
        MediaError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        MediaError::NotFound => StatusCode::NOT_FOUND,
        MediaError::Storage(StorageError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
        MediaError::Storage(_) => StatusCode::BAD_GATEWAY,
    };
    HttpError::new(source, status, err.to_string(), err.to_string())
}

pub(super) fn admin_user_error(source: &'static str, err: UserAdminError) -> HttpError {
    let status = match err {
        UserAdminError::Repo(repo) => return repo_error_to_http(source, repo),
        UserAdminError::Auth(auth) => return auth_error(source, auth),
        UserAdminError::Validation(_)
        | UserAdminError::MissingId
        | UserAdminError::SelfDelete
        | UserAdminError::WrongPassword => StatusCode::BAD_REQUEST,
        UserAdminError::EmailTaken => StatusCode::CONFLICT,
        UserAdminError::NotFound => StatusCode::NOT_FOUND,
    };
    HttpError::new(source, status, err.to_string(), err.to_string())
}

pub(super) fn auth_error(source: &'static str, err: AuthError) -> HttpError {
    let status = match err {
        AuthError::Repo(repo) => return repo_error_to_http(source, repo),
        AuthError::Signing(_) | AuthError::Hashing(_) => return internal(source, &err),
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::InvalidToken(_) | AuthError::UnknownUser(_) => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
    };
    HttpError::from_error(source, status, err.to_string(), &err)
}

fn internal(source: &'static str, err: &dyn std::error::Error) -> HttpError {
    HttpError::from_error(
        source,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong. Please try again.",
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::validation::FieldErrors;
    use crate::domain::types::EntityKind;

    #[test]
    fn content_errors_keep_their_message() {
        let err = admin_content_error("test", AdminContentError::Conflict(EntityKind::Service));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = admin_content_error(
            "test",
            AdminContentError::Validation(FieldErrors::single("title", "Title is required.")),
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_storage_config_is_unavailable() {
        let err = admin_media_error(
            "test",
            MediaError::Storage(StorageError::NotConfigured(vec!["JDIGITAL__STORAGE__BUCKET"])),
        );
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
