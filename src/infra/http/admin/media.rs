use axum::{
    Extension, Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::application::{
    admin::{ActionResult, UploadRequest, media::UPLOADED},
    error::HttpError,
    pagination::PageRequest,
    validation::FormData,
};

use super::{AdminSession, AdminState, errors::admin_media_error};

const MEDIA_PAGE_SIZE: u32 = 24;
const SOURCE: &str = "infra::http::admin::media";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct MediaListQuery {
    page: Option<u32>,
}

pub(super) async fn admin_media(
    State(state): State<AdminState>,
    Query(query): Query<MediaListQuery>,
) -> Response {
    let page = PageRequest::new(query.page, MEDIA_PAGE_SIZE);
    match state.media.list(page).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => admin_media_error(SOURCE, err).into_response(),
    }
}

pub(super) async fn admin_media_upload(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    mut multipart: Multipart,
) -> Response {
    let file = match read_file_field(&mut multipart).await {
        Ok(file) => file,
        Err(err) => return err.into_response(),
    };

    let (file_name, content_type, body) = file.unwrap_or_default();
    let request = UploadRequest {
        file_name,
        content_type,
        body,
        uploaded_by: Some(session.user_id),
    };

    match state.media.upload(request, OffsetDateTime::now_utc()).await {
        Ok(record) => {
            Json(ActionResult::success(UPLOADED).with_url(record.public_url)).into_response()
        }
        Err(err) => admin_media_error(SOURCE, err).into_response(),
    }
}

pub(super) async fn admin_media_delete(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.media.delete(&form).await {
        Ok(message) => Json(ActionResult::success(message)).into_response(),
        Err(err) => admin_media_error(SOURCE, err).into_response(),
    }
}

/// Reads the `file` part. Other parts are skipped.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Option<String>, Bytes)>, HttpError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(err) => {
                let status = err.status();
                warn!(
                    target = "jdigital::http::admin::media",
                    status = status.as_u16(),
                    error = %err,
                    "failed to read multipart upload"
                );
                return Err(multipart_error(status, err.body_text()));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .or_else(|| {
                mime_guess::from_path(&file_name)
                    .first()
                    .map(|mime| mime.to_string())
            });
        let body = field
            .bytes()
            .await
            .map_err(|err| multipart_error(err.status(), err.body_text()))?;
        return Ok(Some((file_name, content_type, body)));
    }
}

fn multipart_error(status: StatusCode, detail: String) -> HttpError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => {
            HttpError::new(SOURCE, status, "File exceeds the upload limit.", detail)
        }
        _ => HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Upload could not be read.",
            detail,
        ),
    }
}
