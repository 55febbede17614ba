use axum::{
    Form, Json,
    extract::{Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::application::{
    admin::{ActionResult, AdminLeadService},
    error::HttpError,
    validation::FormData,
};

use super::{AdminState, errors::admin_lead_error};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LeadListQuery {
    q: Option<String>,
    status: Option<String>,
    page: Option<u32>,
}

pub(super) async fn admin_leads(
    State(state): State<AdminState>,
    Query(query): Query<LeadListQuery>,
) -> Response {
    let filter = AdminLeadService::filter(query.q.as_deref(), query.status.as_deref());
    match state.leads.list(&filter, query.page).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => admin_lead_error("infra::http::admin::leads::list", err).into_response(),
    }
}

pub(super) async fn admin_lead_status(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.leads.update_status(&form).await {
        Ok(message) => Json(ActionResult::success(message)).into_response(),
        Err(err) => admin_lead_error("infra::http::admin::leads::status", err).into_response(),
    }
}

pub(super) async fn admin_leads_export(State(state): State<AdminState>) -> Response {
    const SOURCE: &str = "infra::http::admin::leads::export";

    let export = match state.leads.export(OffsetDateTime::now_utc()).await {
        Ok(export) => export,
        Err(err) => return admin_lead_error(SOURCE, err).into_response(),
    };

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    let Ok(disposition) = HeaderValue::from_str(&disposition) else {
        return HttpError::new(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to export leads.",
            format!("invalid export filename `{}`", export.filename),
        )
        .into_response();
    };

    let mut response = (StatusCode::OK, export.body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(CONTENT_DISPOSITION, disposition);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
