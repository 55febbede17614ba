use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::application::{
    admin::{ActionResult, settings::SETTINGS_UPDATED},
    validation::FormData,
};

use super::{AdminState, errors::admin_settings_error};

pub(super) async fn admin_settings(State(state): State<AdminState>) -> Response {
    match state.settings.load().await {
        Ok(settings) => Json(settings).into_response(),
        Err(err) => admin_settings_error("infra::http::admin::settings::load", err).into_response(),
    }
}

pub(super) async fn admin_settings_save(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.settings.update(&form).await {
        Ok(_) => Json(ActionResult::success(SETTINGS_UPDATED)).into_response(),
        Err(err) => admin_settings_error("infra::http::admin::settings::save", err).into_response(),
    }
}
