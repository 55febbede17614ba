use axum::{
    Extension, Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::application::{
    admin::{ActionResult, users::USER_CREATED},
    validation::FormData,
};

use super::{AdminSession, AdminState, errors::admin_user_error};

pub(super) async fn admin_users(State(state): State<AdminState>) -> Response {
    match state.users.list().await {
        Ok(users) => Json(users).into_response(),
        Err(err) => admin_user_error("infra::http::admin::users::list", err).into_response(),
    }
}

pub(super) async fn admin_user_create(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.users.create(&form).await {
        Ok(_) => Json(ActionResult::success(USER_CREATED)).into_response(),
        Err(err) => admin_user_error("infra::http::admin::users::create", err).into_response(),
    }
}

pub(super) async fn admin_user_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.users.delete(session.user_id, &form).await {
        Ok(message) => Json(ActionResult::success(message)).into_response(),
        Err(err) => admin_user_error("infra::http::admin::users::delete", err).into_response(),
    }
}

pub(super) async fn admin_user_password(
    State(state): State<AdminState>,
    Extension(session): Extension<AdminSession>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match state.users.change_password(session.user_id, &form).await {
        Ok(message) => Json(ActionResult::success(message)).into_response(),
        Err(err) => admin_user_error("infra::http::admin::users::password", err).into_response(),
    }
}
