mod auth;
mod content;
mod errors;
mod leads;
mod media;
mod settings;
mod state;
mod users;

pub use auth::AdminSession;
pub use state::AdminState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::domain::entities::{
    FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord,
    ProjectCategoryRecord, ServiceRecord, TestimonialRecord,
};

use super::middleware::{log_responses, set_request_context};
use content::{AdminCollection, admin_content_delete, admin_content_list, admin_content_save};

pub fn build_admin_router(state: AdminState, upload_body_limit: usize) -> Router {
    let protected = Router::new()
        .route("/admin/session", get(auth::admin_session))
        .merge(collection_routes::<ServiceRecord>("services"))
        .merge(collection_routes::<PortfolioProjectRecord>("portfolio"))
        .merge(collection_routes::<ProjectCategoryRecord>("categories"))
        .merge(collection_routes::<ProcessStepRecord>("process"))
        .merge(collection_routes::<PricingPackageRecord>("pricing"))
        .merge(collection_routes::<FaqRecord>("faqs"))
        .merge(collection_routes::<TestimonialRecord>("testimonials"))
        .route("/admin/settings", get(settings::admin_settings))
        .route("/admin/settings/save", post(settings::admin_settings_save))
        .route("/admin/leads", get(leads::admin_leads))
        .route("/admin/leads/status", post(leads::admin_lead_status))
        .route("/admin/leads/export", get(leads::admin_leads_export))
        .route("/admin/media", get(media::admin_media))
        .route(
            "/admin/media/upload",
            post(media::admin_media_upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/admin/media/delete", post(media::admin_media_delete))
        .route("/admin/users", get(users::admin_users))
        .route("/admin/users/create", post(users::admin_user_create))
        .route("/admin/users/delete", post(users::admin_user_delete))
        .route("/admin/users/password", post(users::admin_user_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route(auth::LOGIN_PATH, post(auth::admin_login))
        .route("/admin/logout", post(auth::admin_logout))
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn collection_routes<R: AdminCollection>(segment: &str) -> Router<AdminState> {
    Router::new()
        .route(&format!("/admin/{segment}"), get(admin_content_list::<R>))
        .route(
            &format!("/admin/{segment}/save"),
            post(admin_content_save::<R>),
        )
        .route(
            &format!("/admin/{segment}/delete"),
            post(admin_content_delete::<R>),
        )
}
