//! List, save and delete handlers shared by every content collection.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    application::{
        admin::{ActionResult, AdminContentService},
        content::ContentRecord,
        pagination::PageRequest,
        repos::ContentFilter,
        validation::FormData,
    },
    domain::entities::{
        FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord,
        ProjectCategoryRecord, ServiceRecord, TestimonialRecord,
    },
};

use super::{AdminState, errors::admin_content_error};

pub(super) const CONTENT_PAGE_SIZE: u32 = 20;

/// Picks the collection's service out of the admin state.
pub(super) trait AdminCollection: ContentRecord {
    fn service(state: &AdminState) -> &AdminContentService<Self>;
}

macro_rules! admin_collection {
    ($record:ty, $field:ident) => {
        impl AdminCollection for $record {
            fn service(state: &AdminState) -> &AdminContentService<Self> {
                &state.$field
            }
        }
    };
}

admin_collection!(ServiceRecord, services);
admin_collection!(PortfolioProjectRecord, portfolio);
admin_collection!(ProjectCategoryRecord, categories);
admin_collection!(ProcessStepRecord, process);
admin_collection!(PricingPackageRecord, pricing);
admin_collection!(FaqRecord, faqs);
admin_collection!(TestimonialRecord, testimonials);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ContentListQuery {
    pub(super) page: Option<u32>,
    pub(super) q: Option<String>,
}

pub(super) async fn admin_content_list<R: AdminCollection>(
    State(state): State<AdminState>,
    Query(query): Query<ContentListQuery>,
) -> Response {
    let filter = ContentFilter {
        search: query
            .q
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        visible_only: false,
    };
    let page = PageRequest::new(query.page, CONTENT_PAGE_SIZE);

    match R::service(&state).list(&filter, page).await {
        Ok(items) => Json(items).into_response(),
        Err(err) => admin_content_error("infra::http::admin::content::list", err).into_response(),
    }
}

pub(super) async fn admin_content_save<R: AdminCollection>(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match R::service(&state).save(&form).await {
        Ok(saved) => Json(ActionResult::success(saved.message)).into_response(),
        Err(err) => admin_content_error("infra::http::admin::content::save", err).into_response(),
    }
}

pub(super) async fn admin_content_delete<R: AdminCollection>(
    State(state): State<AdminState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let form = FormData::from(fields);
    match R::service(&state).delete(&form).await {
        Ok(message) => Json(ActionResult::success(message)).into_response(),
        Err(err) => {
            admin_content_error("infra::http::admin::content::delete", err).into_response()
        }
    }
}
