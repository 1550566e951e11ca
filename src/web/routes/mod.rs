use crate::{
    model::{DatabaseError, ResourceTyped},
    web::{AppState, WebError, doc::ApiDoc},
};
use axum::Router;
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod accounts;
pub mod admin;
pub mod certificates;
pub mod dashboard;
pub mod landing;
pub mod presencial;
pub mod quiz;
pub mod training;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

/// Maps an ownership check failure to 404, so other users' ids stay hidden.
pub(crate) fn access_error<T: ResourceTyped>(e: DatabaseError) -> WebError {
    match e {
        DatabaseError::Forbidden => WebError::resource_not_found(T::get_resource_type()),
        e => WebError::resource_fetch_error(T::get_resource_type(), e),
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState) -> Router<S> {
    let config = state.config();

    let mut router = Router::new()
        .merge(landing::routes(state.clone()))
        .merge(training::public_routes(state.clone()))
        .nest("/api/v1/account/", accounts::account_routes(state.clone()))
        .nest("/api/v1/trainee/", accounts::trainee_routes(state.clone()))
        .nest("/api/v1/professional/", accounts::professional_routes(state.clone()))
        .nest("/api/v1/training/", training::routes(state.clone()))
        .nest("/api/v1/quiz/", quiz::routes(state.clone()))
        .nest("/api/v1/certificates/", certificates::routes(state.clone()))
        .nest("/api/v1/dashboard/presencial/", presencial::routes(state.clone()))
        .nest("/api/v1/dashboard/", dashboard::routes(state.clone()))
        .nest("/api/v1/admin/", admin::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
