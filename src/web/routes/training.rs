use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{CapacitacionLink, TrainingModule},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::training::{ModuleMenuEntry, TrainingHome, training_path},
        error::ErrorResponse,
        middlewares::{self, session},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(training_home_handler))
        .route("/modules", get(training_list_handler))
        .route("/modules/{slug}", get(training_detail_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Share-link entry point, outside of the API prefix.
pub fn public_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/c/{slug}/", get(public_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub(crate) async fn active_module(state: &AppState, slug: &str) -> WebResult<TrainingModule> {
    TrainingModule::find_active_by_slug(state.pool(), slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(TrainingModule::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/training/",
    description = "The training to show first: the most recently updated active module",
    responses(
        (status = 200, description = "Current training, `module` is null when none is active", body = TrainingHome),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
    ),
    tag = "training",
    security(
        ("cookie" = [])
    )
)]
async fn training_home_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let module = TrainingModule::latest_active(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(TrainingHome { module })))
}

#[utoipa::path(
    get,
    path = "/api/v1/training/modules",
    description = "Active training modules in menu order",
    responses(
        (status = 200, description = "Active modules", body = Vec<ModuleMenuEntry>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
    ),
    tag = "training",
    security(
        ("cookie" = [])
    )
)]
async fn training_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let modules = TrainingModule::list_active(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?;

    let entries: Vec<ModuleMenuEntry> = modules.iter().map(ModuleMenuEntry::from).collect();
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/training/modules/{slug}",
    description = "Content of an active training module",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Module", body = TrainingModule),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "training",
    security(
        ("cookie" = [])
    )
)]
async fn training_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let module = active_module(&state, &slug).await?;
    Ok((StatusCode::OK, Json(module)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LinkQuery {
    /// Id of the link that was shared
    #[serde(rename = "ref")]
    reference: Option<String>,
}

#[utoipa::path(
    get,
    path = "/c/{slug}/",
    description = "Public entry of a shared training link. Remembers the module and redirects \
        trainees to the training and everybody else to the trainee access page",
    params(
        ("slug" = String, Path, description = "Module slug"),
        LinkQuery,
    ),
    responses(
        (status = 303, description = "Redirect to the training or to the access page"),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "training"
)]
async fn public_link_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
    Path(slug): Path<String>,
    Query(query): Query<LinkQuery>,
) -> WebResult<impl IntoResponse> {
    let module = active_module(&state, &slug).await?;

    let link_id = query
        .reference
        .as_deref()
        .and_then(|r| r.trim().parse::<Uuid>().ok());

    let mut counted = None;
    if let Some(link_id) = link_id {
        let registered = CapacitacionLink::register_access(state.pool(), link_id, module.id())
            .await
            .map_err(|e| {
                WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e)
            })?;
        if registered {
            counted = Some(link_id);
        }
    }

    session::remember_target(&cookies, module.slug(), counted);

    let is_trainee = ctx.maybe_user().is_some_and(|u| u.is_trainee());
    let target = if is_trainee {
        training_path(None)
    } else {
        String::from("/acceso/")
    };
    Ok(Redirect::to(&target))
}
