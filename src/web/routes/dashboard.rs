use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    mail::messages,
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{
            CapacitacionLink, CapacitacionLinkCreate, PresencialSession, TrainingModule,
            UserEntity,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            dashboard::{
                DashboardHome, LinkCreateBody, LinkView, ModalitySelector, ShareBody,
                ShareResponse,
            },
            training::{ModuleMenuEntry, public_link_path},
        },
        error::ErrorResponse,
        middlewares,
    },
};

use super::{access_error, training::active_module};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(dashboard_home_handler))
        .route("/profile", get(dashboard_profile_handler))
        .route("/capacitaciones", get(capacitaciones_menu_handler))
        .route("/capacitaciones/{slug}", get(modality_selector_handler))
        .route(
            "/capacitaciones/{slug}/links",
            get(links_list_handler).post(link_create_handler),
        )
        .route("/links/{id}/share", post(link_share_handler))
        .route("/links/{id}/deactivate", post(link_deactivate_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn owned_link(
    state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
) -> WebResult<CapacitacionLink> {
    let link = CapacitacionLink::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(CapacitacionLink::get_resource_type()))?;
    check_access(state.pool(), user, &link, user.user_id())
        .await
        .map_err(access_error::<CapacitacionLink>)?;
    Ok(link)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/",
    description = "Professional dashboard: profile and activity counters",
    responses(
        (status = 200, description = "Dashboard", body = DashboardHome),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn dashboard_home_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;

    let profile = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;
    let links = CapacitacionLink::count(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e))?;
    let presencial_sessions = PresencialSession::count(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(PresencialSession::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(DashboardHome {
            profile,
            links,
            presencial_sessions,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/profile",
    responses(
        (status = 200, description = "Professional profile", body = UserEntity),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn dashboard_profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let profile = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/capacitaciones",
    description = "Every training module in menu order, inactive ones included",
    responses(
        (status = 200, description = "Menu", body = Vec<ModuleMenuEntry>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn capacitaciones_menu_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    ctx.professional()?;
    let modules = TrainingModule::list_menu(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?;

    let entries: Vec<ModuleMenuEntry> = modules.iter().map(ModuleMenuEntry::from).collect();
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/capacitaciones/{slug}",
    description = "Choice between running the training in person or sharing it online",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Modalities", body = ModalitySelector),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn modality_selector_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.professional()?;
    let module = active_module(&state, &slug).await?;
    Ok((StatusCode::OK, Json(ModalitySelector::new(module))))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/capacitaciones/{slug}/links",
    description = "Own share links for a module, newest first",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Links", body = Vec<LinkView>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn links_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let module = active_module(&state, &slug).await?;

    let links = CapacitacionLink::list_for_module(state.pool(), user, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e))?;

    let now = Utc::now();
    let views: Vec<LinkView> = links
        .into_iter()
        .map(|link| LinkView::new(link, module.slug(), now))
        .collect();
    Ok((StatusCode::OK, Json(views)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/capacitaciones/{slug}/links",
    description = "Generates a new share link for a module",
    params(("slug" = String, Path, description = "Module slug")),
    request_body = LinkCreateBody,
    responses(
        (status = 201, description = "Link created", body = LinkView),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals have a dashboard", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn link_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<LinkCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    payload.validate()?;
    let module = active_module(&state, &slug).await?;

    let now = Utc::now();
    let data = CapacitacionLinkCreate {
        module_id: module.id(),
        label: payload.label,
        expires_at: payload.expires_in_days.map(|days| now + Duration::days(days)),
    };
    let link = CapacitacionLink::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e))?;
    tracing::info!("link {} created for {}", link.id(), module.slug());

    Ok((StatusCode::CREATED, Json(LinkView::new(link, module.slug(), now))))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/links/{id}/share",
    description = "Sends the public URL of a link by e-mail",
    params(("id" = Uuid, Path, description = "Link id")),
    request_body = ShareBody,
    responses(
        (status = 200, description = "Link sent", body = ShareResponse),
        (status = 400, description = "No valid recipients", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Link not found", body = ErrorResponse),
        (status = 502, description = "Mail could not be delivered", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn link_share_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShareBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let recipients = payload.recipients()?;
    let link = owned_link(&state, user, id).await?;

    let module = TrainingModule::find_by_id(state.pool(), user, link.module_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(TrainingModule::get_resource_type()))?;
    let professional = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let public_url = format!(
        "{}{}",
        state.config().app().site_url(),
        public_link_path(module.slug(), link.id())
    );
    let message = messages::share_link(
        recipients.clone(),
        &professional.display_name(),
        module.title(),
        &public_url,
        payload.message.as_deref(),
    );
    state
        .mailer()
        .send(message)
        .await
        .map_err(WebError::server_mail_error)?;
    tracing::info!("link {} shared with {} recipients", link.id(), recipients.len());

    Ok((
        StatusCode::OK,
        Json(ShareResponse {
            sent_to: recipients,
            public_url,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/links/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Link id")),
    responses(
        (status = 200, description = "Link deactivated", body = CapacitacionLink),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Link not found", body = ErrorResponse),
    ),
    tag = "dashboard",
    security(
        ("cookie" = [])
    )
)]
async fn link_deactivate_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let link = owned_link(&state, user, id).await?;

    let link = link
        .deactivate(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(CapacitacionLink::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(link)))
}
