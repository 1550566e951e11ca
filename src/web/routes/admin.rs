use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    model::{
        CrudRepository, DatabaseError, PaginatableRepository, ResourceTyped,
        entity::{Certificate, CertificateRow, QuizState, TrainingModule, UserEntity},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::admin::{AdminModuleBody, StaffBody},
        error::ErrorResponse,
        middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/users", get(admin_users_handler))
        .route("/users/{id}/staff", put(admin_user_staff_handler))
        .route(
            "/users/{id}/quiz/{slug}/reset",
            post(admin_quiz_reset_handler),
        )
        .route("/modules", get(admin_modules_handler).post(admin_module_create_handler))
        .route(
            "/modules/{id}",
            put(admin_module_update_handler).delete(admin_module_delete_handler),
        )
        .route("/certificates", get(admin_certificates_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn module_write_error(e: DatabaseError) -> WebError {
    if e.is_unique_violation() {
        WebError::validation("slug", "Ya existe un módulo con ese slug.")
    } else {
        WebError::resource_fetch_error(TrainingModule::get_resource_type(), e)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Users, newest first", body = crate::model::Page<UserEntity>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_users_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let page = UserEntity::page(state.pool(), user, query.limit(), query.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/staff",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = StaffBody,
    responses(
        (status = 200, description = "User updated", body = UserEntity),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_user_staff_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StaffBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let target = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let updated = target
        .set_staff(state.pool(), payload.is_staff)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    tracing::info!("user {} staff flag set to {}", updated.id(), payload.is_staff);

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/quiz/{slug}/reset",
    description = "Clears attempts, lockout and retake window of a user for a module",
    params(
        ("id" = Uuid, Path, description = "User id"),
        ("slug" = String, Path, description = "Module slug"),
    ),
    responses(
        (status = 204, description = "Quiz state cleared"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Module or quiz state not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_quiz_reset_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((id, slug)): Path<(Uuid, String)>,
) -> WebResult<impl IntoResponse> {
    ctx.staff()?;
    let module = TrainingModule::find_by_slug(state.pool(), &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(TrainingModule::get_resource_type()))?;

    let deleted = QuizState::delete(state.pool(), id, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizState::get_resource_type(), e))?;
    if !deleted {
        return Err(WebError::resource_not_found(QuizState::get_resource_type()));
    }
    tracing::info!("quiz state of {id} for {slug} reset");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/modules",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Every module in menu order", body = crate::model::Page<TrainingModule>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_modules_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let page = TrainingModule::page(state.pool(), user, query.limit(), query.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/modules",
    request_body = AdminModuleBody,
    responses(
        (status = 201, description = "Module created", body = TrainingModule),
        (status = 400, description = "Invalid fields or slug taken", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_module_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<AdminModuleBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    payload.validate()?;

    let created = TrainingModule::create(state.pool(), user, payload.into())
        .await
        .map_err(module_write_error)?;
    tracing::info!("module {} created", created.slug());

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module id")),
    request_body = AdminModuleBody,
    responses(
        (status = 200, description = "Module updated", body = TrainingModule),
        (status = 400, description = "Invalid fields or slug taken", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_module_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminModuleBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    payload.validate()?;

    let module = TrainingModule::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(TrainingModule::get_resource_type()))?;
    let updated = module
        .update(state.pool(), user, payload.into())
        .await
        .map_err(module_write_error)?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/modules/{id}",
    description = "Deletes a module with its questions, attempts, links and certificates",
    params(("id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 204, description = "Module deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_module_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let module = TrainingModule::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(TrainingModule::get_resource_type()))?;

    let slug = module.slug().to_string();
    module
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(TrainingModule::get_resource_type(), e))?;
    tracing::info!("module {slug} deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/certificates",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Every certificate, newest first", body = Vec<CertificateRow>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("cookie" = [])
    )
)]
async fn admin_certificates_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    ctx.staff()?;
    let rows = Certificate::list_rows(state.pool(), None, query.limit(), query.offset())
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}
