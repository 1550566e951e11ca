use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{Certificate, UserEntity},
    },
    utils::media,
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::certificates::CertificateItem,
        error::ErrorResponse,
        middlewares,
    },
};

use super::access_error;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(certificates_list_handler))
        .route("/{id}/download", get(certificate_download_handler))
        .route("/{id}/view", get(certificate_view_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/",
    description = "Certificates of the logged in user, newest first",
    responses(
        (status = 200, description = "Own certificates", body = Vec<CertificateItem>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("cookie" = [])
    )
)]
async fn certificates_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let rows = Certificate::list_rows(state.pool(), Some(user.user_id()), 200, 0)
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    let now = Utc::now();
    let items: Vec<CertificateItem> = rows
        .into_iter()
        .map(|row| CertificateItem::new(row, now))
        .collect();
    Ok((StatusCode::OK, Json(items)))
}

/// Loads the PDF of a certificate the user may see, with its download name.
async fn certificate_file(
    ctx: &RequestContext,
    state: &AppState,
    id: Uuid,
) -> WebResult<(String, Vec<u8>)> {
    let user = ctx.user()?;

    let certificate = Certificate::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Certificate::get_resource_type()))?;
    check_access(state.pool(), user, &certificate, user.user_id())
        .await
        .map_err(access_error::<Certificate>)?;

    let relative = certificate
        .pdf_path()
        .ok_or(WebError::resource_not_found(Certificate::get_resource_type()))?;
    let bytes = media::read_media(state.config().media().root(), relative)
        .await
        .map_err(WebError::server_io_error)?
        .ok_or(WebError::resource_not_found(Certificate::get_resource_type()))?;

    let holder = UserEntity::find_by_id(state.pool(), user, certificate.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    let holder_name = holder.map(|h| h.display_name()).unwrap_or_default();

    Ok((media::certificate_filename(&holder_name), bytes))
}

pub(crate) fn pdf_response(filename: &str, disposition: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, String::from("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                format!("{disposition}; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/{id}/download",
    description = "Certificate PDF as an attachment",
    params(("id" = Uuid, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Certificate or its file not found", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("cookie" = [])
    )
)]
async fn certificate_download_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let (filename, bytes) = certificate_file(&ctx, &state, id).await?;
    Ok(pdf_response(&filename, "attachment", bytes))
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/{id}/view",
    description = "Certificate PDF shown inline",
    params(("id" = Uuid, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Certificate or its file not found", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("cookie" = [])
    )
)]
async fn certificate_view_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let (filename, bytes) = certificate_file(&ctx, &state, id).await?;
    Ok(pdf_response(&filename, "inline", bytes))
}
