use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::Cookies;

use crate::{
    auth::{hash_password, normalize_cuil, normalize_email, verify_password},
    model::{
        CrudRepository, DatabaseError, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserType, WebError, WebResult,
        dto::{
            accounts::{
                LoginResponse, PendingRegistration, ProfessionalLoginBody,
                ProfessionalRegisterBody, TraineeLoginBody, TraineeRegisterBody, safe_next,
            },
            training::training_path,
        },
        error::ErrorResponse,
        middlewares::{self, session},
    },
};

/// Hash verified against when the login is unknown, so both paths cost the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$2C6Jx0b5Vh8KpFqTJ3p6Ww2G7mGzvV0b7zq6a3xJ1Ek";

pub fn account_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/me", get(account_me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub fn trainee_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/register", post(trainee_register_handler))
        .route(
            "/confirm",
            get(trainee_pending_handler).post(trainee_confirm_handler),
        )
        .route("/login", post(trainee_login_handler))
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub fn professional_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/register", post(professional_register_handler))
        .route("/login", post(professional_login_handler))
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Where a user lands after logging in.
pub(crate) fn home_path(user_type: UserType, target_module: Option<&str>) -> String {
    match user_type {
        UserType::Professional => String::from("/dashboard/"),
        UserType::Trainee => training_path(target_module),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/account/me",
    description = "Returns the logged in user",
    responses(
        (status = 200, description = "Current user", body = UserEntity),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

/// 409 on the field whose unique index was hit, for inserts that lost a race
/// against another registration.
fn user_write_error(e: DatabaseError) -> WebError {
    match e.unique_constraint() {
        Some("users_cuil_idx") => WebError::registration_conflict("cuil"),
        Some("users_username_lower_idx") => WebError::registration_conflict("username"),
        Some(_) => WebError::registration_conflict("email"),
        None => WebError::resource_fetch_error(UserEntity::get_resource_type(), e),
    }
}

async fn ensure_trainee_free(state: &AppState, pending: &PendingRegistration) -> WebResult<()> {
    let cuil_taken = UserEntity::cuil_taken(state.pool(), &pending.cuil)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if cuil_taken {
        return Err(WebError::registration_conflict("cuil"));
    }

    let email_taken = UserEntity::email_taken(state.pool(), &pending.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if email_taken {
        return Err(WebError::registration_conflict("email"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/trainee/register",
    request_body = TraineeRegisterBody,
    description = "Validates a trainee registration and keeps it pending confirmation",
    responses(
        (status = 200, description = "Registration is waiting for confirmation", body = PendingRegistration),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "CUIL or e-mail already registered", body = ErrorResponse),
    ),
    tag = "trainee"
)]
async fn trainee_register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<TraineeRegisterBody>,
) -> WebResult<impl IntoResponse> {
    let pending = payload.into_pending()?;
    ensure_trainee_free(&state, &pending).await?;

    session::set_pending(&cookies, &pending, state.config().app().jwt())?;
    Ok((StatusCode::OK, Json(pending)))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/confirm",
    description = "Returns the registration waiting for confirmation",
    responses(
        (status = 200, description = "Pending registration", body = PendingRegistration),
        (status = 404, description = "Nothing to confirm", body = ErrorResponse),
    ),
    tag = "trainee"
)]
async fn trainee_pending_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let pending: PendingRegistration = session::pending(&cookies, state.config().app().jwt())
        .ok_or(WebError::resource_not_found(
            crate::model::ResourceType::PendingRegistration,
        ))?;

    Ok((StatusCode::OK, Json(pending)))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainee/confirm",
    description = "Creates the pending trainee and logs them in",
    responses(
        (status = 201, description = "Trainee created", body = LoginResponse),
        (status = 404, description = "Nothing to confirm", body = ErrorResponse),
        (status = 409, description = "CUIL or e-mail registered in the meantime", body = ErrorResponse),
    ),
    tag = "trainee"
)]
async fn trainee_confirm_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let jwt = state.config().app().jwt();
    let pending: PendingRegistration = session::pending(&cookies, jwt).ok_or(
        WebError::resource_not_found(crate::model::ResourceType::PendingRegistration),
    )?;

    ensure_trainee_free(&state, &pending).await?;

    let admin = AuthenticatedUser::admin();
    let created = UserEntity::create(state.pool(), &admin, UserEntityCreateUpdate::from(pending))
        .await
        .map_err(user_write_error)?;

    session::clear_pending(&cookies);
    session::start_session(&cookies, created.id(), jwt)?;
    tracing::info!("trainee {} registered", created.id());

    let target = session::target_module(&cookies);
    let redirect = home_path(UserType::Trainee, target.as_deref());
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            user: created,
            redirect,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainee/login",
    request_body = TraineeLoginBody,
    description = "Logs a trainee in with CUIL and e-mail",
    responses(
        (status = 200, description = "Trainee logged in", body = LoginResponse),
        (status = 401, description = "No active trainee with that CUIL and e-mail", body = ErrorResponse),
    ),
    tag = "trainee"
)]
async fn trainee_login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<TraineeLoginBody>,
) -> WebResult<impl IntoResponse> {
    let cuil = normalize_cuil(&payload.cuil).ok_or(WebError::auth_invalid_credentials())?;
    let email = normalize_email(&payload.email);

    let found = UserEntity::find_trainee(state.pool(), &cuil, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .filter(UserEntity::is_active)
        .ok_or(WebError::auth_invalid_credentials())?;

    session::start_session(&cookies, found.id(), state.config().app().jwt())?;

    let target = session::target_module(&cookies);
    let redirect = home_path(UserType::Trainee, target.as_deref());
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            user: found,
            redirect,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/professional/register",
    request_body = ProfessionalRegisterBody,
    description = "Creates a professional account and logs it in",
    responses(
        (status = 201, description = "Professional created", body = LoginResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "E-mail or username already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "professional"
)]
async fn professional_register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<ProfessionalRegisterBody>,
) -> WebResult<impl IntoResponse> {
    let payload = payload.normalized()?;

    let email_taken = UserEntity::email_taken(state.pool(), &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if email_taken {
        return Err(WebError::registration_conflict("email"));
    }

    let username_taken = UserEntity::username_taken(state.pool(), &payload.username)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
    if username_taken {
        return Err(WebError::registration_conflict("username"));
    }

    let hash = hash_password(&payload.password1).map_err(WebError::server_crypt_error)?;
    let created = UserEntity::create(
        state.pool(),
        &AuthenticatedUser::admin(),
        payload.into_create(hash),
    )
    .await
    .map_err(user_write_error)?;

    session::start_session(&cookies, created.id(), state.config().app().jwt())?;
    tracing::info!("professional {} registered", created.id());

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            user: created,
            redirect: home_path(UserType::Professional, None),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/professional/login",
    description = "Logs a professional in with username or e-mail",
    request_body = ProfessionalLoginBody,
    responses(
        (status = 200, description = "Professional logged in", body = LoginResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "professional",
)]
async fn professional_login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<ProfessionalLoginBody>,
) -> WebResult<impl IntoResponse> {
    let found = UserEntity::find_professional_by_login(state.pool(), &payload.login)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let is_verified = match found.as_ref().and_then(UserEntity::hash) {
        Some(hash) => {
            verify_password(hash, &payload.password).map_err(WebError::server_crypt_error)?
        }
        None => {
            let _ = verify_password(DUMMY_HASH, &payload.password);
            false
        }
    };

    let found = match found {
        Some(found) if is_verified && found.is_active() => found,
        _ => return Err(WebError::auth_invalid_credentials()),
    };

    session::start_session(&cookies, found.id(), state.config().app().jwt())?;

    let redirect = safe_next(payload.next.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| home_path(UserType::Professional, None));
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            user: found,
            redirect,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/professional/logout",
    description = "Clears the session cookie",
    responses(
        (status = 204, description = "Logged out"),
    ),
    tag = "professional"
)]
async fn logout_handler(cookies: Cookies) -> WebResult<impl IntoResponse> {
    session::end_session(&cookies);
    session::clear_target(&cookies);
    Ok(StatusCode::NO_CONTENT)
}
