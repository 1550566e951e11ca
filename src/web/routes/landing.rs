use axum::{
    Router,
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};

use crate::web::{AppState, RequestContext, UserType, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(landing_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .route("/health/", get(health_handler))
        .with_state(state)
}

fn landing_path(user_type: Option<UserType>) -> &'static str {
    match user_type {
        Some(UserType::Professional) => "/dashboard/",
        Some(UserType::Trainee) => "/capacitacion/",
        None => "/acceso/",
    }
}

#[utoipa::path(
    get,
    path = "/",
    description = "Sends every visitor to their home page",
    responses(
        (status = 303, description = "Redirect to the dashboard, the training or the access page"),
    ),
    tag = "landing"
)]
async fn landing_handler(ctx: RequestContext) -> impl IntoResponse {
    Redirect::to(landing_path(ctx.maybe_user().map(|u| u.user_type())))
}

#[utoipa::path(
    get,
    path = "/health/",
    responses(
        (status = 200, description = "Service is up", body = String),
    ),
    tag = "landing"
)]
async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn landing_paths() {
        assert_eq!(landing_path(Some(UserType::Professional)), "/dashboard/");
        assert_eq!(landing_path(Some(UserType::Trainee)), "/capacitacion/");
        assert_eq!(landing_path(None), "/acceso/");
    }
}
