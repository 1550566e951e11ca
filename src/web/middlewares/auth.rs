use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    auth::{self, UserClaims},
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

use super::session::{self, AUTH_TOKEN};

/// Resolves the session cookie into a [`RequestContext`].
///
/// Expired or tampered tokens and deleted users fall back to an anonymous
/// context and drop the cookie. Inactive users are rejected.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let jwt = state.config().app().jwt();
    let id = match auth::process_token::<UserClaims, _>(token.value(), jwt) {
        Ok(data) => data.claims.sub.parse::<Uuid>().ok(),
        Err(e) => {
            tracing::debug!("dropping session cookie: {e}");
            None
        }
    };

    let user = match id {
        Some(id) => UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?,
        None => None,
    };

    match user {
        Some(user) if !user.is_active() => {
            session::end_session(&cookies);
            Err(WebError::auth_inactive_user())
        }
        Some(user) => {
            req.extensions_mut()
                .insert(RequestContext::new(Some(user.as_actor())));
            Ok(next.run(req).await)
        }
        None => {
            session::end_session(&cookies);
            req.extensions_mut().insert(RequestContext::new(None));
            Ok(next.run(req).await)
        }
    }
}
