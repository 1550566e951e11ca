//! Request context, e.g. user id, its type, staff flag.
//!

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_type: UserType,
    is_staff: bool,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_type: UserType, is_staff: bool) -> Self {
        Self {
            user_id,
            user_type,
            is_staff,
        }
    }

    /// System actor used by background work and the CLI.
    pub fn admin() -> Self {
        Self {
            user_type: UserType::Professional,
            user_id: uuid::Uuid::max(), // admin ID
            is_staff: true,
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_professional(&self) -> bool {
        self.user_type == UserType::Professional
    }

    pub fn is_trainee(&self) -> bool {
        self.user_type == UserType::Trainee
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Professional,
    Trainee,
}

impl From<&str> for UserType {
    fn from(value: &str) -> Self {
        match value {
            "trainee" => Self::Trainee,
            _ => Self::Professional,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Professional => write!(f, "professional"),
            Self::Trainee => write!(f, "trainee"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    pub fn professional(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if !user.is_professional() {
            return Err(WebError::auth_wrong_user_type(UserType::Professional));
        }
        Ok(user)
    }

    pub fn trainee(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if !user.is_trainee() {
            return Err(WebError::auth_wrong_user_type(UserType::Trainee));
        }
        Ok(user)
    }

    pub fn staff(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if !user.is_staff() {
            return Err(WebError::auth_staff_required());
        }
        Ok(user)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn guards_check_user_type() {
        let trainee = RequestContext::new(Some(AuthenticatedUser::new(
            uuid::Uuid::new_v4(),
            UserType::Trainee,
            false,
        )));
        assert!(trainee.trainee().is_ok());
        assert_eq!(
            trainee.professional().unwrap_err().status_code(),
            axum::http::StatusCode::FORBIDDEN
        );
        assert!(trainee.staff().is_err());
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let anon = RequestContext::new(None);
        assert_eq!(
            anon.professional().unwrap_err().status_code(),
            axum::http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn user_type_roundtrip() {
        assert_eq!(UserType::from("trainee"), UserType::Trainee);
        assert_eq!(UserType::from(UserType::Professional.to_string().as_str()), UserType::Professional);
    }
}
