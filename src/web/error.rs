use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType, entity::QuizState},
    web::UserType,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict: {field}")]
    RegistrationUserConflict { field: &'static str },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieNotFound, cookie: {cookie}")]
    AuthenticationCookieNotFound { cookie: String },

    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationWrongUserType, expected: {expected}")]
    AuthenticationWrongUserType { expected: UserType },

    #[error("AuthenticationStaffRequired")]
    AuthenticationStaffRequired,

    #[error("AuthenticationInactiveUser")]
    AuthenticationInactiveUser,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}, {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("ValidationFailed: {0:?}")]
    ValidationFailed(Vec<FieldError>),
}

/// Why a quiz cannot be started right now.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuizLock {
    pub locked: bool,
    pub lockout_until: Option<DateTime<Utc>>,
    pub retake_available_at: Option<DateTime<Utc>>,
    pub attempts_used: i32,
    pub last_passed: Option<bool>,
}

impl From<&QuizState> for QuizLock {
    fn from(state: &QuizState) -> Self {
        Self {
            locked: true,
            lockout_until: state.lockout_until(),
            retake_available_at: state.retake_available_at(),
            attempts_used: state.attempts_used(),
            last_passed: state.last_passed(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("QuizLocked: {0:?}")]
    QuizLocked(QuizLock),

    #[error("QuizQuestionOutOfRange: {order}")]
    QuizQuestionOutOfRange { order: i32 },

    #[error("QuizAttemptSubmitted")]
    QuizAttemptSubmitted,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),

    #[error("ServerDocumentError: {0}")]
    ServerDocumentError(#[from] crate::documents::DocumentError),

    #[error("ServerMailError: {0}")]
    ServerMailError(#[from] crate::mail::MailError),

    #[error("ServerIoError: {0}")]
    ServerIoError(#[from] std::io::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerMailError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerMailError(_) => String::from("Mail could not be delivered."),
            _ => String::from("Internal server error."),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict { field } => {
                format!("Registration error, {field} is already registered.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieInvalid { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationWrongUserType { .. } => StatusCode::FORBIDDEN,
            Self::AuthenticationStaffRequired => StatusCode::FORBIDDEN,
            Self::AuthenticationInactiveUser => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationCookieInvalid { .. } => {
                String::from("Authentication error, cookie invalid.")
            }
            Self::AuthenticationCookieNotFound { .. } => {
                String::from("Authentication error, cookie not found.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or credentials are invalid.")
            }
            Self::AuthenticationWrongUserType { expected } => {
                format!("This section is only available to {expected} users.")
            }
            Self::AuthenticationStaffRequired => String::from("Staff access required."),
            Self::AuthenticationInactiveUser => String::from("This account is inactive."),
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { reason, .. } => format!("Resource error, {reason}."),
        }
    }
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn client_display(&self) -> String {
        String::from("Validation error, check the submitted fields.")
    }
}

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::QuizLocked(_) => StatusCode::FORBIDDEN,
            Self::QuizQuestionOutOfRange { .. } => StatusCode::BAD_REQUEST,
            Self::QuizAttemptSubmitted => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::QuizLocked(_) => String::from("Quiz is locked, try again later."),
            Self::QuizQuestionOutOfRange { order } => {
                format!("Quiz error, question {order} is out of range.")
            }
            Self::QuizAttemptSubmitted => String::from("Quiz error, attempt already submitted."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("ValidationError - {0}")]
    ValidationError(#[from] ValidationError),
    #[error("QuizError - {0}")]
    QuizError(#[from] QuizError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl From<validator::ValidationErrors> for WebError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::ValidationError(ValidationError::ValidationFailed(fields))
    }
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn auth_cookie_not_found<S: Into<String>>(cookie: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieNotFound {
            cookie: cookie.into(),
        })
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn auth_wrong_user_type(expected: UserType) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationWrongUserType { expected })
    }

    pub fn auth_staff_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationStaffRequired)
    }

    pub fn auth_inactive_user() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInactiveUser)
    }

    pub fn registration_conflict(field: &'static str) -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict { field })
    }

    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::ValidationError(ValidationError::ValidationFailed(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }]))
    }

    pub fn quiz_locked(state: &QuizState) -> Self {
        Self::QuizError(QuizError::QuizLocked(QuizLock::from(state)))
    }

    pub fn quiz_question_out_of_range(order: i32) -> Self {
        Self::QuizError(QuizError::QuizQuestionOutOfRange { order })
    }

    pub fn quiz_attempt_submitted() -> Self {
        Self::QuizError(QuizError::QuizAttemptSubmitted)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_document_error(e: crate::documents::DocumentError) -> Self {
        Self::ServerError(ServerError::ServerDocumentError(e))
    }

    pub fn server_mail_error(e: crate::mail::MailError) -> Self {
        Self::ServerError(ServerError::ServerMailError(e))
    }

    pub fn server_io_error(e: std::io::Error) -> Self {
        Self::ServerError(ServerError::ServerIoError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ValidationError(e) => e.status_code(),
            Self::QuizError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ValidationError(e) => e.client_display(),
            Self::QuizError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Lock state when a quiz cannot be started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<QuizLock>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let errors = match &self {
            Self::ValidationError(ValidationError::ValidationFailed(fields)) => {
                Some(fields.clone())
            }
            _ => None,
        };
        let lock = match &self {
            Self::QuizError(QuizError::QuizLocked(lock)) => Some(lock.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
            errors,
            lock,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(WebError::auth_required().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebError::auth_wrong_user_type(UserType::Trainee).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(WebError::registration_conflict("cuil").status_code(), StatusCode::CONFLICT);
        assert_eq!(WebError::validation("email", "invalid").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebError::quiz_attempt_submitted().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebError::quiz_locked(&QuizState::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()))
                .status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn validator_errors_become_field_errors() {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("email");
        error.message = Some("Enter a valid e-mail.".into());
        errors.add("email", error);

        match WebError::from(errors) {
            WebError::ValidationError(ValidationError::ValidationFailed(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "email");
                assert_eq!(fields[0].message, "Enter a valid e-mail.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
