mod context;
pub use context::{AuthenticatedUser, RequestContext, UserType};

mod error;
pub use error::{ErrorResponse, FieldError, QuizLock, WebError, WebResult};

pub mod dto;

pub mod middlewares;

mod state;
pub use state::AppState;

pub mod routes;

pub mod doc;
