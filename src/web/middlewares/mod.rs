mod auth;
pub use auth::extract_context_fn;

pub mod session;
pub use session::{AUTH_TOKEN, CAPACITACION_REF, PENDING_TOKEN, TARGET_MODULE};
