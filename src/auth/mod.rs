mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{UserClaims, generate_token, process_token, session_claims};
mod identity;
pub use identity::{normalize_cuil, normalize_dni, normalize_email};
mod error;
pub use error::{CryptError, CryptResult};
