pub mod cleanup;
pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{login_redirect, session_token, MaybeUser, RequireUser};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use session::{expiry_timestamp, generate_session_token, safe_next, SessionDuration};
