//! Authentication: bearer token verification, password hashing, auth routes.

mod handlers;
mod jwt;
pub mod password;

pub use handlers::{login, me, register, LoginRequest, RegisterRequest, SessionData};
pub use jwt::{bearer_token, Claims, JwtSecret};
