//! Bearer token authentication

pub mod jwt;

pub use jwt::{AuthUser, Claims, generate_token, validate_token};
