//! Bearer-token (JWT) authentication.
//!
//! The API does not issue credentials itself; tokens are minted by an
//! external identity service sharing the same HS256 secret. This module
//! only verifies them and gates write routes.

mod config;
mod jwt;
mod middleware;

pub use config::JwtConfig;
pub use jwt::{BearerClaims, TokenVerifier};
pub use middleware::bearer_auth_middleware;
