//! Stateless bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the username. The
//! [`jwt_auth_middleware`] verifies the `Authorization: Bearer` header and
//! stores the claims in request extensions, where [`AuthUser`] picks them up.

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{AuthUser, jwt_auth_middleware};
