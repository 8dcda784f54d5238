//! Shared application state, cloned into routers at startup.

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    /// Bearer token verification
    pub jwt_auth: JwtAuth,
}
