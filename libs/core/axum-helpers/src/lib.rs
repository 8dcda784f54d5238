//! # Axum Helpers
//!
//! Shared HTTP plumbing for the SNS services.
//!
//! - **[`errors`]**: the JSON error envelope and [`AppError`]
//! - **[`auth`]**: stateless HS256 bearer tokens and the [`AuthUser`] extractor
//! - **[`extractors`]**: [`UuidPath`] and [`ValidatedJson`]
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod server;

pub use auth::{AuthUser, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{UuidPath, ValidatedJson};
pub use server::{
    HealthCheckFuture, create_production_app, create_router, health_router, run_health_checks,
    shutdown_signal,
};
