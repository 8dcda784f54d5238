use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a post-domain operation.
///
/// The first four variants are business outcomes. `Validation` and `Internal`
/// cover bad page parameters and store failures.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Post {0} not found")]
    PostNotFound(Uuid),

    #[error("User {username} has no permission on post {post_id}")]
    InvalidPermission { username: String, post_id: Uuid },

    #[error("User {user_id} already liked post {post_id}")]
    AlreadyLiked { user_id: Uuid, post_id: Uuid },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PostResult<T> = Result<T, PostError>;

impl From<DbErr> for PostError {
    fn from(err: DbErr) -> Self {
        PostError::Internal(format!("Database error: {}", err))
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        let message = err.to_string();
        match err {
            PostError::UserNotFound(_) | PostError::PostNotFound(_) => AppError::NotFound(message),
            PostError::InvalidPermission { .. } => AppError::Forbidden(message),
            PostError::AlreadyLiked { .. } => AppError::Conflict(message),
            PostError::Validation(msg) => AppError::BadRequest(msg),
            PostError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
