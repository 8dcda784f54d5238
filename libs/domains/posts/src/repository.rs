//! Collaborator contracts of the post service.
//!
//! Each store is an async trait object so the service can run over Postgres in
//! production and over the in-memory stores in tests and local development.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PostResult;
use crate::models::{Comment, Like, Notification, Post, User};
use crate::page::{Page, PageSpec};

/// Resolves usernames to accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> PostResult<Option<User>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> PostResult<Option<Post>>;

    async fn insert(&self, post: Post) -> PostResult<Post>;

    /// Overwrites title, body and `updated_at` of an existing row.
    /// Returns `None` if the post no longer exists.
    async fn update(&self, post: Post) -> PostResult<Option<Post>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> PostResult<bool>;

    async fn find_all(&self, page: &PageSpec) -> PostResult<Page<Post>>;

    async fn find_all_by_owner(&self, user_id: Uuid, page: &PageSpec) -> PostResult<Page<Post>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn find_by_user_and_post(&self, user_id: Uuid, post_id: Uuid)
    -> PostResult<Option<Like>>;

    /// Persists the like, failing with `AlreadyLiked` if the (user, post) pair
    /// exists. The check and the insert must be a single atomic step.
    async fn save(&self, like: Like) -> PostResult<Like>;

    async fn count_by_post(&self, post_id: Uuid) -> PostResult<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn save(&self, comment: Comment) -> PostResult<Comment>;

    async fn find_all_by_post(&self, post_id: Uuid, page: &PageSpec) -> PostResult<Page<Comment>>;
}

/// Sink for like/comment notifications addressed to post owners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn save(&self, notification: Notification) -> PostResult<Notification>;

    async fn find_all_by_recipient(
        &self,
        user_id: Uuid,
        page: &PageSpec,
    ) -> PostResult<Page<Notification>>;
}
