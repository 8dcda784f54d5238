use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::{DeriveActiveEnum, EnumIter, StringLen};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A registered account. Only the username is meaningful to the post domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Owner; fixed at creation
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: impl Into<String>, body: impl Into<String>, owner: &User) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            body: body.into(),
            user_id: owner.id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id == user.id
    }

    /// Replaces title and body, bumping `updated_at`. Ownership is untouched.
    pub fn revise(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.title = title.into();
        self.body = body.into();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user: &User, post: &Post) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user.id,
            post_id: post.id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub comment: String,
    /// Author
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(comment: impl Into<String>, author: &User, post: &Post) -> Self {
        Self {
            id: Uuid::now_v7(),
            comment: comment.into(),
            user_id: author.id,
            post_id: post.id,
            created_at: Utc::now(),
        }
    }
}

/// What happened on a post.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    #[sea_orm(string_value = "NEW_LIKE_ON_POST")]
    NewLikeOnPost,
    #[sea_orm(string_value = "NEW_COMMENT_ON_POST")]
    NewCommentOnPost,
}

impl NotificationKind {
    pub fn text(&self) -> &'static str {
        match self {
            NotificationKind::NewLikeOnPost => "new like!",
            NotificationKind::NewCommentOnPost => "new comment!",
        }
    }
}

/// Who triggered a notification and on which post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationArgs {
    pub from_user_id: Uuid,
    pub target_id: Uuid,
}

/// A record telling a post owner about activity on their post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient, the owner of the post
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub args: NotificationArgs,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient: Uuid, kind: NotificationKind, args: NotificationArgs) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: recipient,
            kind,
            args,
            created_at: Utc::now(),
        }
    }
}

/// DTO for creating a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePost {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
}

/// DTO for modifying a post; both fields are replaced
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ModifyPost {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LikeCount {
    pub count: u64,
}
