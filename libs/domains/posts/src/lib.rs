//! Posts Domain
//!
//! Posts, likes, comments and the notifications they trigger for post owners.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, bearer auth
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ PostService │  ← Identity resolution, ownership, like uniqueness
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Collaborator traits (memory + postgres implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, page spec
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_posts::{
//!     handlers,
//!     memory::{
//!         InMemoryCommentStore, InMemoryLikeStore, InMemoryNotificationStore,
//!         InMemoryPostStore, InMemoryUserDirectory,
//!     },
//!     service::PostService,
//! };
//!
//! let likes = InMemoryLikeStore::new();
//! let comments = InMemoryCommentStore::new();
//! let notifications = InMemoryNotificationStore::new();
//! let posts = InMemoryPostStore::new().cascading_to(&likes, &comments, &notifications);
//!
//! let service = PostService::new(
//!     InMemoryUserDirectory::new(),
//!     posts,
//!     likes,
//!     comments,
//!     notifications,
//! );
//! let auth = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars").unwrap());
//!
//! let router = handlers::router(service, auth);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod page;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{PostError, PostResult};
pub use models::{
    Comment, CreateComment, CreatePost, Like, LikeCount, ModifyPost, Notification,
    NotificationArgs, NotificationKind, Post, User,
};
pub use page::{Page, PageParams, PageSpec, Sort, SortDirection};
pub use postgres::{
    PgCommentStore, PgLikeStore, PgNotificationStore, PgPostStore, PgUserDirectory,
};
pub use repository::{CommentStore, LikeStore, NotificationStore, PostStore, UserDirectory};
pub use service::PostService;
