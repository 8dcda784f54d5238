//! In-memory collaborators for tests and local development.
//!
//! Every store is cheap to clone; clones share the same underlying map.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PostError, PostResult};
use crate::models::{Comment, Like, Notification, Post, User};
use crate::page::{Page, PageSpec, SortDirection, SortField};
use crate::repository::{CommentStore, LikeStore, NotificationStore, PostStore, UserDirectory};

/// Orders records the way the Postgres stores do: by the requested field,
/// then by id.
trait Sortable {
    fn id(&self) -> Uuid;
    fn compare_field(&self, other: &Self, field: SortField) -> Option<Ordering>;
}

impl Sortable for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn compare_field(&self, other: &Self, field: SortField) -> Option<Ordering> {
        match field {
            SortField::Id => Some(self.id.cmp(&other.id)),
            SortField::Title => Some(self.title.cmp(&other.title)),
            SortField::CreatedAt => Some(self.created_at.cmp(&other.created_at)),
            SortField::UpdatedAt => Some(self.updated_at.cmp(&other.updated_at)),
        }
    }
}

impl Sortable for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn compare_field(&self, other: &Self, field: SortField) -> Option<Ordering> {
        match field {
            SortField::Id => Some(self.id.cmp(&other.id)),
            SortField::CreatedAt => Some(self.created_at.cmp(&other.created_at)),
            SortField::Title | SortField::UpdatedAt => None,
        }
    }
}

impl Sortable for Notification {
    fn id(&self) -> Uuid {
        self.id
    }

    fn compare_field(&self, other: &Self, field: SortField) -> Option<Ordering> {
        match field {
            SortField::Id => Some(self.id.cmp(&other.id)),
            SortField::CreatedAt => Some(self.created_at.cmp(&other.created_at)),
            SortField::Title | SortField::UpdatedAt => None,
        }
    }
}

fn paginate<T: Sortable>(mut items: Vec<T>, spec: &PageSpec) -> Page<T> {
    let requested = spec
        .sort
        .as_ref()
        .and_then(|sort| sort.field().map(|field| (field, sort.direction)));

    items.sort_by(|a, b| {
        requested
            .and_then(|(field, direction)| {
                a.compare_field(b, field).map(|ord| match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                })
            })
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id().cmp(&b.id()))
    });

    Page::from_ordered(items, spec)
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the account for `username`, creating it on first use.
    pub async fn register(&self, username: &str) -> User {
        let mut users = self.users.write().await;
        users
            .entry(username.to_string())
            .or_insert_with(|| User::new(username))
            .clone()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> PostResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}

/// Maps keyed by or referring to a post, dropped together with it.
#[derive(Debug, Clone)]
struct Dependents {
    likes: Arc<RwLock<HashMap<(Uuid, Uuid), Like>>>,
    comments: Arc<RwLock<HashMap<Uuid, Comment>>>,
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl Dependents {
    async fn prune(&self, post_id: Uuid) {
        self.likes
            .write()
            .await
            .retain(|(_, post), _| *post != post_id);
        self.comments
            .write()
            .await
            .retain(|_, c| c.post_id != post_id);
        self.notifications
            .write()
            .await
            .retain(|_, n| n.args.target_id != post_id);
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPostStore {
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
    dependents: Option<Dependents>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleting a post also removes its likes, comments and notifications
    /// from these stores.
    pub fn cascading_to(
        mut self,
        likes: &InMemoryLikeStore,
        comments: &InMemoryCommentStore,
        notifications: &InMemoryNotificationStore,
    ) -> Self {
        self.dependents = Some(Dependents {
            likes: Arc::clone(&likes.likes),
            comments: Arc::clone(&comments.comments),
            notifications: Arc::clone(&notifications.notifications),
        });
        self
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_id(&self, id: Uuid) -> PostResult<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> PostResult<Post> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> PostResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&post.id).map(|stored| {
            stored.title = post.title;
            stored.body = post.body;
            stored.updated_at = post.updated_at;
            stored.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> PostResult<bool> {
        let removed = self.posts.write().await.remove(&id).is_some();
        if let (true, Some(dependents)) = (removed, &self.dependents) {
            dependents.prune(id).await;
        }
        Ok(removed)
    }

    async fn find_all(&self, page: &PageSpec) -> PostResult<Page<Post>> {
        let posts = self.posts.read().await.values().cloned().collect();
        Ok(paginate(posts, page))
    }

    async fn find_all_by_owner(&self, user_id: Uuid, page: &PageSpec) -> PostResult<Page<Post>> {
        let posts = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(posts, page))
    }
}

/// Likes keyed by (user_id, post_id).
#[derive(Debug, Default, Clone)]
pub struct InMemoryLikeStore {
    likes: Arc<RwLock<HashMap<(Uuid, Uuid), Like>>>,
}

impl InMemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> PostResult<Option<Like>> {
        Ok(self.likes.read().await.get(&(user_id, post_id)).cloned())
    }

    async fn save(&self, like: Like) -> PostResult<Like> {
        let mut likes = self.likes.write().await;
        match likes.entry((like.user_id, like.post_id)) {
            Entry::Occupied(_) => Err(PostError::AlreadyLiked {
                user_id: like.user_id,
                post_id: like.post_id,
            }),
            Entry::Vacant(slot) => Ok(slot.insert(like).clone()),
        }
    }

    async fn count_by_post(&self, post_id: Uuid) -> PostResult<u64> {
        let likes = self.likes.read().await;
        Ok(likes.keys().filter(|(_, post)| *post == post_id).count() as u64)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCommentStore {
    comments: Arc<RwLock<HashMap<Uuid, Comment>>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn save(&self, comment: Comment) -> PostResult<Comment> {
        self.comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_all_by_post(&self, post_id: Uuid, page: &PageSpec) -> PostResult<Page<Comment>> {
        let comments = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        Ok(paginate(comments, page))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn save(&self, notification: Notification) -> PostResult<Notification> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_all_by_recipient(
        &self,
        user_id: Uuid,
        page: &PageSpec,
    ) -> PostResult<Page<Notification>> {
        let notifications = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(notifications, page))
    }
}
