use std::sync::Arc;
use uuid::Uuid;

use crate::error::{PostError, PostResult};
use crate::models::{
    Comment, Like, Notification, NotificationArgs, NotificationKind, Post, User,
};
use crate::page::{Page, PageSpec};
use crate::repository::{CommentStore, LikeStore, NotificationStore, PostStore, UserDirectory};

/// Authorization and mutation gateway for posts, likes and comments.
///
/// Every operation resolves the acting user first, then the target post, so
/// `UserNotFound` always wins over `PostNotFound` and `InvalidPermission`.
/// Each operation performs at most one primary write, after all its checks.
/// Notifications are recorded afterwards and never fail the operation.
#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserDirectory>,
    posts: Arc<dyn PostStore>,
    likes: Arc<dyn LikeStore>,
    comments: Arc<dyn CommentStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl PostService {
    pub fn new(
        users: impl UserDirectory + 'static,
        posts: impl PostStore + 'static,
        likes: impl LikeStore + 'static,
        comments: impl CommentStore + 'static,
        notifications: impl NotificationStore + 'static,
    ) -> Self {
        Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
            likes: Arc::new(likes),
            comments: Arc::new(comments),
            notifications: Arc::new(notifications),
        }
    }

    async fn resolve_user(&self, username: &str) -> PostResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| PostError::UserNotFound(username.to_string()))
    }

    async fn resolve_post(&self, post_id: Uuid) -> PostResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::PostNotFound(post_id))
    }

    /// Resolves user then post and checks the user owns it.
    async fn resolve_owned_post(&self, username: &str, post_id: Uuid) -> PostResult<Post> {
        let user = self.resolve_user(username).await?;
        let post = self.resolve_post(post_id).await?;

        if !post.is_owned_by(&user) {
            return Err(PostError::InvalidPermission {
                username: user.username,
                post_id,
            });
        }

        Ok(post)
    }

    /// Records a notification for the post owner. Failures are logged only.
    async fn notify(&self, post: &Post, kind: NotificationKind, from: &User) {
        let notification = Notification::new(
            post.user_id,
            kind,
            NotificationArgs {
                from_user_id: from.id,
                target_id: post.id,
            },
        );

        if let Err(e) = self.notifications.save(notification).await {
            tracing::warn!(
                post_id = %post.id,
                kind = %kind,
                error = %e,
                "Failed to record notification"
            );
        }
    }

    pub async fn create(&self, title: &str, body: &str, username: &str) -> PostResult<Post> {
        let user = self.resolve_user(username).await?;
        let post = self.posts.insert(Post::new(title, body, &user)).await?;

        tracing::info!(post_id = %post.id, username, "Created post");
        Ok(post)
    }

    pub async fn modify(
        &self,
        title: &str,
        body: &str,
        username: &str,
        post_id: Uuid,
    ) -> PostResult<Post> {
        let mut post = self.resolve_owned_post(username, post_id).await?;
        post.revise(title, body);

        let post = self
            .posts
            .update(post)
            .await?
            .ok_or(PostError::PostNotFound(post_id))?;

        tracing::info!(post_id = %post.id, username, "Modified post");
        Ok(post)
    }

    /// Removes the post. Its likes and comments go with it.
    pub async fn delete(&self, username: &str, post_id: Uuid) -> PostResult<()> {
        let post = self.resolve_owned_post(username, post_id).await?;

        if !self.posts.delete(post.id).await? {
            return Err(PostError::PostNotFound(post_id));
        }

        tracing::info!(post_id = %post_id, username, "Deleted post");
        Ok(())
    }

    pub async fn list(&self, page: &PageSpec) -> PostResult<Page<Post>> {
        self.posts.find_all(page).await
    }

    pub async fn my_list(&self, username: &str, page: &PageSpec) -> PostResult<Page<Post>> {
        let user = self.resolve_user(username).await?;
        self.posts.find_all_by_owner(user.id, page).await
    }

    pub async fn like(&self, post_id: Uuid, username: &str) -> PostResult<()> {
        let user = self.resolve_user(username).await?;
        let post = self.resolve_post(post_id).await?;

        if self
            .likes
            .find_by_user_and_post(user.id, post.id)
            .await?
            .is_some()
        {
            return Err(PostError::AlreadyLiked {
                user_id: user.id,
                post_id,
            });
        }

        // The store enforces uniqueness, so a concurrent duplicate fails here.
        self.likes.save(Like::new(&user, &post)).await?;
        tracing::info!(post_id = %post_id, username, "Liked post");

        self.notify(&post, NotificationKind::NewLikeOnPost, &user)
            .await;
        Ok(())
    }

    pub async fn like_count(&self, post_id: Uuid) -> PostResult<u64> {
        let post = self.resolve_post(post_id).await?;
        self.likes.count_by_post(post.id).await
    }

    pub async fn comment(&self, post_id: Uuid, comment: &str, username: &str) -> PostResult<()> {
        let user = self.resolve_user(username).await?;
        let post = self.resolve_post(post_id).await?;

        let comment = self.comments.save(Comment::new(comment, &user, &post)).await?;
        tracing::info!(post_id = %post_id, comment_id = %comment.id, username, "Commented on post");

        self.notify(&post, NotificationKind::NewCommentOnPost, &user)
            .await;
        Ok(())
    }

    pub async fn get_comments(&self, post_id: Uuid, page: &PageSpec) -> PostResult<Page<Comment>> {
        let post = self.resolve_post(post_id).await?;
        self.comments.find_all_by_post(post.id, page).await
    }

    /// Notifications addressed to the acting user.
    pub async fn notifications(
        &self,
        username: &str,
        page: &PageSpec,
    ) -> PostResult<Page<Notification>> {
        let user = self.resolve_user(username).await?;
        self.notifications.find_all_by_recipient(user.id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        MockCommentStore, MockLikeStore, MockNotificationStore, MockPostStore, MockUserDirectory,
    };
    use mockall::predicate::eq;

    #[derive(Default)]
    struct Mocks {
        users: MockUserDirectory,
        posts: MockPostStore,
        likes: MockLikeStore,
        comments: MockCommentStore,
        notifications: MockNotificationStore,
    }

    impl Mocks {
        fn new() -> Self {
            Self::default()
        }

        fn with_user(mut self, user: &User) -> Self {
            let user = user.clone();
            let name = user.username.clone();
            self.users
                .expect_find_by_username()
                .withf(move |username| username == name)
                .returning(move |_| Ok(Some(user.clone())));
            self
        }

        fn without_user(mut self, missing: &'static str) -> Self {
            self.users
                .expect_find_by_username()
                .withf(move |username| username == missing)
                .returning(|_| Ok(None));
            self
        }

        fn with_post(mut self, post: &Post) -> Self {
            let post = post.clone();
            self.posts
                .expect_find_by_id()
                .with(eq(post.id))
                .returning(move |_| Ok(Some(post.clone())));
            self
        }

        fn without_post(mut self, post_id: Uuid) -> Self {
            self.posts
                .expect_find_by_id()
                .with(eq(post_id))
                .returning(|_| Ok(None));
            self
        }

        fn service(self) -> PostService {
            PostService::new(
                self.users,
                self.posts,
                self.likes,
                self.comments,
                self.notifications,
            )
        }
    }

    fn alice() -> User {
        User::new("alice")
    }

    fn bob() -> User {
        User::new("bob")
    }

    #[tokio::test]
    async fn test_create_persists_post_owned_by_user() {
        let alice = alice();
        let mut mocks = Mocks::new().with_user(&alice);
        let owner = alice.id;
        mocks
            .posts
            .expect_insert()
            .withf(move |p| p.title == "T" && p.body == "B" && p.user_id == owner)
            .times(1)
            .returning(|p| Ok(p));

        let post = mocks.service().create("T", "B", "alice").await.unwrap();

        assert_eq!(post.title, "T");
        assert_eq!(post.body, "B");
        assert_eq!(post.user_id, alice.id);
    }

    #[tokio::test]
    async fn test_create_unknown_user_writes_nothing() {
        let mut mocks = Mocks::new().without_user("ghost");
        mocks.posts.expect_insert().never();

        let err = mocks.service().create("T", "B", "ghost").await.unwrap_err();
        assert!(matches!(err, PostError::UserNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_modify_updates_owned_post() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);
        mocks
            .posts
            .expect_update()
            .withf(|p| p.title == "T2" && p.body == "B2")
            .times(1)
            .returning(|p| Ok(Some(p)));

        let updated = mocks
            .service()
            .modify("T2", "B2", "alice", post.id)
            .await
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.user_id, alice.id);
    }

    #[tokio::test]
    async fn test_modify_missing_post() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new().with_user(&alice()).without_post(id);
        mocks.posts.expect_update().never();

        let err = mocks.service().modify("T", "B", "alice", id).await.unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(got) if got == id));
    }

    #[tokio::test]
    async fn test_modify_by_non_owner_is_rejected() {
        let post = Post::new("T", "B", &alice());
        let mut mocks = Mocks::new().with_user(&bob()).with_post(&post);
        mocks.posts.expect_update().never();

        let err = mocks
            .service()
            .modify("T2", "B2", "bob", post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::InvalidPermission { ref username, .. } if username == "bob"));
    }

    #[tokio::test]
    async fn test_modify_post_deleted_meanwhile() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);
        mocks.posts.expect_update().returning(|_| Ok(None));

        let err = mocks
            .service()
            .modify("T2", "B2", "alice", post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_user_resolution_precedes_post_lookup() {
        let mut mocks = Mocks::new().without_user("ghost");
        mocks.posts.expect_find_by_id().never();
        mocks.posts.expect_delete().never();

        let err = mocks
            .service()
            .delete("ghost", Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_owned_post() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);
        mocks
            .posts
            .expect_delete()
            .with(eq(post.id))
            .times(1)
            .returning(|_| Ok(true));

        assert!(mocks.service().delete("alice", post.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_rejected() {
        let post = Post::new("T", "B", &alice());
        let mut mocks = Mocks::new().with_user(&bob()).with_post(&post);
        mocks.posts.expect_delete().never();

        let err = mocks.service().delete("bob", post.id).await.unwrap_err();
        assert!(matches!(err, PostError::InvalidPermission { .. }));
    }

    #[tokio::test]
    async fn test_list_passes_page_spec_through() {
        let spec = PageSpec::new(3, 7)
            .unwrap()
            .with_sort("createdAt,desc".parse().unwrap());
        let expected = spec.clone();
        let mut mocks = Mocks::new();
        mocks
            .posts
            .expect_find_all()
            .withf(move |page| page == &expected)
            .times(1)
            .returning(|page| Ok(Page::empty(page)));

        let page = mocks.service().list(&spec).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.page, 3);
        assert_eq!(page.size, 7);
    }

    #[tokio::test]
    async fn test_my_list_filters_by_resolved_user() {
        let alice = alice();
        let owner = alice.id;
        let mut mocks = Mocks::new().with_user(&alice);
        mocks
            .posts
            .expect_find_all_by_owner()
            .withf(move |user_id, _| *user_id == owner)
            .times(1)
            .returning(|_, page| Ok(Page::empty(page)));

        let page = mocks
            .service()
            .my_list("alice", &PageSpec::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 0);
    }

    #[tokio::test]
    async fn test_my_list_unknown_user() {
        let mut mocks = Mocks::new().without_user("ghost");
        mocks.posts.expect_find_all_by_owner().never();

        let err = mocks
            .service()
            .my_list("ghost", &PageSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_like_saves_and_notifies_owner() {
        let alice = alice();
        let bob = bob();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&bob).with_post(&post);

        mocks
            .likes
            .expect_find_by_user_and_post()
            .with(eq(bob.id), eq(post.id))
            .returning(|_, _| Ok(None));
        mocks
            .likes
            .expect_save()
            .times(1)
            .returning(|like| Ok(like));

        let (owner, liker, post_id) = (alice.id, bob.id, post.id);
        mocks
            .notifications
            .expect_save()
            .withf(move |n| {
                n.user_id == owner
                    && n.kind == NotificationKind::NewLikeOnPost
                    && n.args.from_user_id == liker
                    && n.args.target_id == post_id
            })
            .times(1)
            .returning(|n| Ok(n));

        assert!(mocks.service().like(post.id, "bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_like_twice_is_rejected_before_writing() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let existing = Like::new(&alice, &post);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);

        mocks
            .likes
            .expect_find_by_user_and_post()
            .returning(move |_, _| Ok(Some(existing.clone())));
        mocks.likes.expect_save().never();
        mocks.notifications.expect_save().never();

        let err = mocks.service().like(post.id, "alice").await.unwrap_err();
        assert!(matches!(err, PostError::AlreadyLiked { .. }));
    }

    #[tokio::test]
    async fn test_like_losing_insert_race_is_already_liked() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);

        mocks
            .likes
            .expect_find_by_user_and_post()
            .returning(|_, _| Ok(None));
        mocks.likes.expect_save().returning(|like| {
            Err(PostError::AlreadyLiked {
                user_id: like.user_id,
                post_id: like.post_id,
            })
        });
        mocks.notifications.expect_save().never();

        let err = mocks.service().like(post.id, "alice").await.unwrap_err();
        assert!(matches!(err, PostError::AlreadyLiked { .. }));
    }

    #[tokio::test]
    async fn test_like_succeeds_when_notification_fails() {
        let alice = alice();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&alice).with_post(&post);

        mocks
            .likes
            .expect_find_by_user_and_post()
            .returning(|_, _| Ok(None));
        mocks.likes.expect_save().times(1).returning(|like| Ok(like));
        mocks
            .notifications
            .expect_save()
            .times(1)
            .returning(|_| Err(PostError::Internal("queue down".into())));

        assert!(mocks.service().like(post.id, "alice").await.is_ok());
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new().with_user(&alice()).without_post(id);
        mocks.likes.expect_find_by_user_and_post().never();
        mocks.likes.expect_save().never();

        let err = mocks.service().like(id, "alice").await.unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_like_count() {
        let post = Post::new("T", "B", &alice());
        let mut mocks = Mocks::new().with_post(&post);
        mocks
            .likes
            .expect_count_by_post()
            .with(eq(post.id))
            .returning(|_| Ok(3));

        assert_eq!(mocks.service().like_count(post.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_like_count_missing_post() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new().without_post(id);
        mocks.likes.expect_count_by_post().never();

        let err = mocks.service().like_count(id).await.unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_comment_saves_and_notifies_owner() {
        let alice = alice();
        let bob = bob();
        let post = Post::new("T", "B", &alice);
        let mut mocks = Mocks::new().with_user(&bob).with_post(&post);

        let (author, post_id, owner) = (bob.id, post.id, alice.id);
        mocks
            .comments
            .expect_save()
            .withf(move |c| c.comment == "nice!" && c.user_id == author && c.post_id == post_id)
            .times(1)
            .returning(|c| Ok(c));
        mocks
            .notifications
            .expect_save()
            .withf(move |n| n.user_id == owner && n.kind == NotificationKind::NewCommentOnPost)
            .times(1)
            .returning(|n| Ok(n));

        assert!(mocks.service().comment(post.id, "nice!", "bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_touches_no_store() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new().with_user(&alice()).without_post(id);
        mocks.comments.expect_save().never();
        mocks.notifications.expect_save().never();

        let err = mocks.service().comment(id, "nice!", "alice").await.unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_comments_missing_post() {
        let id = Uuid::now_v7();
        let mut mocks = Mocks::new().without_post(id);
        mocks.comments.expect_find_all_by_post().never();

        let err = mocks
            .service()
            .get_comments(id, &PageSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PostError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates_as_internal() {
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_username()
            .returning(|_| Err(PostError::Internal("Database error: timeout".into())));

        let err = mocks.service().create("T", "B", "alice").await.unwrap_err();
        assert!(matches!(err, PostError::Internal(_)));
    }
}
