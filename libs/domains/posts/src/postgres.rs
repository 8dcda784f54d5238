//! sea-orm backed collaborators.

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{comment, like, notification, post, user},
    error::{PostError, PostResult},
    models::{Comment, Like, Notification, Post, User},
    page::{Page, PageSpec, SortDirection, SortField},
    repository::{CommentStore, LikeStore, NotificationStore, PostStore, UserDirectory},
};

/// Applies the requested sort if `column` knows the property, then orders by id.
fn sorted<E: EntityTrait>(
    query: Select<E>,
    spec: &PageSpec,
    column: impl Fn(SortField) -> Option<E::Column>,
    id: E::Column,
) -> Select<E> {
    let requested = spec
        .sort
        .as_ref()
        .and_then(|sort| sort.field().and_then(&column).map(|col| (col, sort.direction)));

    let query = match requested {
        Some((col, SortDirection::Asc)) => query.order_by(col, Order::Asc),
        Some((col, SortDirection::Desc)) => query.order_by(col, Order::Desc),
        None => query,
    };
    query.order_by(id, Order::Asc)
}

async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    spec: &PageSpec,
) -> PostResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    // The paginator multiplies page by size unchecked.
    spec.checked_offset()?;

    let paginator = query.paginate(db, spec.size);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(spec.page).await?;

    Ok(Page::new(models, spec, total))
}

/// Takes a shared row lock on the post so a concurrent delete waits for the
/// caller's transaction. A missing post is `PostNotFound`.
async fn lock_post<C: ConnectionTrait>(conn: &C, post_id: Uuid) -> PostResult<()> {
    post::Entity::find_by_id(post_id)
        .lock_shared()
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(PostError::PostNotFound(post_id))
}

#[derive(Clone)]
pub struct PgUserDirectory {
    db: DatabaseConnection,
}

impl PgUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new account. Accounts are otherwise owned by the identity system.
    pub async fn create(&self, username: &str) -> PostResult<User> {
        let user = User::new(username);
        let model = user::ActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            created_at: Set(user.created_at.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id = %model.id, username, "Created user");
        Ok(model.into())
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> PostResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }
}

#[derive(Clone)]
pub struct PgPostStore {
    db: DatabaseConnection,
}

impl PgPostStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn sort_column(field: SortField) -> Option<post::Column> {
        match field {
            SortField::Id => Some(post::Column::Id),
            SortField::Title => Some(post::Column::Title),
            SortField::CreatedAt => Some(post::Column::CreatedAt),
            SortField::UpdatedAt => Some(post::Column::UpdatedAt),
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find_by_id(&self, id: Uuid) -> PostResult<Option<Post>> {
        let model = post::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn insert(&self, post: Post) -> PostResult<Post> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn update(&self, post: Post) -> PostResult<Option<Post>> {
        // Single conditional statement; owner and created_at are never written.
        let result = post::Entity::update_many()
            .col_expr(post::Column::Title, Expr::value(post.title.clone()))
            .col_expr(post::Column::Body, Expr::value(post.body.clone()))
            .col_expr(
                post::Column::UpdatedAt,
                Expr::value(post.updated_at.fixed_offset()),
            )
            .filter(post::Column::Id.eq(post.id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(post))
    }

    async fn delete(&self, id: Uuid) -> PostResult<bool> {
        let result = post::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_all(&self, page: &PageSpec) -> PostResult<Page<Post>> {
        let query = sorted(post::Entity::find(), page, Self::sort_column, post::Column::Id);
        Ok(fetch_page(&self.db, query, page).await?.map(Into::into))
    }

    async fn find_all_by_owner(&self, user_id: Uuid, page: &PageSpec) -> PostResult<Page<Post>> {
        let query = sorted(
            post::Entity::find().filter(post::Column::UserId.eq(user_id)),
            page,
            Self::sort_column,
            post::Column::Id,
        );
        Ok(fetch_page(&self.db, query, page).await?.map(Into::into))
    }
}

#[derive(Clone)]
pub struct PgLikeStore {
    db: DatabaseConnection,
}

impl PgLikeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn find_by_user_and_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> PostResult<Option<Like>> {
        let model = like::Entity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn save(&self, like: Like) -> PostResult<Like> {
        let (user_id, post_id) = (like.user_id, like.post_id);
        let active_model: like::ActiveModel = like.clone().into();

        let txn = self.db.begin().await?;
        lock_post(&txn, post_id).await?;

        let inserted = match like::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([like::Column::UserId, like::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
        {
            Ok(rows) => rows,
            Err(DbErr::RecordNotInserted) => 0,
            Err(e) => return Err(e.into()),
        };

        if inserted == 0 {
            return Err(PostError::AlreadyLiked { user_id, post_id });
        }
        txn.commit().await?;
        Ok(like)
    }

    async fn count_by_post(&self, post_id: Uuid) -> PostResult<u64> {
        let count = like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

#[derive(Clone)]
pub struct PgCommentStore {
    db: DatabaseConnection,
}

impl PgCommentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn sort_column(field: SortField) -> Option<comment::Column> {
        match field {
            SortField::Id => Some(comment::Column::Id),
            SortField::CreatedAt => Some(comment::Column::CreatedAt),
            SortField::Title | SortField::UpdatedAt => None,
        }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn save(&self, comment: Comment) -> PostResult<Comment> {
        let txn = self.db.begin().await?;
        lock_post(&txn, comment.post_id).await?;

        let active_model: comment::ActiveModel = comment.into();
        let model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(model.into())
    }

    async fn find_all_by_post(&self, post_id: Uuid, page: &PageSpec) -> PostResult<Page<Comment>> {
        let query = sorted(
            comment::Entity::find().filter(comment::Column::PostId.eq(post_id)),
            page,
            Self::sort_column,
            comment::Column::Id,
        );
        Ok(fetch_page(&self.db, query, page).await?.map(Into::into))
    }
}

#[derive(Clone)]
pub struct PgNotificationStore {
    db: DatabaseConnection,
}

impl PgNotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn sort_column(field: SortField) -> Option<notification::Column> {
        match field {
            SortField::Id => Some(notification::Column::Id),
            SortField::CreatedAt => Some(notification::Column::CreatedAt),
            SortField::Title | SortField::UpdatedAt => None,
        }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn save(&self, notification: Notification) -> PostResult<Notification> {
        let active_model = notification::ActiveModel::try_from(notification)?;
        let model = active_model.insert(&self.db).await?;
        model.try_into()
    }

    async fn find_all_by_recipient(
        &self,
        user_id: Uuid,
        page: &PageSpec,
    ) -> PostResult<Page<Notification>> {
        let query = sorted(
            notification::Entity::find().filter(notification::Column::UserId.eq(user_id)),
            page,
            Self::sort_column,
            notification::Column::Id,
        );
        fetch_page(&self.db, query, page)
            .await?
            .try_map(Notification::try_from)
    }
}
