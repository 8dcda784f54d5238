use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AuthUser, JwtAuth, UuidPath, ValidatedJson, jwt_auth_middleware,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PostResult;
use crate::models::{
    Comment, CreateComment, CreatePost, LikeCount, ModifyPost, Notification, NotificationArgs,
    NotificationKind, Post,
};
use crate::page::{Page, PageParams, PageSpec};
use crate::service::PostService;

const POSTS_TAG: &str = "posts";
const USERS_TAG: &str = "users";

/// OpenAPI documentation for the posts API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_post,
        modify_post,
        delete_post,
        list_posts,
        my_posts,
        like_post,
        like_count,
        comment_post,
        get_comments,
        list_notifications,
    ),
    components(
        schemas(
            Post,
            CreatePost,
            ModifyPost,
            CreateComment,
            Comment,
            LikeCount,
            Notification,
            NotificationKind,
            NotificationArgs,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = POSTS_TAG, description = "Posts, likes and comments"),
        (name = USERS_TAG, description = "Per-user feeds")
    )
)]
pub struct ApiDoc;

/// Creates the posts router. Every route requires a bearer token.
pub fn router(service: PostService, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/my", get(my_posts))
        .route("/posts/{id}", put(modify_post).delete(delete_post))
        .route("/posts/{id}/likes", get(like_count).post(like_post))
        .route("/posts/{id}/comments", get(get_comments).post(comment_post))
        .route("/users/notifications", get(list_notifications))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware))
        .with_state(shared_service)
}

/// Create a post owned by the caller
#[utoipa::path(
    post,
    path = "/posts",
    tag = POSTS_TAG,
    request_body = CreatePost,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_post(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<CreatePost>,
) -> PostResult<impl IntoResponse> {
    let post = service
        .create(&input.title, &input.body, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Replace title and body of one of the caller's posts
#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = ModifyPost,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Post modified", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn modify_post(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ModifyPost>,
) -> PostResult<Json<Post>> {
    let post = service
        .modify(&input.title, &input.body, &user.username, id)
        .await?;
    Ok(Json(post))
}

/// Delete one of the caller's posts
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_post(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
) -> PostResult<StatusCode> {
    service.delete(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all posts
#[utoipa::path(
    get,
    path = "/posts",
    tag = POSTS_TAG,
    params(PageParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of posts", body = Page<Post>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_posts(
    State(service): State<Arc<PostService>>,
    Query(params): Query<PageParams>,
) -> PostResult<Json<Page<Post>>> {
    let spec = PageSpec::try_from(params)?;
    Ok(Json(service.list(&spec).await?))
}

/// List the caller's posts
#[utoipa::path(
    get,
    path = "/posts/my",
    tag = POSTS_TAG,
    params(PageParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of the caller's posts", body = Page<Post>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_posts(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> PostResult<Json<Page<Post>>> {
    let spec = PageSpec::try_from(params)?;
    Ok(Json(service.my_list(&user.username, &spec).await?))
}

/// Like a post, at most once per user
#[utoipa::path(
    post,
    path = "/posts/{id}/likes",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post liked"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn like_post(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
) -> PostResult<StatusCode> {
    service.like(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Number of likes on a post
#[utoipa::path(
    get,
    path = "/posts/{id}/likes",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Like count", body = LikeCount),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn like_count(
    State(service): State<Arc<PostService>>,
    UuidPath(id): UuidPath,
) -> PostResult<Json<LikeCount>> {
    let count = service.like_count(id).await?;
    Ok(Json(LikeCount { count }))
}

/// Comment on a post
#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = CreateComment,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Comment added"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn comment_post(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> PostResult<StatusCode> {
    service.comment(id, &input.comment, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List comments on a post
#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    tag = POSTS_TAG,
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        PageParams
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of comments", body = Page<Comment>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_comments(
    State(service): State<Arc<PostService>>,
    UuidPath(id): UuidPath,
    Query(params): Query<PageParams>,
) -> PostResult<Json<Page<Comment>>> {
    let spec = PageSpec::try_from(params)?;
    Ok(Json(service.get_comments(id, &spec).await?))
}

/// List notifications addressed to the caller
#[utoipa::path(
    get,
    path = "/users/notifications",
    tag = USERS_TAG,
    params(PageParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of notifications", body = Page<Notification>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_notifications(
    State(service): State<Arc<PostService>>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> PostResult<Json<Page<Notification>>> {
    let spec = PageSpec::try_from(params)?;
    Ok(Json(service.notifications(&user.username, &spec).await?))
}
