//! Handler tests for the posts domain
//!
//! These tests drive the router with real bearer tokens over in-memory stores:
//! - Request deserialization and validation
//! - Response serialization
//! - HTTP status codes for every error kind

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_helpers::{ErrorResponse, JwtAuth, JwtConfig};
use domain_posts::memory::{
    InMemoryCommentStore, InMemoryLikeStore, InMemoryNotificationStore, InMemoryPostStore,
    InMemoryUserDirectory,
};
use domain_posts::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-with-at-least-32-chars";

struct TestApp {
    router: Router,
    auth: JwtAuth,
}

impl TestApp {
    async fn new() -> Self {
        let users = InMemoryUserDirectory::new();
        users.register("alice").await;
        users.register("bob").await;

        let likes = InMemoryLikeStore::new();
        let comments = InMemoryCommentStore::new();
        let notifications = InMemoryNotificationStore::new();
        let posts = InMemoryPostStore::new().cascading_to(&likes, &comments, &notifications);

        let service = PostService::new(users, posts, likes, comments, notifications);
        let auth = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());

        Self {
            router: handlers::router(service, auth.clone()),
            auth,
        }
    }

    fn token(&self, username: &str) -> String {
        self.auth.create_access_token(username).unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        username: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(username) = username {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.token(username)));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_post(&self, username: &str, title: &str) -> Post {
        let (status, body) = self
            .send(
                "POST",
                "/posts",
                Some(username),
                Some(json!({ "title": title, "body": "body" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_value(body).unwrap()
    }
}

fn error_code(body: Value) -> String {
    serde_json::from_value::<ErrorResponse>(body).unwrap().error
}

#[tokio::test]
async fn test_create_post_returns_201() {
    let app = TestApp::new().await;

    let post = app.create_post("alice", "hello").await;

    assert_eq!(post.title, "hello");
    assert_eq!(post.body, "body");
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/posts", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_401() {
    let app = TestApp::new().await;
    let forged = JwtAuth::new(&JwtConfig::new("another-secret-that-is-32-chars-long!").unwrap())
        .create_access_token("alice")
        .unwrap();

    let request = Request::builder()
        .uri("/posts")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/posts",
            Some("ghost"),
            Some(json!({ "title": "T", "body": "B" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(body), "NOT_FOUND");
}

#[tokio::test]
async fn test_create_post_validates_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/posts",
            Some("alice"),
            Some(json!({ "title": "", "body": "B" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_modify_by_non_owner_is_403() {
    let app = TestApp::new().await;
    let post = app.create_post("alice", "hello").await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/posts/{}", post.id),
            Some("bob"),
            Some(json!({ "title": "T2", "body": "B2" })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(body), "FORBIDDEN");
}

#[tokio::test]
async fn test_modify_by_owner_returns_post() {
    let app = TestApp::new().await;
    let post = app.create_post("alice", "hello").await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/posts/{}", post.id),
            Some("alice"),
            Some(json!({ "title": "T2", "body": "B2" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let modified: Post = serde_json::from_value(body).unwrap();
    assert_eq!(modified.id, post.id);
    assert_eq!(modified.title, "T2");
}

#[tokio::test]
async fn test_delete_returns_204_then_404() {
    let app = TestApp::new().await;
    let post = app.create_post("alice", "hello").await;
    let uri = format!("/posts/{}", post.id);

    let (status, _) = app.send("DELETE", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("DELETE", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_uuid_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send("GET", "/posts/not-a-uuid/likes", Some("alice"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(body), "INVALID_UUID");
}

#[tokio::test]
async fn test_like_then_duplicate_is_409() {
    let app = TestApp::new().await;
    let post = app.create_post("alice", "hello").await;
    let uri = format!("/posts/{}/likes", post.id);

    let (status, _) = app.send("POST", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send("POST", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(body), "CONFLICT");

    let (status, body) = app.send("GET", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 1 }));
}

#[tokio::test]
async fn test_comment_and_list_comments() {
    let app = TestApp::new().await;
    let post = app.create_post("alice", "hello").await;
    let uri = format!("/posts/{}/comments", post.id);

    let (status, _) = app
        .send("POST", &uri, Some("bob"), Some(json!({ "comment": "nice!" })))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send("GET", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let page: Page<Comment> = serde_json::from_value(body).unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].comment, "nice!");

    let (status, body) = app
        .send("GET", "/users/notifications", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let inbox: Page<Notification> = serde_json::from_value(body).unwrap();
    assert_eq!(inbox.total_elements, 1);
    assert_eq!(inbox.content[0].kind, NotificationKind::NewCommentOnPost);
}

#[tokio::test]
async fn test_list_and_my_list_paginate() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.create_post("alice", &format!("a{i}")).await;
    }
    app.create_post("bob", "b0").await;

    let (status, body) = app
        .send("GET", "/posts?page=0&size=2&sort=title,asc", Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let page: Page<Post> = serde_json::from_value(body).unwrap();
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content[0].title, "a0");

    let (status, body) = app.send("GET", "/posts/my", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine: Page<Post> = serde_json::from_value(body).unwrap();
    assert_eq!(mine.total_elements, 1);
    assert_eq!(mine.content[0].title, "b0");
}

#[tokio::test]
async fn test_out_of_range_page_size_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send("GET", "/posts?size=1000", Some("alice"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_page_number_past_offset_range_is_400() {
    let app = TestApp::new().await;

    for uri in [
        "/posts?page=18446744073709551615&size=100",
        "/posts/my?page=9223372036854775807&size=2",
    ] {
        let (status, body) = app.send("GET", uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_code(body), "VALIDATION_ERROR");
    }
}
