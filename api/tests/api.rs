use std::time::Duration;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use blog_api::{
    config::{LowercaseKeys, Settings},
    error::AppError,
    models::{auth::AuthResponse, tag::{Tag, TagList}},
    rest, AppState,
};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use rand_core::OsRng;
use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn settings() -> Settings {
    Settings::from_figment(Figment::from(LowercaseKeys(Toml::string(&format!(
        r#"
        [server]
        [app]
        JWT_SECRET = "{SECRET}"
        PAGE_SIZE = 2
        [database]
        URL = "sqlite::memory:"
        "#
    )))))
    .unwrap()
}

async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    for stmt in include_str!("../sql/schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        sqlx::query(stmt).execute(&pool).await.unwrap();
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"p@ss", &salt)
        .unwrap()
        .to_string();
    sqlx::query("INSERT INTO blog_auth (username, password) VALUES (?, ?)")
        .bind("alice")
        .bind(hash)
        .execute(&pool)
        .await
        .unwrap();

    pool
}

async fn app() -> Router {
    let settings = settings();
    let state = AppState::new(pool().await, &settings).unwrap();
    rest::router(state, Duration::from_secs(5))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, _, body) = send(
        app,
        json_request("POST", "/auth", None, json!({"username": "alice", "password": "p@ss"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value::<AuthResponse>(body).unwrap().token
}

#[tokio::test]
async fn login_issues_verifiable_token() {
    let app = app().await;
    let token = login(&app).await;

    let claims = blog_api::token::TokenService::new(SECRET)
        .unwrap()
        .verify(&token)
        .unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.password, "p@ss");
    assert_eq!(claims.expires_at - claims.issued_at, 3 * 60 * 60);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app().await;

    let (status, _, _) = send(
        &app,
        json_request("POST", "/auth", None, json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/auth", None, json!({"username": "bob", "password": "p@ss"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/auth", None, json!({"username": "", "password": "p@ss"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_failures_map_to_distinct_statuses() {
    let app = app().await;

    let (status, _, _) = send(&app, get("/api/v1/tags", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, get("/api/v1/tags", Some("not.a.token"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let foreign = blog_api::token::TokenService::new("some-other-secret")
        .unwrap()
        .issue("alice", "p@ss")
        .unwrap();
    let (status, headers, _) = send(&app, get("/api/v1/tags", Some(&foreign))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(header::WWW_AUTHENTICATE).is_none());

    let expired = blog_api::token::TokenService::new(SECRET)
        .unwrap()
        .issue_at("alice", "p@ss", 1000)
        .unwrap();
    let (status, headers, _) = send(&app, get("/api/v1/tags", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let challenge = headers.get(header::WWW_AUTHENTICATE).unwrap().to_str().unwrap();
    assert!(challenge.contains("token expired"));
}

#[tokio::test]
async fn create_list_and_edit_tags() {
    let app = app().await;
    let token = login(&app).await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tags",
            Some(&token),
            json!({"name": "rust", "created_by": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let rust: Tag = serde_json::from_value(body).unwrap();
    assert!(rust.id > 0);
    assert_eq!(rust.state, 1);
    assert_eq!(rust.created_by, "alice");
    assert!(rust.created_on > 0);
    assert_eq!(rust.created_on, rust.modified_on);

    for dup in ["rust", "  rust "] {
        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/tags",
                Some(&token),
                json!({"name": dup, "created_by": "alice"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "{dup:?} was accepted");
    }

    for name in ["go", "zig"] {
        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/tags",
                Some(&token),
                json!({"name": name, "state": 0, "created_by": "bob"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = send(&app, get("/api/v1/tags", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.lists.len(), 2);

    let (_, _, body) = send(&app, get("/api/v1/tags?page=2", Some(&token))).await;
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.lists.len(), 1);
    assert_eq!(page.lists[0].name, "zig");

    let (_, _, body) = send(&app, get("/api/v1/tags?state=0", Some(&token))).await;
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.total, 2);
    assert!(page.lists.iter().all(|t| t.created_by == "bob"));

    let (_, _, body) = send(&app, get("/api/v1/tags?name=go", Some(&token))).await;
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.lists.len(), 1);
    assert_eq!(page.lists[0].name, "go");

    let (_, _, body) = send(&app, get("/api/v1/tags?name=go&state=0", Some(&token))).await;
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.lists[0].name, "go");

    let (_, _, body) = send(&app, get("/api/v1/tags?name=go&state=1", Some(&token))).await;
    let page: TagList = serde_json::from_value(body).unwrap();
    assert_eq!(page.total, 0);
    assert!(page.lists.is_empty());

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/tags/{}", rust.id),
            Some(&token),
            json!({"name": " rustlang ", "state": 0, "modified_by": "carol"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let edited: Tag = serde_json::from_value(body).unwrap();
    assert_eq!(edited.name, "rustlang");
    assert_eq!(edited.state, 0);
    assert_eq!(edited.modified_by, "carol");
    assert_eq!(edited.created_on, rust.created_on);

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/v1/tags/1",
            Some(&token),
            json!({"name": "go", "modified_by": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/v1/tags/999",
            Some(&token),
            json!({"state": 1, "modified_by": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_validation() {
    let app = app().await;
    let token = login(&app).await;

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tags",
            Some(&token),
            json!({"name": "", "created_by": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tags",
            Some(&token),
            json!({"name": "ok", "state": 7, "created_by": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, get("/api/v1/tags?state=5", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/api/v1/tags", Some(&token), json!({"name": "ok"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/tags",
            Some(&token),
            json!({"name": "ok", "created_by": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unique_violation_is_a_neutral_conflict() {
    let pool = pool().await;
    let err = sqlx::query("INSERT INTO blog_auth (username, password) VALUES (?, ?)")
        .bind("alice")
        .bind("irrelevant")
        .execute(&pool)
        .await
        .unwrap_err();

    let res = AppError::from(err).into_response();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Already exists");
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let res = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
