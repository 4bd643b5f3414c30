#![allow(dead_code)]

use std::sync::Arc;

use apresiasi_api::auth::jwt::{generate_access_token, JwtConfig};
use apresiasi_api::config::ServerConfig;
use apresiasi_api::router::build_app_router;
use apresiasi_api::state::AppState;
use apresiasi_core::period::PeriodKind;
use apresiasi_core::roles::RoleOverrides;
use apresiasi_core::types::{Date, DbId};
use apresiasi_db::models::period::{CreatePeriod, Period};
use apresiasi_db::models::profile::{CreateProfile, Profile};
use apresiasi_db::repositories::{PeriodRepo, ProfileRepo, UserRoleRepo};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        pin_quota: 4,
        role_overrides: RoleOverrides::default(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A bearer token for `email`, signed with the test secret.
pub fn token_for(email: &str) -> String {
    generate_access_token(email, &test_config().jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a profile whose email is `{name}@bps.go.id`.
pub async fn create_profile(pool: &PgPool, name: &str) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: format!("{name}@bps.go.id"),
            full_name: name.to_string(),
            jabatan: Some("Statistisi Ahli".to_string()),
        },
    )
    .await
    .expect("profile creation should succeed")
}

pub async fn set_role(pool: &PgPool, user_id: DbId, role: &str) {
    UserRoleRepo::set_role(pool, user_id, role)
        .await
        .expect("role assignment should succeed");
}

/// Create and activate a period of `kind` covering `[start, end]`.
pub async fn active_period(pool: &PgPool, kind: PeriodKind, start: Date, end: Date) -> Period {
    let created = PeriodRepo::create(
        pool,
        kind,
        &CreatePeriod {
            month: Some(chrono::Datelike::month(&start) as i32),
            year: Some(chrono::Datelike::year(&start)),
            start_date: start,
            end_date: end,
        },
    )
    .await
    .expect("period creation should succeed");
    PeriodRepo::activate(pool, kind, created.id)
        .await
        .expect("activation should succeed")
        .expect("period should exist")
}

/// Create and activate a period of `kind` covering yesterday through tomorrow.
pub async fn active_period_around_today(pool: &PgPool, kind: PeriodKind) -> Period {
    let today = chrono::Utc::now().date_naive();
    active_period(
        pool,
        kind,
        today.pred_opt().unwrap(),
        today.succ_opt().unwrap(),
    )
    .await
}
