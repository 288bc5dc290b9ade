//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::clock::Clock;
use qrmenu_core::rng::{DeterministicRng, SystemRng};
use qrmenu_menu::domain::repository::MenuRepository;
use qrmenu_store::fs_artifact_store::FsArtifactStore;
use qrmenu_store::pg_menu_repository::PgMenuRepository;
use qrmenu_test_support::{FixedClock, InMemoryArtifactStore, InMemoryMenuRepository};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use qrmenu_api::app;
use qrmenu_api::state::AppState;

pub const BASE_URL: &str = "https://menus.example.com";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

fn seeded_rng() -> Arc<Mutex<dyn DeterministicRng + Send>> {
    Arc::new(Mutex::new(SystemRng::seeded(42)))
}

fn build(
    menu_repository: Arc<dyn MenuRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
) -> Router {
    app(AppState::new(
        fixed_clock(),
        seeded_rng(),
        menu_repository,
        artifact_store,
        BASE_URL,
    ))
}

/// Build the full app router over in-memory storage.
pub fn build_test_app() -> Router {
    build(
        Arc::new(InMemoryMenuRepository::new()),
        Arc::new(InMemoryArtifactStore::new()),
    )
}

/// Build the full app router over PostgreSQL and a temporary upload
/// directory. The directory lives as long as the returned guard.
pub fn build_pg_test_app(pool: PgPool) -> (Router, TempDir) {
    let uploads = tempfile::tempdir().unwrap();
    let router = build(
        Arc::new(PgMenuRepository::new(pool)),
        Arc::new(FsArtifactStore::new(uploads.path())),
    );
    (router, uploads)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("POST", uri, body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("PUT", uri, body)).await
}

/// Send a request without a body and return the response.
pub async fn send_empty(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_empty(app, "GET", uri).await
}

/// Send a GET request and return the raw body with its content type.
pub async fn get_bytes(app: &Router, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body_bytes.to_vec())
}
