//! Routes for rendering, caching and sharing menu QR codes.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use qrmenu_menu::application::command_handlers::handle_regenerate_identity;
use qrmenu_menu::domain::commands::RegenerateIdentity;
use qrmenu_qr::application::command_handlers::handle_save_qr;
use qrmenu_qr::application::query_handlers::{
    QrInfoView, download_menu_qr, get_qr_info, render_menu_qr,
};
use qrmenu_qr::domain::commands::SaveQrCode;
use qrmenu_qr::domain::options::{ErrorCorrection, QrFormat, RenderOptions};

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Query string for GET /{id}.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    /// `png` (default) or `svg`.
    pub format: Option<QrFormat>,
    /// Edge length in pixels.
    pub size: Option<u32>,
    /// `L`, `M` (default), `Q` or `H`.
    pub error_level: Option<ErrorCorrection>,
    /// Composite the menu's logo.
    pub logo: Option<bool>,
}

impl RenderQuery {
    fn into_options(self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            format: self.format.unwrap_or(defaults.format),
            size_px: self.size.unwrap_or(defaults.size_px),
            error_correction: self.error_level.unwrap_or(defaults.error_correction),
            include_logo: self.logo.unwrap_or(defaults.include_logo),
        }
    }
}

/// Response body for POST /{id}/save.
#[derive(Debug, Serialize)]
pub struct SaveQrResponse {
    /// Reference of the cached artifact.
    pub qr_artifact_ref: String,
    /// The URL encoded in the code.
    pub public_url: String,
}

/// Response body for POST /{id}/regenerate.
#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    /// The new public token.
    pub public_token: String,
    /// The new public URL.
    pub public_url: String,
}

/// GET /{id}
#[instrument(skip(state, query, request_headers))]
async fn render_qr(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    Query(query): Query<RenderQuery>,
    request_headers: HeaderMap,
) -> Result<Response, ApiError> {
    let options = query.into_options();
    let rendered = render_menu_qr(
        menu_id,
        &options,
        &state.public_base_url,
        &*state.menu_repository,
        &*state.artifact_store,
    )
    .await?;

    let not_modified = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == rendered.etag);
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, rendered.etag)]).into_response());
    }

    let disposition = format!("inline; filename=\"menu-qr.{}\"", rendered.extension());
    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type().to_owned()),
            (header::ETAG, rendered.etag.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}

/// POST /{id}/save
#[instrument(skip(state, options), fields(menu_id = %menu_id))]
async fn save_qr(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    AppJson(options): AppJson<RenderOptions>,
) -> Result<(StatusCode, Json<SaveQrResponse>), ApiError> {
    let command = SaveQrCode {
        correlation_id: Uuid::new_v4(),
        menu_id,
        options,
    };

    info!(correlation_id = %command.correlation_id, "handling save_qr_code command");

    let saved = handle_save_qr(
        &command,
        &state.public_base_url,
        state.clock.as_ref(),
        &*state.menu_repository,
        &*state.artifact_store,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveQrResponse {
            qr_artifact_ref: saved.reference,
            public_url: saved.menu.public_url(&state.public_base_url),
        }),
    ))
}

/// GET /{id}/download
#[instrument(skip(state))]
async fn download_qr(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let download =
        download_menu_qr(menu_id, &*state.menu_repository, &*state.artifact_store).await?;

    let disposition = format!("attachment; filename=\"{}\"", download.filename);
    Ok((
        [
            (header::CONTENT_TYPE, download.format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

/// POST /{id}/regenerate
#[instrument(skip(state))]
async fn regenerate(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<RegenerateResponse>, ApiError> {
    let command = RegenerateIdentity {
        correlation_id: Uuid::new_v4(),
        menu_id,
    };

    info!(correlation_id = %command.correlation_id, "handling regenerate_identity command");

    let menu = handle_regenerate_identity(
        &command,
        state.clock.as_ref(),
        &*state.rng,
        &state.token_allocator,
        &*state.menu_repository,
        &*state.artifact_store,
    )
    .await?;

    Ok(Json(RegenerateResponse {
        public_token: menu.public_token().to_string(),
        public_url: menu.public_url(&state.public_base_url),
    }))
}

/// GET /{id}/info
#[instrument(skip(state))]
async fn qr_info(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<QrInfoView>, ApiError> {
    let view = get_qr_info(menu_id, &state.public_base_url, &*state.menu_repository).await?;
    Ok(Json(view))
}

/// Returns the router for QR operations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(render_qr))
        .route("/{id}/save", post(save_qr))
        .route("/{id}/download", get(download_qr))
        .route("/{id}/regenerate", post(regenerate))
        .route("/{id}/info", get(qr_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use qrmenu_core::clock::Clock;
    use qrmenu_core::rng::{DeterministicRng, SystemRng};
    use qrmenu_menu::domain::aggregates::Menu;
    use qrmenu_menu::domain::content::MenuDetails;
    use qrmenu_menu::domain::token::PublicToken;
    use qrmenu_test_support::{FixedClock, InMemoryArtifactStore, InMemoryMenuRepository};
    use tower::ServiceExt;

    const BASE_URL: &str = "https://menus.example.com";
    const TOKEN: &str = "AbC123xY";

    struct Fixture {
        app: Router,
        menu_id: Uuid,
        repo: Arc<InMemoryMenuRepository>,
        artifacts: Arc<InMemoryArtifactStore>,
    }

    fn fixture() -> Fixture {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let details = MenuDetails {
            business_name: "Corner Bistro".to_owned(),
            ..MenuDetails::default()
        };
        let menu = Menu::create(
            Uuid::new_v4(),
            PublicToken::parse(TOKEN).unwrap(),
            &details,
            &clock,
        )
        .unwrap();
        let menu_id = menu.id;

        let repo = Arc::new(InMemoryMenuRepository::with_menus([menu]));
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(clock);
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SystemRng::seeded(11)));
        let state = AppState::new(clock, rng, repo.clone(), artifacts.clone(), BASE_URL);

        Fixture {
            app: router().with_state(state),
            menu_id,
            repo,
            artifacts,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn error_code(bytes: &[u8]) -> String {
        let json: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        json["error"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_render_png_with_defaults() {
        // Arrange
        let f = fixture();

        // Act
        let (status, headers, bytes) = send(&f.app, get(&format!("/{}", f.menu_id))).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert!(headers[header::ETAG].to_str().unwrap().starts_with('"'));
        assert!(
            headers[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .starts_with("inline")
        );
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (256, 256));
    }

    #[tokio::test]
    async fn test_render_svg_with_query_options() {
        let f = fixture();

        let uri = format!("/{}?format=svg&size=512&error_level=H", f.menu_id);
        let (status, headers, bytes) = send(&f.app, get(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
        assert!(String::from_utf8(bytes).unwrap().contains("<svg"));
    }

    #[tokio::test]
    async fn test_render_svg_with_logo_returns_422() {
        let f = fixture();

        let uri = format!("/{}?format=svg&logo=true", f.menu_id);
        let (status, _, bytes) = send(&f.app, get(&uri)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&bytes), "unsupported_combination");
    }

    #[tokio::test]
    async fn test_render_out_of_range_size_returns_400() {
        let f = fixture();

        let (status, _, bytes) = send(&f.app, get(&format!("/{}?size=10", f.menu_id))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&bytes), "validation_error");
    }

    #[tokio::test]
    async fn test_render_unknown_menu_returns_404() {
        let f = fixture();

        let (status, _, _) = send(&f.app, get(&format!("/{}", Uuid::new_v4()))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_matching_etag_returns_304() {
        // Arrange
        let f = fixture();
        let uri = format!("/{}", f.menu_id);
        let (_, headers, _) = send(&f.app, get(&uri)).await;
        let etag = headers[header::ETAG].clone();

        // Act
        let request = Request::builder()
            .uri(&uri)
            .header(header::IF_NONE_MATCH, etag.clone())
            .body(Body::empty())
            .unwrap();
        let (status, headers, bytes) = send(&f.app, request).await;

        // Assert
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert_eq!(headers[header::ETAG], etag);
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_download() {
        // Arrange
        let f = fixture();
        let body = serde_json::json!({ "format": "png", "size_px": 300 });

        // Act
        let (save_status, _, save_bytes) =
            send(&f.app, post_json(&format!("/{}/save", f.menu_id), &body)).await;
        let (status, headers, bytes) =
            send(&f.app, get(&format!("/{}/download", f.menu_id))).await;

        // Assert
        assert_eq!(save_status, StatusCode::CREATED);
        let saved: serde_json::Value = serde_json::from_slice(&save_bytes).unwrap();
        let reference = saved["qr_artifact_ref"].as_str().unwrap();
        assert_eq!(reference, "qr/menu-qr-AbC123xY-1768471200000.png");
        assert!(f.artifacts.contains(reference));
        assert_eq!(saved["public_url"], format!("{BASE_URL}/menu/{TOKEN}"));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"menu-qr-AbC123xY.png\""
        );
        assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 300);
    }

    #[tokio::test]
    async fn test_download_without_saved_code_returns_404() {
        let f = fixture();

        let (status, _, bytes) = send(&f.app, get(&format!("/{}/download", f.menu_id))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&bytes), "qr_artifact_not_found");
    }

    #[tokio::test]
    async fn test_regenerate_replaces_token_and_drops_cached_code() {
        // Arrange
        let f = fixture();
        let save = serde_json::json!({});
        send(&f.app, post_json(&format!("/{}/save", f.menu_id), &save)).await;

        // Act
        let request = Request::builder()
            .method("POST")
            .uri(format!("/{}/regenerate", f.menu_id))
            .body(Body::empty())
            .unwrap();
        let (status, _, bytes) = send(&f.app, request).await;
        let (_, _, info_bytes) = send(&f.app, get(&format!("/{}/info", f.menu_id))).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let token = json["public_token"].as_str().unwrap();
        assert_ne!(token, TOKEN);
        assert_eq!(json["public_url"], format!("{BASE_URL}/menu/{token}"));

        let info: serde_json::Value = serde_json::from_slice(&info_bytes).unwrap();
        assert_eq!(info["public_token"], token);
        assert_eq!(info["has_qr_code"], false);
        assert!(f.artifacts.references().is_empty());
        assert_eq!(
            f.repo.stored(f.menu_id).unwrap().public_token().to_string(),
            token
        );
    }

    #[tokio::test]
    async fn test_info_reports_sharing_details() {
        let f = fixture();

        let (status, _, bytes) = send(&f.app, get(&format!("/{}/info", f.menu_id))).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["public_token"], TOKEN);
        assert_eq!(json["has_qr_code"], false);
        assert_eq!(json["views"], 0);
    }
}
