//! QR render, save, download and info handlers against in-memory doubles.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrmenu_core::error::DomainError;
use qrmenu_menu::domain::aggregates::Menu;
use qrmenu_menu::domain::content::MenuDetails;
use qrmenu_menu::domain::repository::{ArtifactAttachment, MenuRepository};
use qrmenu_menu::domain::token::PublicToken;
use qrmenu_qr::application::command_handlers::handle_save_qr;
use qrmenu_qr::application::query_handlers::{download_menu_qr, get_qr_info, render_menu_qr};
use qrmenu_qr::domain::commands::SaveQrCode;
use qrmenu_qr::domain::options::{QrFormat, RenderOptions};
use qrmenu_test_support::{
    FailingArtifactStore, FixedClock, InMemoryArtifactStore, InMemoryMenuRepository,
    SteppingClock,
};
use uuid::Uuid;

const BASE_URL: &str = "https://menus.example.com";
const LOGO_REF: &str = "logos/logo-1.png";

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn menu(logo: Option<&str>) -> Menu {
    let details = MenuDetails {
        business_name: "Corner Bistro".to_owned(),
        logo: logo.map(str::to_owned),
        ..MenuDetails::default()
    };
    Menu::create(
        Uuid::new_v4(),
        PublicToken::parse("AbC123xY").unwrap(),
        &details,
        &FixedClock(fixed_now()),
    )
    .unwrap()
}

fn red_logo() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn png_with_logo() -> RenderOptions {
    RenderOptions {
        include_logo: true,
        ..RenderOptions::default()
    }
}

fn save_command(menu_id: Uuid, options: RenderOptions) -> SaveQrCode {
    SaveQrCode {
        correlation_id: Uuid::new_v4(),
        menu_id,
        options,
    }
}

/// Regenerates the menu's token just before the first artifact is attached,
/// as a concurrent regenerate request would.
struct RegeneratesDuringSave {
    inner: InMemoryMenuRepository,
    new_token: PublicToken,
    regenerated: AtomicBool,
}

#[async_trait]
impl MenuRepository for RegeneratesDuringSave {
    async fn load(&self, menu_id: Uuid) -> Result<Option<Menu>, DomainError> {
        self.inner.load(menu_id).await
    }

    async fn find_by_token(&self, token: &PublicToken) -> Result<Option<Menu>, DomainError> {
        self.inner.find_by_token(token).await
    }

    async fn token_exists(&self, token: &PublicToken) -> Result<bool, DomainError> {
        self.inner.token_exists(token).await
    }

    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        self.inner.list().await
    }

    async fn insert(&self, menu: &Menu) -> Result<(), DomainError> {
        self.inner.insert(menu).await
    }

    async fn save(&self, menu: &Menu) -> Result<(), DomainError> {
        self.inner.save(menu).await
    }

    async fn record_view(
        &self,
        token: &PublicToken,
        at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError> {
        self.inner.record_view(token, at).await
    }

    async fn attach_qr_artifact(
        &self,
        menu_id: Uuid,
        expected_token: &PublicToken,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError> {
        if !self.regenerated.swap(true, Ordering::SeqCst) {
            let mut menu = self
                .inner
                .load(menu_id)
                .await?
                .ok_or(DomainError::AggregateNotFound(menu_id))?;
            let _ = menu.assign_public_token(self.new_token.clone(), &FixedClock(at));
            self.inner.save(&menu).await?;
        }
        self.inner
            .attach_qr_artifact(menu_id, expected_token, reference, at)
            .await
    }

    async fn delete(&self, menu_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete(menu_id).await
    }
}

#[tokio::test]
async fn test_render_menu_qr_composites_stored_logo() {
    // Arrange
    let menu = menu(Some(LOGO_REF));
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);
    let artifacts = InMemoryArtifactStore::new().with_artifact(LOGO_REF, &red_logo());

    // Act
    let rendered = render_menu_qr(menu_id, &png_with_logo(), BASE_URL, &repo, &artifacts)
        .await
        .unwrap();

    // Assert
    let decoded = image::load_from_memory(&rendered.bytes).unwrap().to_rgba8();
    let centre = decoded.get_pixel(128, 128).0;
    assert!(centre[0] > 200 && centre[1] < 50 && centre[2] < 50, "{centre:?}");
}

#[tokio::test]
async fn test_render_menu_qr_with_corrupt_logo_returns_plain_code() {
    // Arrange
    let menu = menu(Some(LOGO_REF));
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);
    let corrupt = InMemoryArtifactStore::new().with_artifact(LOGO_REF, b"\x89PNG truncated");

    // Act
    let with_corrupt_logo = render_menu_qr(menu_id, &png_with_logo(), BASE_URL, &repo, &corrupt)
        .await
        .unwrap();
    let plain = render_menu_qr(
        menu_id,
        &RenderOptions::default(),
        BASE_URL,
        &repo,
        &InMemoryArtifactStore::new(),
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(with_corrupt_logo.bytes, plain.bytes);
}

#[tokio::test]
async fn test_render_menu_qr_with_unreadable_logo_store_returns_plain_code() {
    let menu = menu(Some(LOGO_REF));
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);

    let result =
        render_menu_qr(menu_id, &png_with_logo(), BASE_URL, &repo, &FailingArtifactStore).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_render_menu_qr_rejects_svg_with_logo_before_loading() {
    // The menu does not exist: option checks come first.
    let options = RenderOptions {
        format: QrFormat::Svg,
        include_logo: true,
        ..RenderOptions::default()
    };

    let result = render_menu_qr(
        Uuid::new_v4(),
        &options,
        BASE_URL,
        &InMemoryMenuRepository::new(),
        &InMemoryArtifactStore::new(),
    )
    .await;

    assert!(matches!(result, Err(DomainError::UnsupportedCombination(_))));
}

#[tokio::test]
async fn test_save_qr_writes_artifact_and_replaces_previous() {
    // Arrange
    let menu = menu(None);
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);
    let artifacts = InMemoryArtifactStore::new();
    let clock = SteppingClock::new(fixed_now(), Duration::seconds(1));

    // Act
    let first = handle_save_qr(
        &save_command(menu_id, RenderOptions::default()),
        BASE_URL,
        &clock,
        &repo,
        &artifacts,
    )
    .await
    .unwrap();
    let svg = RenderOptions {
        format: QrFormat::Svg,
        ..RenderOptions::default()
    };
    let second = handle_save_qr(&save_command(menu_id, svg), BASE_URL, &clock, &repo, &artifacts)
        .await
        .unwrap();

    // Assert
    assert_eq!(first.reference, "qr/menu-qr-AbC123xY-1768471200000.png");
    assert!(second.reference.starts_with("qr/menu-qr-AbC123xY-"));
    assert!(second.reference.ends_with(".svg"));
    assert_eq!(artifacts.references(), vec![second.reference.clone()]);
    let stored = repo.stored(menu_id).unwrap();
    assert_eq!(stored.qr_artifact_ref(), Some(second.reference.as_str()));
    assert_eq!(stored.current_version_number(), 1);
}

#[tokio::test]
async fn test_save_qr_racing_a_regenerate_attaches_code_for_new_token() {
    // Arrange
    let menu = menu(None);
    let menu_id = menu.id;
    let repo = RegeneratesDuringSave {
        inner: InMemoryMenuRepository::with_menus([menu]),
        new_token: PublicToken::parse("NEWTOKEN").unwrap(),
        regenerated: AtomicBool::new(false),
    };
    let artifacts = InMemoryArtifactStore::new();
    let clock = SteppingClock::new(fixed_now(), Duration::seconds(1));

    // Act
    let saved = handle_save_qr(
        &save_command(menu_id, RenderOptions::default()),
        BASE_URL,
        &clock,
        &repo,
        &artifacts,
    )
    .await
    .unwrap();

    // Assert
    assert!(saved.reference.starts_with("qr/menu-qr-NEWTOKEN-"));
    assert_eq!(artifacts.references(), vec![saved.reference.clone()]);
    let stored = repo.inner.stored(menu_id).unwrap();
    assert_eq!(stored.public_token().as_str(), "NEWTOKEN");
    assert_eq!(stored.qr_artifact_ref(), Some(saved.reference.as_str()));
}

#[tokio::test]
async fn test_save_qr_for_missing_menu_writes_nothing() {
    let artifacts = InMemoryArtifactStore::new();

    let result = handle_save_qr(
        &save_command(Uuid::new_v4(), RenderOptions::default()),
        BASE_URL,
        &FixedClock(fixed_now()),
        &InMemoryMenuRepository::new(),
        &artifacts,
    )
    .await;

    assert!(matches!(result, Err(DomainError::AggregateNotFound(_))));
    assert!(artifacts.references().is_empty());
}

#[tokio::test]
async fn test_download_returns_saved_artifact() {
    // Arrange
    let menu = menu(None);
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);
    let artifacts = InMemoryArtifactStore::new();
    handle_save_qr(
        &save_command(menu_id, RenderOptions::default()),
        BASE_URL,
        &FixedClock(fixed_now()),
        &repo,
        &artifacts,
    )
    .await
    .unwrap();

    // Act
    let download = download_menu_qr(menu_id, &repo, &artifacts).await.unwrap();

    // Assert
    assert_eq!(download.format, QrFormat::Png);
    assert_eq!(download.filename, "menu-qr-AbC123xY.png");
    assert!(download.bytes.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_download_without_artifact_is_not_found() {
    let menu = menu(None);
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);

    let result = download_menu_qr(menu_id, &repo, &InMemoryArtifactStore::new()).await;

    assert!(matches!(result, Err(DomainError::ArtifactNotFound(id)) if id == menu_id));
}

#[tokio::test]
async fn test_download_with_missing_file_is_not_found() {
    // Arrange
    let mut menu = menu(None);
    let _ = menu.attach_qr_artifact("qr/gone.png".to_owned(), &FixedClock(fixed_now()));
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);

    // Act
    let result = download_menu_qr(menu_id, &repo, &InMemoryArtifactStore::new()).await;

    // Assert
    assert!(matches!(result, Err(DomainError::ArtifactNotFound(_))));
}

#[tokio::test]
async fn test_qr_info_reports_sharing_details() {
    // Arrange
    let mut menu = menu(None);
    let _ = menu.attach_qr_artifact("qr/a.png".to_owned(), &FixedClock(fixed_now()));
    let menu_id = menu.id;
    let repo = InMemoryMenuRepository::with_menus([menu]);

    // Act
    let info = get_qr_info(menu_id, BASE_URL, &repo).await.unwrap();

    // Assert
    assert_eq!(info.public_token, "AbC123xY");
    assert_eq!(info.public_url, "https://menus.example.com/menu/AbC123xY");
    assert!(info.has_qr_code);
    assert_eq!(info.qr_artifact_ref.as_deref(), Some("qr/a.png"));
    assert_eq!(info.views, 0);
}
