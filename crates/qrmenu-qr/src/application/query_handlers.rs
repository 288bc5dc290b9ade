//! Query handlers for the QR context.

use chrono::{DateTime, Utc};
use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::error::DomainError;
use qrmenu_menu::application::command_handlers::load_menu;
use qrmenu_menu::domain::aggregates::Menu;
use qrmenu_menu::domain::repository::MenuRepository;
use serde::Serialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::domain::artifact_name::download_filename;
use crate::domain::options::{QrFormat, RenderOptions};
use crate::domain::render::{RenderedQr, render};

/// Sharing details for a menu's code.
#[derive(Debug, Clone, Serialize)]
pub struct QrInfoView {
    pub menu_id: Uuid,
    pub public_token: String,
    pub public_url: String,
    pub qr_artifact_ref: Option<String>,
    pub has_qr_code: bool,
    pub views: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

/// A cached artifact ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct QrDownload {
    pub bytes: Vec<u8>,
    pub format: QrFormat,
    pub filename: String,
}

/// Reads the menu's logo for compositing. Any failure is logged and treated
/// as "no logo".
async fn load_logo(menu: &Menu, artifacts: &dyn ArtifactStore) -> Option<Vec<u8>> {
    let reference = menu.content().logo.as_deref()?;
    match artifacts.read(reference).await {
        Ok(Some(bytes)) => Some(bytes),
        Ok(None) => {
            warn!(menu_id = %menu.id, reference, "logo artifact missing, rendering plain code");
            None
        }
        Err(e) => {
            warn!(menu_id = %menu.id, reference, error = %e, "logo read failed, rendering plain code");
            None
        }
    }
}

/// Renders `menu`'s public URL.
pub(crate) async fn render_for_menu(
    menu: &Menu,
    options: &RenderOptions,
    base_url: &str,
    artifacts: &dyn ArtifactStore,
) -> Result<RenderedQr, DomainError> {
    let logo = if options.include_logo {
        load_logo(menu, artifacts).await
    } else {
        None
    };
    render(&menu.public_url(base_url), options, logo.as_deref())
}

/// Renders a menu's code on demand, without caching it.
///
/// # Errors
///
/// Returns `DomainError::UnsupportedCombination` or `DomainError::Validation`
/// for rejected options (checked before the menu is loaded), and
/// `DomainError::AggregateNotFound` if the menu does not exist.
#[instrument(skip(options, base_url, repo, artifacts))]
pub async fn render_menu_qr(
    menu_id: Uuid,
    options: &RenderOptions,
    base_url: &str,
    repo: &dyn MenuRepository,
    artifacts: &dyn ArtifactStore,
) -> Result<RenderedQr, DomainError> {
    options.validate()?;
    let menu = load_menu(repo, menu_id).await?;
    render_for_menu(&menu, options, base_url, artifacts).await
}

/// Returns the cached artifact of a menu.
///
/// # Errors
///
/// Returns `DomainError::ArtifactNotFound` if nothing is cached or the cached
/// file is gone, and `DomainError::AggregateNotFound` if the menu does not
/// exist.
pub async fn download_menu_qr(
    menu_id: Uuid,
    repo: &dyn MenuRepository,
    artifacts: &dyn ArtifactStore,
) -> Result<QrDownload, DomainError> {
    let menu = load_menu(repo, menu_id).await?;
    let reference = menu
        .qr_artifact_ref()
        .ok_or(DomainError::ArtifactNotFound(menu_id))?;
    let bytes = artifacts
        .read(reference)
        .await?
        .ok_or(DomainError::ArtifactNotFound(menu_id))?;
    let format = QrFormat::from_reference(reference);
    Ok(QrDownload {
        bytes,
        format,
        filename: download_filename(menu.public_token(), format),
    })
}

/// Returns the sharing details of a menu.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the menu does not exist.
pub async fn get_qr_info(
    menu_id: Uuid,
    base_url: &str,
    repo: &dyn MenuRepository,
) -> Result<QrInfoView, DomainError> {
    let menu = load_menu(repo, menu_id).await?;
    Ok(QrInfoView {
        menu_id,
        public_token: menu.public_token().to_string(),
        public_url: menu.public_url(base_url),
        qr_artifact_ref: menu.qr_artifact_ref().map(str::to_owned),
        has_qr_code: menu.qr_artifact_ref().is_some(),
        views: menu.views(),
        last_viewed_at: menu.last_viewed_at(),
    })
}
