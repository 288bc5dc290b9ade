//! Command handlers for the QR context.

use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::clock::Clock;
use qrmenu_core::error::DomainError;
use qrmenu_menu::application::command_handlers::{discard_artifact, load_menu};
use qrmenu_menu::domain::aggregates::Menu;
use qrmenu_menu::domain::repository::{ArtifactAttachment, MenuRepository};
use tracing::{info, warn};

use crate::application::query_handlers::render_for_menu;
use crate::domain::artifact_name::artifact_reference;
use crate::domain::commands::SaveQrCode;

/// Result of caching a menu's code.
#[derive(Debug, Clone)]
pub struct SavedQr {
    /// Reference of the new artifact.
    pub reference: String,
    /// The menu as saved, pointing at the new artifact.
    pub menu: Menu,
}

/// Render attempts before giving up when the menu's token keeps changing
/// underneath a save.
const SAVE_ATTEMPTS: u32 = 3;

/// Handles `SaveQrCode`: renders, writes the artifact, records it on the
/// menu, then deletes the artifact it replaced on a best-effort basis.
///
/// The reference is attached only while the menu still holds the token the
/// code was rendered for. If the token was regenerated in between, the fresh
/// artifact is discarded and the code is rendered again for the new token.
/// On any failure after the write the new artifact is removed again and the
/// menu keeps pointing at its previous one.
///
/// # Errors
///
/// Returns `DomainError::UnsupportedCombination` or `DomainError::Validation`
/// for rejected options, `DomainError::AggregateNotFound` if the menu does
/// not exist, or the artifact-store or repository error.
pub async fn handle_save_qr(
    command: &SaveQrCode,
    base_url: &str,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
    artifacts: &dyn ArtifactStore,
) -> Result<SavedQr, DomainError> {
    command.options.validate()?;

    for attempt in 1..=SAVE_ATTEMPTS {
        let mut menu = load_menu(repo, command.menu_id).await?;

        let rendered = render_for_menu(&menu, &command.options, base_url, artifacts).await?;
        let now = clock.now();
        let reference = artifact_reference(menu.public_token(), rendered.format, now);
        artifacts.write(&reference, &rendered.bytes).await?;

        let attachment = repo
            .attach_qr_artifact(command.menu_id, menu.public_token(), &reference, now)
            .await;
        let replaced = match attachment {
            Ok(ArtifactAttachment::Attached { replaced }) => replaced,
            Ok(ArtifactAttachment::Stale) => {
                discard_artifact(artifacts, command.menu_id, &reference).await;
                warn!(
                    correlation_id = %command.correlation_id,
                    menu_id = %command.menu_id,
                    attempt,
                    "menu changed while saving qr artifact"
                );
                continue;
            }
            Err(e) => {
                discard_artifact(artifacts, command.menu_id, &reference).await;
                return Err(e);
            }
        };

        if let Some(previous) = replaced.filter(|previous| *previous != reference) {
            discard_artifact(artifacts, command.menu_id, &previous).await;
        }
        let _ = menu.attach_qr_artifact(reference.clone(), clock);

        info!(
            correlation_id = %command.correlation_id,
            menu_id = %command.menu_id,
            reference = %reference,
            bytes = rendered.bytes.len(),
            "qr artifact saved"
        );
        return Ok(SavedQr { reference, menu });
    }

    // A deleted menu surfaces as not found; anything else kept racing.
    load_menu(repo, command.menu_id).await?;
    Err(DomainError::Infrastructure(format!(
        "menu {} kept changing while saving its qr artifact",
        command.menu_id
    )))
}
