//! Persistence port for menu aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrmenu_core::error::DomainError;
use uuid::Uuid;

use super::aggregates::Menu;
use super::token::PublicToken;

/// Outcome of a conditional QR artifact attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactAttachment {
    /// The reference was stored; carries the reference it replaced.
    Attached {
        /// Previously cached artifact, if any.
        replaced: Option<String>,
    },
    /// The menu is gone or no longer holds the expected token.
    Stale,
}

/// Repository for loading and storing whole menu aggregates.
///
/// Implementations must enforce uniqueness of `public_token` at the storage
/// level and report a violation as `DomainError::TokenConflict`. That
/// constraint, not [`MenuRepository::token_exists`], is what guarantees two
/// menus never share a token.
///
/// View counters and the cached artifact reference have their own narrow
/// writes so that they never overwrite a concurrent content edit or token
/// change.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Loads a menu by id.
    async fn load(&self, menu_id: Uuid) -> Result<Option<Menu>, DomainError>;

    /// Loads the menu currently published under `token`.
    async fn find_by_token(&self, token: &PublicToken) -> Result<Option<Menu>, DomainError>;

    /// Returns `true` if any menu holds `token`. Advisory only.
    async fn token_exists(&self, token: &PublicToken) -> Result<bool, DomainError>;

    /// Lists all menus, newest first.
    async fn list(&self) -> Result<Vec<Menu>, DomainError>;

    /// Stores a new menu.
    async fn insert(&self, menu: &Menu) -> Result<(), DomainError>;

    /// Overwrites an existing menu as a single document. The view counter
    /// and last-view timestamp are left as stored.
    ///
    /// Returns `DomainError::AggregateNotFound` if the menu no longer exists.
    async fn save(&self, menu: &Menu) -> Result<(), DomainError>;

    /// Atomically counts one view of the menu published under `token` and
    /// returns it as updated, or `None` if no menu holds the token.
    async fn record_view(
        &self,
        token: &PublicToken,
        at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError>;

    /// Stores `reference` as the cached QR artifact only while the menu still
    /// holds `expected_token`.
    async fn attach_qr_artifact(
        &self,
        menu_id: Uuid,
        expected_token: &PublicToken,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError>;

    /// Deletes a menu, releasing its token. Returns `false` if it did not exist.
    async fn delete(&self, menu_id: Uuid) -> Result<bool, DomainError>;
}
