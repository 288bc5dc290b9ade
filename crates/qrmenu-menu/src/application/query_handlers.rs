//! Query handlers for the Menu context.
//!
//! This module loads aggregates and returns read-only view DTOs.

use chrono::{DateTime, Utc};
use qrmenu_core::error::DomainError;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers::load_menu;
use crate::domain::aggregates::Menu;
use crate::domain::content::MenuContent;
use crate::domain::history::Version;
use crate::domain::repository::MenuRepository;

/// Full owner-facing view of a menu, without its history.
#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub id: Uuid,
    pub public_token: String,
    pub public_url: String,
    pub current_version_number: i64,
    pub content: MenuContent,
    pub qr_artifact_ref: Option<String>,
    pub views: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuView {
    /// Builds the view, resolving the public URL against `base_url`.
    #[must_use]
    pub fn from_menu(menu: &Menu, base_url: &str) -> Self {
        Self {
            id: menu.id,
            public_token: menu.public_token().to_string(),
            public_url: menu.public_url(base_url),
            current_version_number: menu.current_version_number(),
            content: menu.content().clone(),
            qr_artifact_ref: menu.qr_artifact_ref().map(str::to_owned),
            views: menu.views(),
            last_viewed_at: menu.last_viewed_at(),
            created_at: menu.created_at(),
            updated_at: menu.updated_at(),
        }
    }
}

/// Compact listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct MenuSummary {
    pub id: Uuid,
    pub public_token: String,
    pub business_name: String,
    pub item_count: usize,
    pub is_open: bool,
    pub current_version_number: i64,
    pub created_at: DateTime<Utc>,
}

/// Public view served under the short token.
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenuView {
    pub public_token: String,
    pub content: MenuContent,
}

impl From<&Menu> for PublicMenuView {
    fn from(menu: &Menu) -> Self {
        let mut content = menu.content().clone();
        content.items.sort_by_key(|item| item.order);
        Self {
            public_token: menu.public_token().to_string(),
            content,
        }
    }
}

/// Retained history plus the live version number.
#[derive(Debug, Clone, Serialize)]
pub struct VersionListView {
    pub menu_id: Uuid,
    pub current_version_number: i64,
    /// Oldest first.
    pub versions: Vec<Version>,
}

/// Retrieves a menu by id.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the menu does not exist.
pub async fn get_menu_by_id(
    menu_id: Uuid,
    base_url: &str,
    repo: &dyn MenuRepository,
) -> Result<MenuView, DomainError> {
    let menu = load_menu(repo, menu_id).await?;
    Ok(MenuView::from_menu(&menu, base_url))
}

/// Lists all menus, newest first.
///
/// # Errors
///
/// Returns the repository error if listing fails.
pub async fn list_menus(repo: &dyn MenuRepository) -> Result<Vec<MenuSummary>, DomainError> {
    let mut menus = repo.list().await?;
    menus.sort_by_key(|m| std::cmp::Reverse(m.created_at()));
    Ok(menus
        .iter()
        .map(|menu| MenuSummary {
            id: menu.id,
            public_token: menu.public_token().to_string(),
            business_name: menu.content().business_name.clone(),
            item_count: menu.content().items.len(),
            is_open: menu.content().is_open,
            current_version_number: menu.current_version_number(),
            created_at: menu.created_at(),
        })
        .collect())
}

/// Lists the retained versions of a menu.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the menu does not exist.
pub async fn list_versions(
    menu_id: Uuid,
    repo: &dyn MenuRepository,
) -> Result<VersionListView, DomainError> {
    let menu = load_menu(repo, menu_id).await?;
    Ok(VersionListView {
        menu_id,
        current_version_number: menu.current_version_number(),
        versions: menu.history().versions().cloned().collect(),
    })
}
