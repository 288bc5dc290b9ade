//! Command handlers for the Menu context.
//!
//! Each content handler loads the aggregate, runs the domain method (which
//! validates, snapshots, then mutates), and saves the whole document. A
//! failure at any step leaves the stored menu untouched.

use std::sync::Mutex;

use async_trait::async_trait;
use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::clock::Clock;
use qrmenu_core::command::Command;
use qrmenu_core::error::DomainError;
use qrmenu_core::rng::DeterministicRng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::token_allocator::{TokenAllocator, TokenCommit};
use crate::domain::aggregates::Menu;
use crate::domain::commands::{
    AddMenuItem, CreateMenu, DeleteMenu, DeleteMenuItem, RegenerateIdentity, ReorderMenuItems,
    RestoreVersion, ToggleOpenStatus, UpdateMenuDetails, UpdateMenuItem,
};
use crate::domain::repository::MenuRepository;
use crate::domain::token::PublicToken;
use crate::domain::validation::validate_details;

/// Loads a menu or fails with `AggregateNotFound`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the menu does not exist, or the
/// repository error.
pub async fn load_menu(
    repo: &dyn MenuRepository,
    menu_id: Uuid,
) -> Result<Menu, DomainError> {
    repo.load(menu_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(menu_id))
}

/// Deletes a cached artifact, logging instead of failing.
pub async fn discard_artifact(artifacts: &dyn ArtifactStore, menu_id: Uuid, reference: &str) {
    if let Err(e) = artifacts.delete(reference).await {
        warn!(%menu_id, reference, error = %e, "failed to delete stale QR artifact");
    }
}

/// Loads, mutates and saves a menu.
async fn mutate<C: Command>(
    command: &C,
    menu_id: Uuid,
    repo: &dyn MenuRepository,
    change: impl FnOnce(&mut Menu) -> Result<(), DomainError> + Send,
) -> Result<Menu, DomainError> {
    let mut menu = load_menu(repo, menu_id).await?;
    change(&mut menu)?;
    repo.save(&menu).await?;
    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        %menu_id,
        version = menu.current_version_number(),
        "menu content updated"
    );
    Ok(menu)
}

/// Inserts a brand-new menu under the candidate token.
struct InsertNewMenu<'a> {
    command: &'a CreateMenu,
    clock: &'a dyn Clock,
    repo: &'a dyn MenuRepository,
    created: Option<Menu>,
}

#[async_trait]
impl TokenCommit for InsertNewMenu<'_> {
    async fn commit(&mut self, token: &PublicToken) -> Result<(), DomainError> {
        let menu = Menu::create(
            self.command.menu_id,
            token.clone(),
            &self.command.details,
            self.clock,
        )?;
        self.repo.insert(&menu).await?;
        self.created = Some(menu);
        Ok(())
    }
}

/// Moves an existing menu onto the candidate token.
struct ReassignToken<'a> {
    menu: &'a mut Menu,
    clock: &'a dyn Clock,
    repo: &'a dyn MenuRepository,
}

#[async_trait]
impl TokenCommit for ReassignToken<'_> {
    async fn commit(&mut self, token: &PublicToken) -> Result<(), DomainError> {
        self.menu.assign_public_token(token.clone(), self.clock);
        self.repo.save(&*self.menu).await
    }
}

/// Handles `CreateMenu`: validates, allocates a token and inserts the menu.
///
/// # Errors
///
/// Returns `DomainError::Validation` before any allocation if the details are
/// invalid, `DomainError::AllocationExhausted` if no free token was found, or
/// the repository error.
pub async fn handle_create_menu(
    command: &CreateMenu,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    allocator: &TokenAllocator,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    validate_details(&command.details)?;

    let mut insert = InsertNewMenu {
        command,
        clock,
        repo,
        created: None,
    };
    let token = allocator.allocate_and_commit(rng, repo, &mut insert).await?;
    let menu = insert.created.ok_or_else(|| {
        DomainError::Infrastructure("token committed without creating a menu".into())
    })?;

    info!(
        correlation_id = %command.correlation_id,
        menu_id = %menu.id,
        %token,
        "menu created"
    );
    Ok(menu)
}

/// Handles `UpdateMenuDetails`.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation or saving fails.
pub async fn handle_update_menu_details(
    command: &UpdateMenuDetails,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.update_details(&command.details, clock)
    })
    .await
}

/// Handles `AddMenuItem`.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation or saving fails.
pub async fn handle_add_menu_item(
    command: &AddMenuItem,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.add_item(command.item_id, &command.draft, clock)
    })
    .await
}

/// Handles `UpdateMenuItem`.
///
/// # Errors
///
/// Returns `DomainError::MenuItemNotFound` for an unknown item, or any
/// loading, validation or saving error.
pub async fn handle_update_menu_item(
    command: &UpdateMenuItem,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.update_item(command.item_id, &command.draft, clock)
    })
    .await
}

/// Handles `DeleteMenuItem`.
///
/// # Errors
///
/// Returns `DomainError::MenuItemNotFound` for an unknown item, or any
/// loading or saving error.
pub async fn handle_delete_menu_item(
    command: &DeleteMenuItem,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.delete_item(command.item_id, clock)
    })
    .await
}

/// Handles `ReorderMenuItems`.
///
/// # Errors
///
/// Returns `DomainError` if loading or saving fails.
pub async fn handle_reorder_menu_items(
    command: &ReorderMenuItems,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.reorder_items(&command.item_ids, clock);
        Ok(())
    })
    .await
}

/// Handles `ToggleOpenStatus`.
///
/// # Errors
///
/// Returns `DomainError` if loading or saving fails.
pub async fn handle_toggle_open_status(
    command: &ToggleOpenStatus,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.toggle_open_status(clock);
        Ok(())
    })
    .await
}

/// Handles `RestoreVersion`.
///
/// # Errors
///
/// Returns `DomainError::VersionNotFound` if the version is outside the
/// retained window (nothing is saved), or any loading or saving error.
pub async fn handle_restore_version(
    command: &RestoreVersion,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    mutate(command, command.menu_id, repo, |menu| {
        menu.restore_version(command.version_number, clock)
    })
    .await
}

/// Handles `RegenerateIdentity`: allocates a new token, commits it, then
/// deletes the QR artifact cached for the old token on a best-effort basis.
///
/// # Errors
///
/// Returns `DomainError::AllocationExhausted` if no token could be
/// committed; the stored menu keeps its old token in that case.
pub async fn handle_regenerate_identity(
    command: &RegenerateIdentity,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    allocator: &TokenAllocator,
    repo: &dyn MenuRepository,
    artifacts: &dyn ArtifactStore,
) -> Result<Menu, DomainError> {
    let mut menu = load_menu(repo, command.menu_id).await?;
    let previous_token = menu.public_token().clone();
    let stale_artifact = menu.qr_artifact_ref().map(str::to_owned);

    let mut reassign = ReassignToken {
        menu: &mut menu,
        clock,
        repo,
    };
    let token = allocator
        .allocate_and_commit(rng, repo, &mut reassign)
        .await?;

    if let Some(reference) = stale_artifact {
        discard_artifact(artifacts, command.menu_id, &reference).await;
    }

    info!(
        correlation_id = %command.correlation_id,
        menu_id = %command.menu_id,
        previous = %previous_token,
        %token,
        "public token regenerated"
    );
    Ok(menu)
}

/// Handles `DeleteMenu`: removes the aggregate and its cached artifact.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the menu does not exist, or
/// the repository error.
pub async fn handle_delete_menu(
    command: &DeleteMenu,
    repo: &dyn MenuRepository,
    artifacts: &dyn ArtifactStore,
) -> Result<(), DomainError> {
    let menu = load_menu(repo, command.menu_id).await?;
    if !repo.delete(command.menu_id).await? {
        return Err(DomainError::AggregateNotFound(command.menu_id));
    }
    if let Some(reference) = menu.qr_artifact_ref() {
        discard_artifact(artifacts, command.menu_id, reference).await;
    }
    info!(
        correlation_id = %command.correlation_id,
        menu_id = %command.menu_id,
        "menu deleted"
    );
    Ok(())
}

/// Looks up a menu by public token and counts the view.
///
/// Only the view counter is written, so a lookup never rolls back a
/// concurrent edit or token regeneration.
///
/// # Errors
///
/// Returns `DomainError::TokenNotFound` if no menu holds the token.
pub async fn handle_view_public_menu(
    token: &str,
    clock: &dyn Clock,
    repo: &dyn MenuRepository,
) -> Result<Menu, DomainError> {
    let not_found = || DomainError::TokenNotFound(token.to_owned());
    let parsed = PublicToken::parse(token).map_err(|_| not_found())?;
    repo.record_view(&parsed, clock.now())
        .await?
        .ok_or_else(not_found)
}
