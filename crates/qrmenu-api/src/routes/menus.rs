//! Routes for menu management and public lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use qrmenu_menu::application::command_handlers;
use qrmenu_menu::application::query_handlers::{
    self, MenuSummary, MenuView, PublicMenuView, VersionListView,
};
use qrmenu_menu::domain::commands;
use qrmenu_menu::domain::content::{MenuDetails, MenuItemDraft};

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for PUT /{id}/items/reorder.
#[derive(Debug, Deserialize)]
pub struct ReorderItemsRequest {
    /// Item ids in their new display order. Unknown or malformed ids are
    /// ignored.
    pub item_ids: Vec<String>,
}

/// Response body for PUT /{id}/toggle-status.
#[derive(Debug, Serialize)]
pub struct ToggleStatusResponse {
    /// The open flag after the toggle.
    pub is_open: bool,
    /// The live version number after the toggle.
    pub current_version_number: i64,
}

/// GET /
#[instrument(skip(state))]
async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuSummary>>, ApiError> {
    let menus = query_handlers::list_menus(&*state.menu_repository).await?;
    Ok(Json(menus))
}

/// POST /
#[instrument(skip(state, details), fields(business_name = %details.business_name))]
async fn create_menu(
    State(state): State<AppState>,
    AppJson(details): AppJson<MenuDetails>,
) -> Result<(StatusCode, Json<MenuView>), ApiError> {
    let command = commands::CreateMenu {
        correlation_id: Uuid::new_v4(),
        menu_id: Uuid::new_v4(),
        details,
    };

    info!(correlation_id = %command.correlation_id, "handling create_menu command");

    let menu = command_handlers::handle_create_menu(
        &command,
        state.clock.as_ref(),
        &*state.rng,
        &state.token_allocator,
        &*state.menu_repository,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MenuView::from_menu(&menu, &state.public_base_url)),
    ))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<MenuView>, ApiError> {
    let view = query_handlers::get_menu_by_id(
        menu_id,
        &state.public_base_url,
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(view))
}

/// PUT /{id}
#[instrument(skip(state, details), fields(menu_id = %menu_id))]
async fn update_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    AppJson(details): AppJson<MenuDetails>,
) -> Result<Json<MenuView>, ApiError> {
    let command = commands::UpdateMenuDetails {
        correlation_id: Uuid::new_v4(),
        menu_id,
        details,
    };

    info!(correlation_id = %command.correlation_id, "handling update_menu_details command");

    let menu = command_handlers::handle_update_menu_details(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(MenuView::from_menu(&menu, &state.public_base_url)))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteMenu {
        correlation_id: Uuid::new_v4(),
        menu_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_menu command");

    command_handlers::handle_delete_menu(
        &command,
        &*state.menu_repository,
        &*state.artifact_store,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{id}/items
#[instrument(skip(state, draft), fields(menu_id = %menu_id))]
async fn add_item(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    AppJson(draft): AppJson<MenuItemDraft>,
) -> Result<(StatusCode, Json<MenuView>), ApiError> {
    let command = commands::AddMenuItem {
        correlation_id: Uuid::new_v4(),
        menu_id,
        item_id: Uuid::new_v4(),
        draft,
    };

    info!(correlation_id = %command.correlation_id, "handling add_menu_item command");

    let menu = command_handlers::handle_add_menu_item(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(MenuView::from_menu(&menu, &state.public_base_url)),
    ))
}

/// PUT /{id}/items/{item_id}
#[instrument(skip(state, draft), fields(menu_id = %menu_id, item_id = %item_id))]
async fn update_item(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(Uuid, Uuid)>,
    AppJson(draft): AppJson<MenuItemDraft>,
) -> Result<Json<MenuView>, ApiError> {
    let command = commands::UpdateMenuItem {
        correlation_id: Uuid::new_v4(),
        menu_id,
        item_id,
        draft,
    };

    info!(correlation_id = %command.correlation_id, "handling update_menu_item command");

    let menu = command_handlers::handle_update_menu_item(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(MenuView::from_menu(&menu, &state.public_base_url)))
}

/// DELETE /{id}/items/{item_id}
#[instrument(skip(state), fields(menu_id = %menu_id, item_id = %item_id))]
async fn delete_item(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MenuView>, ApiError> {
    let command = commands::DeleteMenuItem {
        correlation_id: Uuid::new_v4(),
        menu_id,
        item_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_menu_item command");

    let menu = command_handlers::handle_delete_menu_item(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(MenuView::from_menu(&menu, &state.public_base_url)))
}

/// PUT /{id}/items/reorder
#[instrument(skip(state, request), fields(menu_id = %menu_id, count = request.item_ids.len()))]
async fn reorder_items(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    AppJson(request): AppJson<ReorderItemsRequest>,
) -> Result<Json<MenuView>, ApiError> {
    // Malformed ids become the nil id, which matches no item.
    let item_ids = request
        .item_ids
        .iter()
        .map(|raw| Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::nil()))
        .collect();
    let command = commands::ReorderMenuItems {
        correlation_id: Uuid::new_v4(),
        menu_id,
        item_ids,
    };

    info!(correlation_id = %command.correlation_id, "handling reorder_menu_items command");

    let menu = command_handlers::handle_reorder_menu_items(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(MenuView::from_menu(&menu, &state.public_base_url)))
}

/// PUT /{id}/toggle-status
#[instrument(skip(state))]
async fn toggle_status(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<ToggleStatusResponse>, ApiError> {
    let command = commands::ToggleOpenStatus {
        correlation_id: Uuid::new_v4(),
        menu_id,
    };

    info!(correlation_id = %command.correlation_id, "handling toggle_open_status command");

    let menu = command_handlers::handle_toggle_open_status(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(ToggleStatusResponse {
        is_open: menu.content().is_open,
        current_version_number: menu.current_version_number(),
    }))
}

/// GET /{id}/versions
#[instrument(skip(state))]
async fn list_versions(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<VersionListView>, ApiError> {
    let versions = query_handlers::list_versions(menu_id, &*state.menu_repository).await?;
    Ok(Json(versions))
}

/// POST /{id}/restore/{version}
#[instrument(skip(state))]
async fn restore_version(
    State(state): State<AppState>,
    Path((menu_id, version_number)): Path<(Uuid, i64)>,
) -> Result<Json<MenuView>, ApiError> {
    let command = commands::RestoreVersion {
        correlation_id: Uuid::new_v4(),
        menu_id,
        version_number,
    };

    info!(correlation_id = %command.correlation_id, "handling restore_version command");

    let menu = command_handlers::handle_restore_version(
        &command,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(MenuView::from_menu(&menu, &state.public_base_url)))
}

/// GET /public/{token}
#[instrument(skip(state))]
async fn view_public_menu(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicMenuView>, ApiError> {
    let menu = command_handlers::handle_view_public_menu(
        &token,
        state.clock.as_ref(),
        &*state.menu_repository,
    )
    .await?;
    Ok(Json(PublicMenuView::from(&menu)))
}

/// Returns the router for menu management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menus).post(create_menu))
        .route("/public/{token}", get(view_public_menu))
        .route("/{id}", get(get_menu).put(update_menu).delete(delete_menu))
        .route("/{id}/items", post(add_item))
        .route("/{id}/items/reorder", put(reorder_items))
        .route("/{id}/items/{item_id}", put(update_item).delete(delete_item))
        .route("/{id}/toggle-status", put(toggle_status))
        .route("/{id}/versions", get(list_versions))
        .route("/{id}/restore/{version}", post(restore_version))
}
