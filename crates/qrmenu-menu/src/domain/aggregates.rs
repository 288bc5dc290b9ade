//! Aggregate root for the Menu context.

use chrono::{DateTime, Utc};
use qrmenu_core::clock::Clock;
use qrmenu_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{MenuContent, MenuDetails, MenuItem, MenuItemDraft, normalize_optional};
use super::history::{Version, VersionHistory};
use super::token::PublicToken;
use super::validation::{validate_details, validate_item};

pub const DETAILS_UPDATED_LABEL: &str = "Updated menu details";
pub const ITEM_ADDED_LABEL: &str = "Added new menu item";
pub const ITEM_UPDATED_LABEL: &str = "Updated menu item";
pub const ITEM_DELETED_LABEL: &str = "Deleted menu item";
pub const ITEMS_REORDERED_LABEL: &str = "Reordered menu items";
pub const OPEN_STATUS_TOGGLED_LABEL: &str = "Toggled open status";

/// Persisted shape of a menu aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub public_token: PublicToken,
    pub current_version_number: i64,
    pub history: Vec<Version>,
    pub content: MenuContent,
    pub qr_artifact_ref: Option<String>,
    pub views: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The aggregate root for a menu.
///
/// Every content mutation validates its input, snapshots the current
/// content into the embedded history, then applies the change.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    /// Aggregate identifier.
    pub id: Uuid,
    public_token: PublicToken,
    content: MenuContent,
    history: VersionHistory,
    qr_artifact_ref: Option<String>,
    views: i64,
    last_viewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Menu {
    /// Creates a menu at version 1 with an empty history.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `details` fail validation.
    pub fn create(
        id: Uuid,
        public_token: PublicToken,
        details: &MenuDetails,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        validate_details(details)?;
        let now = clock.now();
        let content = MenuContent {
            business_name: details.business_name.trim().to_owned(),
            tagline: normalize_optional(details.tagline.as_deref()),
            description: normalize_optional(details.description.as_deref()),
            logo: normalize_optional(details.logo.as_deref()),
            items: Vec::new(),
            categories: details.categories.clone().unwrap_or_default(),
            theme: details.theme.clone().unwrap_or_default(),
            schedule: details.schedule.clone().unwrap_or_default(),
            is_open: true,
        };
        Ok(Self {
            id,
            public_token,
            content,
            history: VersionHistory::new(),
            qr_artifact_ref: None,
            views: 0,
            last_viewed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a menu from its persisted record.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the stored history is corrupt.
    pub fn from_record(record: MenuRecord) -> Result<Self, DomainError> {
        let history = VersionHistory::from_parts(record.current_version_number, record.history)?;
        Ok(Self {
            id: record.id,
            public_token: record.public_token,
            content: record.content,
            history,
            qr_artifact_ref: record.qr_artifact_ref,
            views: record.views,
            last_viewed_at: record.last_viewed_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Returns the persisted shape of this menu.
    #[must_use]
    pub fn to_record(&self) -> MenuRecord {
        MenuRecord {
            id: self.id,
            public_token: self.public_token.clone(),
            current_version_number: self.history.current_version_number(),
            history: self.history.versions().cloned().collect(),
            content: self.content.clone(),
            qr_artifact_ref: self.qr_artifact_ref.clone(),
            views: self.views,
            last_viewed_at: self.last_viewed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    #[must_use]
    pub fn public_token(&self) -> &PublicToken {
        &self.public_token
    }

    #[must_use]
    pub fn content(&self) -> &MenuContent {
        &self.content
    }

    #[must_use]
    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    #[must_use]
    pub fn current_version_number(&self) -> i64 {
        self.history.current_version_number()
    }

    #[must_use]
    pub fn qr_artifact_ref(&self) -> Option<&str> {
        self.qr_artifact_ref.as_deref()
    }

    #[must_use]
    pub fn views(&self) -> i64 {
        self.views
    }

    #[must_use]
    pub fn last_viewed_at(&self) -> Option<DateTime<Utc>> {
        self.last_viewed_at
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The URL a QR code for this menu encodes.
    #[must_use]
    pub fn public_url(&self, base_url: &str) -> String {
        format!("{}/menu/{}", base_url.trim_end_matches('/'), self.public_token)
    }

    /// Snapshots the current content under `label`, then applies `change`.
    fn apply_change<R>(
        &mut self,
        label: &str,
        clock: &dyn Clock,
        change: impl FnOnce(&mut MenuContent, DateTime<Utc>) -> R,
    ) -> R {
        let now = clock.now();
        self.history.snapshot(&self.content, label, now);
        let result = change(&mut self.content, now);
        self.updated_at = now;
        result
    }

    /// Replaces menu-level fields. `None` fields are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `details` fail validation.
    pub fn update_details(
        &mut self,
        details: &MenuDetails,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        validate_details(details)?;
        self.apply_change(DETAILS_UPDATED_LABEL, clock, |content, _| {
            content.business_name = details.business_name.trim().to_owned();
            if let Some(tagline) = &details.tagline {
                content.tagline = normalize_optional(Some(tagline));
            }
            if let Some(description) = &details.description {
                content.description = normalize_optional(Some(description));
            }
            if let Some(logo) = &details.logo {
                content.logo = normalize_optional(Some(logo));
            }
            if let Some(theme) = &details.theme {
                content.theme = theme.clone();
            }
            if let Some(schedule) = &details.schedule {
                content.schedule = schedule.clone();
            }
            if let Some(categories) = &details.categories {
                content.categories = categories.clone();
            }
        });
        Ok(())
    }

    /// Adds an item. Without an explicit order it goes to the end.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft is invalid or the id is
    /// already taken.
    pub fn add_item(
        &mut self,
        item_id: Uuid,
        draft: &MenuItemDraft,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        validate_item(draft)?;
        if self.content.item(item_id).is_some() {
            return Err(DomainError::invalid_field(
                "id",
                format!("item {item_id} already exists"),
            ));
        }
        self.apply_change(ITEM_ADDED_LABEL, clock, |content, now| {
            let order = draft.order.unwrap_or(content.items.len());
            content.items.push(build_item(item_id, draft, order, now, now));
        });
        Ok(())
    }

    /// Replaces an existing item's fields, keeping its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft is invalid and
    /// `DomainError::MenuItemNotFound` if the item does not exist.
    pub fn update_item(
        &mut self,
        item_id: Uuid,
        draft: &MenuItemDraft,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        validate_item(draft)?;
        let existing = self.content.item(item_id).ok_or(DomainError::MenuItemNotFound {
            menu_id: self.id,
            item_id,
        })?;
        let order = draft.order.unwrap_or(existing.order);
        let created_at = existing.created_at;
        self.apply_change(ITEM_UPDATED_LABEL, clock, |content, now| {
            if let Some(item) = content.item_mut(item_id) {
                *item = build_item(item_id, draft, order, created_at, now);
            }
        });
        Ok(())
    }

    /// Removes an item.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MenuItemNotFound` if the item does not exist.
    pub fn delete_item(&mut self, item_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.content.item(item_id).is_none() {
            return Err(DomainError::MenuItemNotFound {
                menu_id: self.id,
                item_id,
            });
        }
        self.apply_change(ITEM_DELETED_LABEL, clock, |content, _| {
            content.items.retain(|item| item.id != item_id);
        });
        Ok(())
    }

    /// Sets each named item's order to its position in `ordered_ids`.
    ///
    /// Items not named keep their order; unknown ids are ignored.
    pub fn reorder_items(&mut self, ordered_ids: &[Uuid], clock: &dyn Clock) {
        self.apply_change(ITEMS_REORDERED_LABEL, clock, |content, now| {
            for (index, item_id) in ordered_ids.iter().enumerate() {
                if let Some(item) = content.item_mut(*item_id) {
                    item.order = index;
                    item.updated_at = now;
                }
            }
        });
    }

    /// Flips the open/closed flag and returns the new value.
    pub fn toggle_open_status(&mut self, clock: &dyn Clock) -> bool {
        self.apply_change(OPEN_STATUS_TOGGLED_LABEL, clock, |content, _| {
            content.is_open = !content.is_open;
            content.is_open
        })
    }

    /// Replaces the content with the snapshot stored under `version_number`.
    ///
    /// The pre-restore content is itself snapshotted, so version numbers keep
    /// climbing and the restore can be undone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::VersionNotFound` if the version is not retained;
    /// the menu is left untouched.
    pub fn restore_version(
        &mut self,
        version_number: i64,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let restored = self.history.restore(version_number)?;
        let label = format!("Restored version {version_number}");
        self.apply_change(&label, clock, |content, _| *content = restored);
        Ok(())
    }

    /// Replaces the public token and invalidates the cached QR artifact.
    ///
    /// Returns the reference of the artifact that was invalidated, if any.
    pub fn assign_public_token(&mut self, token: PublicToken, clock: &dyn Clock) -> Option<String> {
        self.public_token = token;
        self.updated_at = clock.now();
        self.qr_artifact_ref.take()
    }

    /// Records a newly cached QR artifact and returns the one it replaces.
    pub fn attach_qr_artifact(&mut self, reference: String, clock: &dyn Clock) -> Option<String> {
        self.updated_at = clock.now();
        self.qr_artifact_ref.replace(reference)
    }

    /// Counts a public view.
    pub fn record_view(&mut self, clock: &dyn Clock) {
        self.views += 1;
        self.last_viewed_at = Some(clock.now());
    }
}

fn build_item(
    id: Uuid,
    draft: &MenuItemDraft,
    order: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> MenuItem {
    MenuItem {
        id,
        name: draft.name.trim().to_owned(),
        description: normalize_optional(draft.description.as_deref()),
        price: draft.price,
        category: draft.category.trim().to_owned(),
        image: normalize_optional(draft.image.as_deref()),
        is_available: draft.is_available,
        allergens: draft.allergens.clone(),
        spice_level: draft.spice_level,
        is_vegan: draft.is_vegan,
        is_vegetarian: draft.is_vegetarian,
        order,
        created_at,
        updated_at,
    }
}
