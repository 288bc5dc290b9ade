//! Commands for the Menu context.

use qrmenu_core::command::Command;
use uuid::Uuid;

use super::content::{MenuDetails, MenuItemDraft};

/// Command to create a menu and allocate its public token.
#[derive(Debug, Clone)]
pub struct CreateMenu {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The identifier the new menu will carry.
    pub menu_id: Uuid,
    /// Initial menu-level fields.
    pub details: MenuDetails,
}

impl Command for CreateMenu {
    fn command_type(&self) -> &'static str {
        "menu.create_menu"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to edit menu-level fields.
#[derive(Debug, Clone)]
pub struct UpdateMenuDetails {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to edit.
    pub menu_id: Uuid,
    /// Replacement fields.
    pub details: MenuDetails,
}

impl Command for UpdateMenuDetails {
    fn command_type(&self) -> &'static str {
        "menu.update_details"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to add an item to a menu.
#[derive(Debug, Clone)]
pub struct AddMenuItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to add to.
    pub menu_id: Uuid,
    /// Identifier for the new item.
    pub item_id: Uuid,
    /// Item fields.
    pub draft: MenuItemDraft,
}

impl Command for AddMenuItem {
    fn command_type(&self) -> &'static str {
        "menu.add_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to edit an existing item.
#[derive(Debug, Clone)]
pub struct UpdateMenuItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu holding the item.
    pub menu_id: Uuid,
    /// The item to edit.
    pub item_id: Uuid,
    /// Replacement item fields.
    pub draft: MenuItemDraft,
}

impl Command for UpdateMenuItem {
    fn command_type(&self) -> &'static str {
        "menu.update_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove an item.
#[derive(Debug, Clone)]
pub struct DeleteMenuItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu holding the item.
    pub menu_id: Uuid,
    /// The item to remove.
    pub item_id: Uuid,
}

impl Command for DeleteMenuItem {
    fn command_type(&self) -> &'static str {
        "menu.delete_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to reorder items by position in `item_ids`.
#[derive(Debug, Clone)]
pub struct ReorderMenuItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to reorder.
    pub menu_id: Uuid,
    /// Item identifiers in their new display order.
    pub item_ids: Vec<Uuid>,
}

impl Command for ReorderMenuItems {
    fn command_type(&self) -> &'static str {
        "menu.reorder_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to flip the open/closed flag.
#[derive(Debug, Clone)]
pub struct ToggleOpenStatus {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to toggle.
    pub menu_id: Uuid,
}

impl Command for ToggleOpenStatus {
    fn command_type(&self) -> &'static str {
        "menu.toggle_open_status"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to restore content from a retained snapshot.
#[derive(Debug, Clone)]
pub struct RestoreVersion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to restore.
    pub menu_id: Uuid,
    /// The snapshot to restore.
    pub version_number: i64,
}

impl Command for RestoreVersion {
    fn command_type(&self) -> &'static str {
        "menu.restore_version"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace a menu's public token.
#[derive(Debug, Clone)]
pub struct RegenerateIdentity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu whose token is replaced.
    pub menu_id: Uuid,
}

impl Command for RegenerateIdentity {
    fn command_type(&self) -> &'static str {
        "menu.regenerate_identity"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a menu and release its token.
#[derive(Debug, Clone)]
pub struct DeleteMenu {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu to delete.
    pub menu_id: Uuid,
}

impl Command for DeleteMenu {
    fn command_type(&self) -> &'static str {
        "menu.delete_menu"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
