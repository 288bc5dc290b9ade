//! The versioned business payload of a menu.
//!
//! Everything in [`MenuContent`] is captured by a snapshot before each
//! mutation and replaced wholesale on restore. Identity, token, view counters
//! and the cached QR reference live on the aggregate instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The editable content of a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuContent {
    /// Display name of the business.
    pub business_name: String,
    /// Short strapline under the name.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Longer free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Reference to an uploaded logo image.
    #[serde(default)]
    pub logo: Option<String>,
    /// Menu items.
    #[serde(default)]
    pub items: Vec<MenuItem>,
    /// Item categories in display order.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Visual theme.
    #[serde(default)]
    pub theme: Theme,
    /// Weekly opening hours.
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    /// Whether the business is currently taking orders.
    #[serde(default = "default_true")]
    pub is_open: bool,
}

impl MenuContent {
    /// Looks up an item by id.
    #[must_use]
    pub fn item(&self, item_id: Uuid) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub(crate) fn item_mut(&mut self, item_id: Uuid) -> Option<&mut MenuItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

/// A single dish or drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item identifier, unique within the menu.
    pub id: Uuid,
    /// Item name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Non-negative price.
    pub price: f64,
    /// Category name.
    pub category: String,
    /// Reference to an uploaded item photo.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the item can currently be ordered.
    pub is_available: bool,
    /// Declared allergens.
    #[serde(default)]
    pub allergens: Vec<Allergen>,
    /// Heat level, 0 to 5.
    #[serde(default)]
    pub spice_level: u8,
    /// Vegan flag.
    #[serde(default)]
    pub is_vegan: bool,
    /// Vegetarian flag.
    #[serde(default)]
    pub is_vegetarian: bool,
    /// Display position.
    #[serde(default)]
    pub order: usize,
    /// When the item was added.
    pub created_at: DateTime<Utc>,
    /// When the item was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Allergens a menu item can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allergen {
    Gluten,
    Dairy,
    Nuts,
    Soy,
    Eggs,
    Shellfish,
    Fish,
    Sesame,
}

/// A named category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name.
    pub name: String,
    /// Display position.
    #[serde(default)]
    pub order: usize,
}

/// Colours and typography of the public menu page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_owned(),
            secondary_color: "#64748b".to_owned(),
            background_color: "#ffffff".to_owned(),
            text_color: "#1f2937".to_owned(),
            font_family: "Inter, sans-serif".to_owned(),
        }
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Opening hours for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// The day this entry applies to.
    pub day: Weekday,
    /// Whether the business opens at all that day.
    #[serde(default = "default_true")]
    pub is_open: bool,
    /// Opening time, `HH:MM`.
    #[serde(default = "default_open_time")]
    pub open_time: String,
    /// Closing time, `HH:MM`.
    #[serde(default = "default_close_time")]
    pub close_time: String,
}

/// Menu-level fields supplied on create and on metadata edits.
///
/// On edits, `None` leaves the current value untouched and an empty string
/// clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuDetails {
    /// Display name of the business.
    pub business_name: String,
    /// Short strapline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Uploaded logo reference.
    #[serde(default)]
    pub logo: Option<String>,
    /// Replacement theme.
    #[serde(default)]
    pub theme: Option<Theme>,
    /// Replacement schedule.
    #[serde(default)]
    pub schedule: Option<Vec<ScheduleEntry>>,
    /// Replacement category list.
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

/// Item fields supplied when adding or editing an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemDraft {
    /// Item name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Price.
    pub price: f64,
    /// Category name.
    pub category: String,
    /// Uploaded photo reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the item can be ordered.
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Declared allergens.
    #[serde(default)]
    pub allergens: Vec<Allergen>,
    /// Heat level, 0 to 5.
    #[serde(default)]
    pub spice_level: u8,
    /// Vegan flag.
    #[serde(default)]
    pub is_vegan: bool,
    /// Vegetarian flag.
    #[serde(default)]
    pub is_vegetarian: bool,
    /// Explicit display position. Defaults to the end of the list on add and
    /// to the current position on edit.
    #[serde(default)]
    pub order: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_open_time() -> String {
    "09:00".to_owned()
}

fn default_close_time() -> String {
    "17:00".to_owned()
}

/// Trims `value` and maps blank strings to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_deserializes_with_defaults() {
        let content: MenuContent =
            serde_json::from_value(serde_json::json!({ "business_name": "Cafe" })).unwrap();

        assert_eq!(content.business_name, "Cafe");
        assert!(content.items.is_empty());
        assert!(content.is_open);
        assert_eq!(content.theme, Theme::default());
    }

    #[test]
    fn test_schedule_entry_defaults_hours() {
        let entry: ScheduleEntry =
            serde_json::from_value(serde_json::json!({ "day": "monday" })).unwrap();

        assert_eq!(entry.day, Weekday::Monday);
        assert!(entry.is_open);
        assert_eq!(entry.open_time, "09:00");
        assert_eq!(entry.close_time, "17:00");
    }

    #[test]
    fn test_unknown_allergen_is_rejected() {
        let result: Result<Allergen, _> = serde_json::from_value(serde_json::json!("peanut"));

        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_optional_clears_blank_strings() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some(" Fresh ")), Some("Fresh".to_owned()));
        assert_eq!(normalize_optional(None), None);
    }
}
