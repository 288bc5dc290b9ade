//! Field-level validation for menu edits.
//!
//! Validation runs before any snapshot is taken, so a rejected request never
//! touches the version history. All failures are collected, not just the
//! first.

use chrono::NaiveTime;
use qrmenu_core::error::{DomainError, ValidationErrors};

use super::content::{Category, MenuDetails, MenuItemDraft, ScheduleEntry, Theme};

pub const BUSINESS_NAME_MAX: usize = 100;
pub const TAGLINE_MAX: usize = 200;
pub const MENU_DESCRIPTION_MAX: usize = 1000;
pub const ITEM_NAME_MAX: usize = 100;
pub const ITEM_DESCRIPTION_MAX: usize = 500;
pub const CATEGORY_MAX: usize = 50;
pub const SPICE_LEVEL_MAX: u8 = 5;

/// Validates menu-level fields.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing every offending field.
pub fn validate_details(details: &MenuDetails) -> Result<(), DomainError> {
    let mut errors = ValidationErrors::new();

    required(&mut errors, "business_name", &details.business_name, BUSINESS_NAME_MAX);
    optional(&mut errors, "tagline", details.tagline.as_deref(), TAGLINE_MAX);
    optional(
        &mut errors,
        "description",
        details.description.as_deref(),
        MENU_DESCRIPTION_MAX,
    );
    if let Some(theme) = &details.theme {
        theme_colors(&mut errors, theme);
    }
    if let Some(schedule) = &details.schedule {
        schedule_entries(&mut errors, schedule);
    }
    if let Some(categories) = &details.categories {
        category_names(&mut errors, categories);
    }

    errors.into_result()
}

/// Validates an item draft.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing every offending field.
pub fn validate_item(draft: &MenuItemDraft) -> Result<(), DomainError> {
    let mut errors = ValidationErrors::new();

    required(&mut errors, "name", &draft.name, ITEM_NAME_MAX);
    optional(
        &mut errors,
        "description",
        draft.description.as_deref(),
        ITEM_DESCRIPTION_MAX,
    );
    if !draft.price.is_finite() || draft.price < 0.0 {
        errors.push("price", "must be a non-negative number");
    }
    required(&mut errors, "category", &draft.category, CATEGORY_MAX);
    if draft.spice_level > SPICE_LEVEL_MAX {
        errors.push(
            "spice_level",
            format!("must be between 0 and {SPICE_LEVEL_MAX}"),
        );
    }

    errors.into_result()
}

fn required(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(field, "is required");
    } else if len > max {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

fn optional(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.trim().chars().count() > max) {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

fn theme_colors(errors: &mut ValidationErrors, theme: &Theme) {
    for (field, value) in [
        ("theme.primary_color", &theme.primary_color),
        ("theme.secondary_color", &theme.secondary_color),
        ("theme.background_color", &theme.background_color),
        ("theme.text_color", &theme.text_color),
    ] {
        if !is_hex_color(value) {
            errors.push(field, "must be a #rrggbb colour");
        }
    }
}

fn schedule_entries(errors: &mut ValidationErrors, schedule: &[ScheduleEntry]) {
    for (i, entry) in schedule.iter().enumerate() {
        if NaiveTime::parse_from_str(&entry.open_time, "%H:%M").is_err() {
            errors.push(format!("schedule[{i}].open_time"), "must be HH:MM");
        }
        if NaiveTime::parse_from_str(&entry.close_time, "%H:%M").is_err() {
            errors.push(format!("schedule[{i}].close_time"), "must be HH:MM");
        }
    }
}

fn category_names(errors: &mut ValidationErrors, categories: &[Category]) {
    for (i, category) in categories.iter().enumerate() {
        if category.name.trim().is_empty() {
            errors.push(format!("categories[{i}].name"), "is required");
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::Weekday;

    fn draft() -> MenuItemDraft {
        MenuItemDraft {
            name: "Margherita".to_owned(),
            description: None,
            price: 9.5,
            category: "Pizza".to_owned(),
            image: None,
            is_available: true,
            allergens: vec![],
            spice_level: 0,
            is_vegan: false,
            is_vegetarian: true,
            order: None,
        }
    }

    fn fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(errors) => {
                errors.fields().iter().map(|f| f.field.clone()).collect()
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(validate_item(&draft()).is_ok());
    }

    #[test]
    fn test_item_collects_every_failure() {
        // Arrange
        let mut bad = draft();
        bad.name = "   ".to_owned();
        bad.price = -1.0;
        bad.category = String::new();
        bad.spice_level = 9;

        // Act
        let err = validate_item(&bad).unwrap_err();

        // Assert
        assert_eq!(fields(err), vec!["name", "price", "category", "spice_level"]);
    }

    #[test]
    fn test_item_rejects_non_finite_price() {
        let mut bad = draft();
        bad.price = f64::NAN;

        assert_eq!(fields(validate_item(&bad).unwrap_err()), vec!["price"]);
    }

    #[test]
    fn test_item_name_length_counts_characters_after_trim() {
        let mut ok = draft();
        ok.name = format!("  {}  ", "é".repeat(ITEM_NAME_MAX));
        assert!(validate_item(&ok).is_ok());

        let mut too_long = draft();
        too_long.name = "x".repeat(ITEM_NAME_MAX + 1);
        assert_eq!(fields(validate_item(&too_long).unwrap_err()), vec!["name"]);
    }

    #[test]
    fn test_details_require_business_name_and_bound_lengths() {
        let details = MenuDetails {
            business_name: String::new(),
            tagline: Some("t".repeat(TAGLINE_MAX + 1)),
            description: Some("d".repeat(MENU_DESCRIPTION_MAX + 1)),
            ..MenuDetails::default()
        };

        assert_eq!(
            fields(validate_details(&details).unwrap_err()),
            vec!["business_name", "tagline", "description"]
        );
    }

    #[test]
    fn test_details_validate_nested_theme_schedule_and_categories() {
        let details = MenuDetails {
            business_name: "Cafe".to_owned(),
            theme: Some(Theme {
                primary_color: "blue".to_owned(),
                ..Theme::default()
            }),
            schedule: Some(vec![ScheduleEntry {
                day: Weekday::Friday,
                is_open: true,
                open_time: "9am".to_owned(),
                close_time: "23:30".to_owned(),
            }]),
            categories: Some(vec![Category {
                name: " ".to_owned(),
                order: 0,
            }]),
            ..MenuDetails::default()
        };

        assert_eq!(
            fields(validate_details(&details).unwrap_err()),
            vec![
                "theme.primary_color",
                "schedule[0].open_time",
                "categories[0].name"
            ]
        );
    }
}
