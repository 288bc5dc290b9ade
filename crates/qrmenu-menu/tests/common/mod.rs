//! Shared fixtures for Menu context integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use qrmenu_menu::domain::aggregates::Menu;
use qrmenu_menu::domain::content::{MenuDetails, MenuItemDraft};
use qrmenu_menu::domain::token::PublicToken;
use qrmenu_test_support::FixedClock;
use uuid::Uuid;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(fixed_now())
}

pub fn details(business_name: &str) -> MenuDetails {
    MenuDetails {
        business_name: business_name.to_owned(),
        tagline: Some("Fresh every day".to_owned()),
        ..MenuDetails::default()
    }
}

pub fn draft(name: &str, price: f64) -> MenuItemDraft {
    MenuItemDraft {
        name: name.to_owned(),
        description: None,
        price,
        category: "Mains".to_owned(),
        image: None,
        is_available: true,
        allergens: Vec::new(),
        spice_level: 0,
        is_vegan: false,
        is_vegetarian: false,
        order: None,
    }
}

/// A freshly created menu holding `token`.
pub fn menu_with_token(token: &str) -> Menu {
    Menu::create(
        Uuid::new_v4(),
        PublicToken::parse(token).unwrap(),
        &details("Corner Bistro"),
        &fixed_clock(),
    )
    .unwrap()
}
