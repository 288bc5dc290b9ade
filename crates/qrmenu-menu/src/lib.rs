//! QR Menu - Menu bounded context.
//!
//! Owns the menu aggregate: its editable content, the bounded snapshot
//! history taken before every content mutation, and the short public token
//! the menu is shared under.

pub mod application;
pub mod domain;
