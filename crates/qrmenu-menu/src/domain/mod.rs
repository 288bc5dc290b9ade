//! Domain model for the Menu context.

pub mod aggregates;
pub mod commands;
pub mod content;
pub mod history;
pub mod repository;
pub mod token;
pub mod validation;
