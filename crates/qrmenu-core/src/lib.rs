//! QR Menu Core - shared domain abstractions.
//!
//! This crate defines the traits and error types every bounded context of
//! the menu service depends on. It contains no infrastructure code.

pub mod artifact;
pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
