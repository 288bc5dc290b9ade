//! Domain layer for the QR context.

pub mod artifact_name;
pub mod commands;
pub mod options;
pub mod render;
