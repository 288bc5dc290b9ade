//! Application layer for the QR context.

pub mod command_handlers;
pub mod query_handlers;
