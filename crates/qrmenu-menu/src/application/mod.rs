//! Application services for the Menu context.

pub mod command_handlers;
pub mod query_handlers;
pub mod token_allocator;
