//! Route modules, one per resource.

pub mod health;
pub mod menus;
pub mod qr;
