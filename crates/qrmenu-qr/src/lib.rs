//! QR Menu - QR artifact bounded context.
//!
//! Renders a menu's public URL as a PNG or SVG QR code, optionally with the
//! business logo composited in the centre, and caches saved renders in the
//! artifact store.

pub mod application;
pub mod domain;
