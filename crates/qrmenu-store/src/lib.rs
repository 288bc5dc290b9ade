//! Infrastructure adapters for the QR menu service.
//!
//! - [`pg_menu_repository::PgMenuRepository`] stores menu documents in
//!   PostgreSQL, with a unique constraint on the public token.
//! - [`fs_artifact_store::FsArtifactStore`] keeps rendered codes and uploaded
//!   images under a directory on disk.

use sqlx::migrate::Migrator;

pub mod fs_artifact_store;
pub mod pg_menu_repository;

/// Schema migrations, applied at startup.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
