//! Artifact storage abstraction.
//!
//! Rendered QR images and uploaded logos live in a blob store addressed by
//! relative references such as `qr/menu-qr-AbC123xY-1700000000000.png`.

use async_trait::async_trait;

use crate::error::DomainError;

/// Storage for binary artifacts addressed by relative reference.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Reads the artifact at `reference`.
    ///
    /// Returns `Ok(None)` when nothing is stored under the reference.
    async fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Writes `bytes` under `reference`, replacing any previous content.
    async fn write(&self, reference: &str, bytes: &[u8]) -> Result<(), DomainError>;

    /// Deletes the artifact at `reference`. Deleting a missing artifact is
    /// not an error.
    async fn delete(&self, reference: &str) -> Result<(), DomainError>;
}

/// Returns `true` if `reference` is a safe relative path: non-empty, no
/// absolute prefix, no `..` or empty segments, no backslashes.
#[must_use]
pub fn is_safe_reference(reference: &str) -> bool {
    !reference.is_empty()
        && !reference.starts_with('/')
        && !reference.contains('\\')
        && reference
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
