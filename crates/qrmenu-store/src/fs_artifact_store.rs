//! Filesystem implementation of the `ArtifactStore` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use qrmenu_core::artifact::{ArtifactStore, is_safe_reference};
use qrmenu_core::error::DomainError;
use tokio::fs;
use tracing::debug;

/// Stores artifacts as files under a root directory. References are paths
/// relative to the root.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, DomainError> {
        if !is_safe_reference(reference) {
            return Err(DomainError::invalid_field(
                "reference",
                format!("{reference:?} is not a relative artifact path"),
            ));
        }
        Ok(self.root.join(reference))
    }
}

fn io_error(action: &str, reference: &str, error: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("failed to {action} artifact {reference}: {error}"))
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let path = self.resolve(reference)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", reference, &e)),
        }
    }

    /// Writes to a `.partial` sibling first and renames it into place, so
    /// readers never observe a half-written file.
    async fn write(&self, reference: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.resolve(reference)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", reference, &e))?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        if let Err(e) = fs::write(&partial, bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(io_error("write", reference, &e));
        }
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(io_error("move", reference, &e));
        }
        debug!(reference, bytes = bytes.len(), "artifact written");
        Ok(())
    }

    async fn delete(&self, reference: &str) -> Result<(), DomainError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", reference, &e)),
        }
    }
}
