//! Test artifact stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::error::DomainError;

/// An artifact store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact, builder style.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_artifact(self, reference: &str, bytes: &[u8]) -> Self {
        self.blobs
            .lock()
            .unwrap()
            .insert(reference.to_owned(), bytes.to_vec());
        self
    }

    /// Returns `true` if something is stored under `reference`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn contains(&self, reference: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(reference)
    }

    /// All stored references, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn references(&self) -> Vec<String> {
        let mut refs: Vec<String> = self.blobs.lock().unwrap().keys().cloned().collect();
        refs.sort();
        refs
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.blobs.lock().unwrap().get(reference).cloned())
    }

    async fn write(&self, reference: &str, bytes: &[u8]) -> Result<(), DomainError> {
        self.blobs
            .lock()
            .unwrap()
            .insert(reference.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn delete(&self, reference: &str) -> Result<(), DomainError> {
        self.blobs.lock().unwrap().remove(reference);
        Ok(())
    }
}

/// An artifact store whose every operation fails.
#[derive(Debug)]
pub struct FailingArtifactStore;

#[async_trait]
impl ArtifactStore for FailingArtifactStore {
    async fn read(&self, _reference: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn write(&self, _reference: &str, _bytes: &[u8]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn delete(&self, _reference: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
