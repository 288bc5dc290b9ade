//! Test repositories: mock `MenuRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrmenu_core::error::DomainError;
use qrmenu_menu::domain::aggregates::Menu;
use qrmenu_menu::domain::repository::{ArtifactAttachment, MenuRepository};
use qrmenu_menu::domain::token::PublicToken;
use uuid::Uuid;

use crate::clock::FixedClock;

/// An in-memory repository that enforces `public_token` uniqueness on every
/// write, the way the storage-level unique constraint does.
#[derive(Debug, Default)]
pub struct InMemoryMenuRepository {
    menus: Mutex<HashMap<Uuid, Menu>>,
    conflicts: AtomicUsize,
    saves: AtomicUsize,
}

impl InMemoryMenuRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `menus`.
    ///
    /// # Panics
    ///
    /// Panics if two menus share a token.
    #[must_use]
    pub fn with_menus(menus: impl IntoIterator<Item = Menu>) -> Self {
        let repo = Self::new();
        for menu in menus {
            repo.write(&menu, false).expect("seed menus must have unique tokens");
        }
        repo
    }

    /// Returns the stored copy of a menu.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self, menu_id: Uuid) -> Option<Menu> {
        self.menus.lock().unwrap().get(&menu_id).cloned()
    }

    /// Number of writes rejected by the uniqueness check.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn write(&self, menu: &Menu, must_exist: bool) -> Result<(), DomainError> {
        let mut menus = self.menus.lock().unwrap();
        let menu = match menus.get(&menu.id) {
            // View counters are owned by `record_view`, as in storage.
            Some(existing) => {
                let mut record = menu.to_record();
                record.views = existing.views();
                record.last_viewed_at = existing.last_viewed_at();
                Menu::from_record(record)?
            }
            None if must_exist => return Err(DomainError::AggregateNotFound(menu.id)),
            None => menu.clone(),
        };
        let taken = menus
            .values()
            .any(|other| other.id != menu.id && other.public_token() == menu.public_token());
        if taken {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(DomainError::TokenConflict(menu.public_token().to_string()));
        }
        menus.insert(menu.id, menu);
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn load(&self, menu_id: Uuid) -> Result<Option<Menu>, DomainError> {
        Ok(self.stored(menu_id))
    }

    async fn find_by_token(&self, token: &PublicToken) -> Result<Option<Menu>, DomainError> {
        Ok(self
            .menus
            .lock()
            .unwrap()
            .values()
            .find(|m| m.public_token() == token)
            .cloned())
    }

    async fn token_exists(&self, token: &PublicToken) -> Result<bool, DomainError> {
        Ok(self
            .menus
            .lock()
            .unwrap()
            .values()
            .any(|m| m.public_token() == token))
    }

    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        Ok(self.menus.lock().unwrap().values().cloned().collect())
    }

    async fn insert(&self, menu: &Menu) -> Result<(), DomainError> {
        if self.menus.lock().unwrap().contains_key(&menu.id) {
            return Err(DomainError::Infrastructure(format!(
                "duplicate menu id {}",
                menu.id
            )));
        }
        self.write(menu, false)
    }

    async fn save(&self, menu: &Menu) -> Result<(), DomainError> {
        self.write(menu, true)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record_view(
        &self,
        token: &PublicToken,
        at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError> {
        let mut menus = self.menus.lock().unwrap();
        Ok(menus
            .values_mut()
            .find(|m| m.public_token() == token)
            .map(|menu| {
                menu.record_view(&FixedClock(at));
                menu.clone()
            }))
    }

    async fn attach_qr_artifact(
        &self,
        menu_id: Uuid,
        expected_token: &PublicToken,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError> {
        let mut menus = self.menus.lock().unwrap();
        Ok(match menus.get_mut(&menu_id) {
            Some(menu) if menu.public_token() == expected_token => ArtifactAttachment::Attached {
                replaced: menu.attach_qr_artifact(reference.to_owned(), &FixedClock(at)),
            },
            _ => ArtifactAttachment::Stale,
        })
    }

    async fn delete(&self, menu_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.menus.lock().unwrap().remove(&menu_id).is_some())
    }
}

/// A repository whose token index is always stale: `token_exists` reports
/// every token as free, so only the write-time uniqueness check stops
/// duplicates. Exercises the commit-conflict retry path.
#[derive(Debug, Default)]
pub struct StaleIndexMenuRepository {
    inner: InMemoryMenuRepository,
}

impl StaleIndexMenuRepository {
    /// Creates a repository pre-populated with `menus`.
    #[must_use]
    pub fn with_menus(menus: impl IntoIterator<Item = Menu>) -> Self {
        Self {
            inner: InMemoryMenuRepository::with_menus(menus),
        }
    }

    /// The backing store.
    #[must_use]
    pub fn inner(&self) -> &InMemoryMenuRepository {
        &self.inner
    }
}

#[async_trait]
impl MenuRepository for StaleIndexMenuRepository {
    async fn load(&self, menu_id: Uuid) -> Result<Option<Menu>, DomainError> {
        self.inner.load(menu_id).await
    }

    async fn find_by_token(&self, token: &PublicToken) -> Result<Option<Menu>, DomainError> {
        self.inner.find_by_token(token).await
    }

    async fn token_exists(&self, _token: &PublicToken) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        self.inner.list().await
    }

    async fn insert(&self, menu: &Menu) -> Result<(), DomainError> {
        self.inner.insert(menu).await
    }

    async fn save(&self, menu: &Menu) -> Result<(), DomainError> {
        self.inner.save(menu).await
    }

    async fn record_view(
        &self,
        token: &PublicToken,
        at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError> {
        self.inner.record_view(token, at).await
    }

    async fn attach_qr_artifact(
        &self,
        menu_id: Uuid,
        expected_token: &PublicToken,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError> {
        self.inner
            .attach_qr_artifact(menu_id, expected_token, reference, at)
            .await
    }

    async fn delete(&self, menu_id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete(menu_id).await
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingMenuRepository;

fn unavailable<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

#[async_trait]
impl MenuRepository for FailingMenuRepository {
    async fn load(&self, _menu_id: Uuid) -> Result<Option<Menu>, DomainError> {
        unavailable()
    }

    async fn find_by_token(&self, _token: &PublicToken) -> Result<Option<Menu>, DomainError> {
        unavailable()
    }

    async fn token_exists(&self, _token: &PublicToken) -> Result<bool, DomainError> {
        unavailable()
    }

    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        unavailable()
    }

    async fn insert(&self, _menu: &Menu) -> Result<(), DomainError> {
        unavailable()
    }

    async fn save(&self, _menu: &Menu) -> Result<(), DomainError> {
        unavailable()
    }

    async fn record_view(
        &self,
        _token: &PublicToken,
        _at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError> {
        unavailable()
    }

    async fn attach_qr_artifact(
        &self,
        _menu_id: Uuid,
        _expected_token: &PublicToken,
        _reference: &str,
        _at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError> {
        unavailable()
    }

    async fn delete(&self, _menu_id: Uuid) -> Result<bool, DomainError> {
        unavailable()
    }
}
