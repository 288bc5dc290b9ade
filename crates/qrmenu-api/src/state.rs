//! Shared application state.

use std::fmt;
use std::sync::{Arc, Mutex};

use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::clock::Clock;
use qrmenu_core::rng::DeterministicRng;
use qrmenu_menu::application::token_allocator::TokenAllocator;
use qrmenu_menu::domain::repository::MenuRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Time source for snapshots, views and artifact names.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Token randomness. Locked only for the synchronous draw.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Menu persistence.
    pub menu_repository: Arc<dyn MenuRepository>,
    /// Rendered codes and uploaded images.
    pub artifact_store: Arc<dyn ArtifactStore>,
    /// Bounded-retry token allocation policy.
    pub token_allocator: TokenAllocator,
    /// Prefix of public menu URLs.
    pub public_base_url: Arc<str>,
}

impl AppState {
    /// Create new application state with the default allocation policy.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        menu_repository: Arc<dyn MenuRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        public_base_url: &str,
    ) -> Self {
        Self {
            clock,
            rng,
            menu_repository,
            artifact_store,
            token_allocator: TokenAllocator::default(),
            public_base_url: Arc::from(public_base_url),
        }
    }

    /// Replaces the token allocation policy.
    #[must_use]
    pub fn with_token_allocator(mut self, token_allocator: TokenAllocator) -> Self {
        self.token_allocator = token_allocator;
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("token_allocator", &self.token_allocator)
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}
