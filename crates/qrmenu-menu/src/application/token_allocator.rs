//! Collision-free allocation of public tokens.
//!
//! A candidate is drawn, checked against the token index, then handed to a
//! [`TokenCommit`] that persists it. The index check only saves a round trip:
//! the storage uniqueness constraint is authoritative, and a commit rejected
//! with `DomainError::TokenConflict` consumes an attempt and draws again.

use std::sync::Mutex;

use async_trait::async_trait;
use qrmenu_core::error::DomainError;
use qrmenu_core::rng::DeterministicRng;
use tracing::{debug, warn};

use crate::domain::repository::MenuRepository;
use crate::domain::token::PublicToken;

/// Attempts made before giving up with `AllocationExhausted`.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Persists an aggregate under a freshly drawn token.
#[async_trait]
pub trait TokenCommit: Send {
    /// Commits `token`. Must return `DomainError::TokenConflict` when the
    /// storage uniqueness constraint rejects it.
    async fn commit(&mut self, token: &PublicToken) -> Result<(), DomainError>;
}

/// Commit step that persists nothing.
struct CheckOnly;

#[async_trait]
impl TokenCommit for CheckOnly {
    async fn commit(&mut self, _token: &PublicToken) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Draws public tokens with bounded retry.
#[derive(Debug, Clone, Copy)]
pub struct TokenAllocator {
    max_attempts: u32,
}

impl Default for TokenAllocator {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }
}

impl TokenAllocator {
    /// Creates an allocator with a custom attempt bound (at least one).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// The attempt bound.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns a token that was free at the time of the check.
    ///
    /// Nothing is reserved, so callers that persist the token must go through
    /// [`TokenAllocator::allocate_and_commit`] to be safe against races.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AllocationExhausted` if every candidate was taken,
    /// or the repository error if the index lookup fails.
    pub async fn allocate(
        &self,
        rng: &Mutex<dyn DeterministicRng + Send>,
        repo: &dyn MenuRepository,
    ) -> Result<PublicToken, DomainError> {
        self.allocate_and_commit(rng, repo, &mut CheckOnly).await
    }

    /// Draws candidates until one passes the index check and `commit`
    /// accepts it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AllocationExhausted` when all attempts collide
    /// either in the index or at commit time. Any other error from the index
    /// or from `commit` aborts immediately.
    pub async fn allocate_and_commit(
        &self,
        rng: &Mutex<dyn DeterministicRng + Send>,
        repo: &dyn MenuRepository,
        commit: &mut dyn TokenCommit,
    ) -> Result<PublicToken, DomainError> {
        for attempt in 1..=self.max_attempts {
            let candidate = draw(rng)?;

            if repo.token_exists(&candidate).await? {
                debug!(attempt, token = %candidate, "public token collided in index");
                continue;
            }

            match commit.commit(&candidate).await {
                Ok(()) => {
                    debug!(attempt, token = %candidate, "public token allocated");
                    return Ok(candidate);
                }
                Err(DomainError::TokenConflict(token)) => {
                    warn!(attempt, %token, "public token rejected by uniqueness constraint");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}

/// The lock is held only for the synchronous draw.
fn draw(rng: &Mutex<dyn DeterministicRng + Send>) -> Result<PublicToken, DomainError> {
    let mut guard = rng
        .lock()
        .map_err(|_| DomainError::Infrastructure("rng mutex poisoned".into()))?;
    Ok(PublicToken::generate(&mut *guard))
}
