//! Shared test doubles and utilities for the QR menu service.

mod artifacts;
mod clock;
mod repository;
mod rng;

pub use artifacts::{FailingArtifactStore, InMemoryArtifactStore};
pub use clock::{FixedClock, SteppingClock};
pub use repository::{FailingMenuRepository, InMemoryMenuRepository, StaleIndexMenuRepository};
pub use rng::{MockRng, SequenceRng};
