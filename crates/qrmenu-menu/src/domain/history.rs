//! Bounded snapshot history embedded in each menu aggregate.
//!
//! Every content mutation first calls [`VersionHistory::snapshot`] with the
//! content as it stood before the change. The snapshot is tagged with the
//! current version number, after which the number advances by one. Only the
//! [`RETENTION_WINDOW`] most recent snapshots are kept; older ones are
//! evicted first-in first-out and can no longer be restored.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use qrmenu_core::error::DomainError;
use serde::{Deserialize, Serialize};

use super::content::MenuContent;

/// Maximum number of snapshots retained per menu.
pub const RETENTION_WINDOW: usize = 10;

/// Version number a freshly created menu starts at.
pub const INITIAL_VERSION_NUMBER: i64 = 1;

/// A preserved copy of menu content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// The version number of the preserved state.
    pub version_number: i64,
    /// Content exactly as it was before the triggering mutation.
    pub snapshot_data: MenuContent,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
    /// Label of the triggering operation.
    pub description: String,
}

/// Capacity-bounded, ordered snapshot history of one menu.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistory {
    current_version_number: i64,
    entries: VecDeque<Version>,
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionHistory {
    /// Creates an empty history at version 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_version_number: INITIAL_VERSION_NUMBER,
            entries: VecDeque::with_capacity(RETENTION_WINDOW),
        }
    }

    /// Rebuilds a history from persisted parts.
    ///
    /// Entries beyond the retention window are dropped oldest-first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the persisted entries are not
    /// strictly increasing or are not below `current_version_number`.
    pub fn from_parts(
        current_version_number: i64,
        entries: Vec<Version>,
    ) -> Result<Self, DomainError> {
        if current_version_number < INITIAL_VERSION_NUMBER {
            return Err(DomainError::Infrastructure(format!(
                "corrupt version history: current version {current_version_number} below {INITIAL_VERSION_NUMBER}"
            )));
        }

        let mut previous: Option<i64> = None;
        for entry in &entries {
            if previous.is_some_and(|p| entry.version_number <= p)
                || entry.version_number >= current_version_number
            {
                return Err(DomainError::Infrastructure(format!(
                    "corrupt version history: entry {} out of order (current {current_version_number})",
                    entry.version_number
                )));
            }
            previous = Some(entry.version_number);
        }

        let mut entries = VecDeque::from(entries);
        while entries.len() > RETENTION_WINDOW {
            entries.pop_front();
        }

        Ok(Self {
            current_version_number,
            entries,
        })
    }

    /// The version number of the live content.
    #[must_use]
    pub fn current_version_number(&self) -> i64 {
        self.current_version_number
    }

    /// Retained snapshots, oldest first.
    pub fn versions(&self) -> impl ExactSizeIterator<Item = &Version> {
        self.entries.iter()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no snapshot has been taken yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Preserves a copy of `content` under the current version number, then
    /// advances the version number. Evicts the oldest snapshot when the
    /// window is full.
    pub fn snapshot(
        &mut self,
        content: &MenuContent,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) {
        if self.entries.len() == RETENTION_WINDOW {
            self.entries.pop_front();
        }
        self.entries.push_back(Version {
            version_number: self.current_version_number,
            snapshot_data: content.clone(),
            created_at,
            description: description.into(),
        });
        self.current_version_number += 1;
    }

    /// Returns a copy of the content preserved under `version_number`.
    ///
    /// Does not touch the version counter.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::VersionNotFound` if no retained snapshot carries
    /// exactly that number, including numbers that have been evicted.
    pub fn restore(&self, version_number: i64) -> Result<MenuContent, DomainError> {
        self.entries
            .iter()
            .find(|v| v.version_number == version_number)
            .map(|v| v.snapshot_data.clone())
            .ok_or(DomainError::VersionNotFound { version_number })
    }
}
