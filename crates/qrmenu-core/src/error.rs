//! Domain error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `items.price`.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Every field-level failure found while validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` when no failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded failures, in discovery order.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` when empty, otherwise `DomainError::Validation`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` carrying every recorded failure.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A menu aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// An item referenced by a command does not exist on the menu.
    #[error("menu item {item_id} not found in menu {menu_id}")]
    MenuItemNotFound {
        /// The menu that was searched.
        menu_id: Uuid,
        /// The missing item.
        item_id: Uuid,
    },

    /// No menu is published under the given public token.
    #[error("no menu for public token {0}")]
    TokenNotFound(String),

    /// The menu has no cached QR artifact, or its file is gone.
    #[error("no cached QR artifact for menu {0}")]
    ArtifactNotFound(Uuid),

    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The requested version is not in the retained history window.
    #[error("version {version_number} not found")]
    VersionNotFound {
        /// The version number that was requested.
        version_number: i64,
    },

    /// Every token allocation attempt collided.
    #[error("public token allocation exhausted after {attempts} attempts")]
    AllocationExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The storage-level uniqueness constraint rejected a public token.
    #[error("public token already in use: {0}")]
    TokenConflict(String),

    /// The requested rendering options cannot be combined.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a validation error on a single field.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }
}
