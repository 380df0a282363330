//! # Error Types
//!
//! Domain-specific error types for souk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  souk-core errors (this file)                                          │
//! │  ├── CoreError        - Store mutation failures                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  souk-db errors (separate crate)                                       │
//! │  └── DbError          - Snapshot persistence failures                  │
//! │                                                                         │
//! │  souk-sync errors (separate crate)                                     │
//! │  └── SyncError        - Remote data service failures                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller (UI shows message)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, id, field)
//! 3. A failed mutation leaves the store untouched

use thiserror::Error;

use crate::types::EntityKind;

// =============================================================================
// Core Error
// =============================================================================

/// Store mutation errors.
///
/// None of these are raised for read queries: lookups return `Option` and
/// aggregates are total.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Update or delete targeted an id that is not in the collection.
    ///
    /// ## When This Occurs
    /// - The record was deleted from another screen
    /// - A stale id was kept by the caller after a reload
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: u64 },

    /// The id generator produced an id already present in the collection.
    ///
    /// Nothing is inserted. Seen only with a misconfigured generator (for
    /// example a sequential generator that was not seeded from the snapshot).
    #[error("{entity} id {id} is already taken")]
    DuplicateId { entity: EntityKind, id: u64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: EntityKind, id: impl Into<u64>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the mutation API before anything is written.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A collection that must have entries is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
