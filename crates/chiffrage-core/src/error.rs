//! # Error Types
//!
//! Domain error types for chiffrage-core.
//!
//! ## Error Hierarchy
//! ```text
//! chiffrage-core (this file)
//! ├── CoreError        - domain rule violations
//! └── ValidationError  - input validation failures
//!
//! chiffrage-db (separate crate)
//! └── DbError          - persistent store failures
//!
//! Flow: ValidationError → CoreError → DbError → collaborator
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derives, never manual impls
//! 2. Context in the message (diameter, piece kind, field name)
//! 3. Errors are enum variants, never String
//! 4. Skip-and-continue conditions inside the aggregation engine never
//!    surface as errors; only genuine rule violations do

use thiserror::Error;

use crate::geometry::PieceType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The surface table has no entry for this combination.
    ///
    /// ## When This Occurs
    /// - Diameter is not a standard DN
    /// - The piece kind is not sandblasted in practice at that diameter
    ///   (zero in the reference table)
    ///
    /// Callers must report this to the user; it is never silently summed
    /// as a zero-cost line.
    #[error("no sandblasting surface for DN {diameter_dn} {piece}")]
    GeometryUnavailable { diameter_dn: i64, piece: PieceType },

    /// A stored selection row references both a catalog item and a custom
    /// request. The schema forbids this; hitting it means pre-constraint
    /// data needs repair.
    #[error("selection {selection_id} references both a catalog item and a custom request")]
    AmbiguousSelectionSource { selection_id: String },

    /// A sandblast draft with no picks cannot be finalized.
    #[error("sandblast draft is empty, nothing to finalize")]
    EmptyDraft,

    /// The draft working set has grown past its bound.
    #[error("sandblast draft cannot hold more than {max} picks")]
    DraftTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, when collaborator input does not
/// meet requirements.
#[derive(Debug, Error)]
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. not a UUID, not a hex color).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::GeometryUnavailable {
            diameter_dn: 750,
            piece: PieceType::SectorElbow,
        };
        assert_eq!(err.to_string(), "no sandblasting surface for DN 750 sector_elbow");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "designation".to_string(),
        };
        assert_eq!(err.to_string(), "designation is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
