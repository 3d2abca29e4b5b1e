//! # Validation Module
//!
//! Input validation for collaborator-provided data.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: Collaborator UI     basic format checks, immediate feedback
//! Layer 2: THIS MODULE         business rule validation before writes
//! Layer 3: SQLite              NOT NULL / UNIQUE / FK / CHECK constraints
//! ```
//!
//! ## Usage
//! ```rust
//! use chiffrage_core::validation::{validate_designation, validate_quantity_hundredths};
//!
//! validate_designation("DN 200 carbon steel elbow").unwrap();
//! validate_quantity_hundredths(250).unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_QUANTITY_HUNDREDTHS;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a line-item designation.
///
/// ## Rules
/// - Must not be empty
/// - At most 300 characters
pub fn validate_designation(designation: &str) -> ValidationResult<()> {
    let designation = designation.trim();

    if designation.is_empty() {
        return Err(ValidationError::Required {
            field: "designation".to_string(),
        });
    }

    if designation.len() > 300 {
        return Err(ValidationError::TooLong {
            field: "designation".to_string(),
            max: 300,
        });
    }

    Ok(())
}

/// Validates a category or discipline business code.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Alphanumeric plus hyphens and underscores
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 20,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a discipline display color.
///
/// ## Rules
/// - `#RRGGBB` hex form
pub fn validate_hex_color(color: &str) -> ValidationResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "color".to_string(),
            reason: "must be a #RRGGBB hex color".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity (in hundredths).
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_QUANTITY_HUNDREDTHS`]
pub fn validate_quantity_hundredths(hundredths: i64) -> ValidationResult<()> {
    if hundredths <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if hundredths > MAX_QUANTITY_HUNDREDTHS {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY_HUNDREDTHS,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative; zero is allowed (a zero price is how an
///   override opts back into the cascade)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - 0 to 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_designation() {
        assert!(validate_designation("DN 200 carbon steel elbow").is_ok());
        assert!(validate_designation("").is_err());
        assert!(validate_designation("   ").is_err());
        assert!(validate_designation(&"A".repeat(400)).is_err());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("MAT-01").is_ok());
        assert!(validate_code("PIP").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#007bff").is_ok());
        assert!(validate_hex_color("#ABCDEF").is_ok());
        assert!(validate_hex_color("007bff").is_err());
        assert!(validate_hex_color("#07bff").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity_hundredths(1).is_ok());
        assert!(validate_quantity_hundredths(250).is_ok());
        assert!(validate_quantity_hundredths(MAX_QUANTITY_HUNDREDTHS).is_ok());

        assert!(validate_quantity_hundredths(0).is_err());
        assert!(validate_quantity_hundredths(-100).is_err());
        assert!(validate_quantity_hundredths(MAX_QUANTITY_HUNDREDTHS + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(150_000).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
