//! # Validation Module
//!
//! Input checks applied before anything reaches the transition engine.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP / WebSocket (bistro-server)                                       │
//! │  └── Shape checks via deserialization (numbers, enums)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  FloorService (bistro-engine)                                           │
//! │  └── THIS MODULE: ids, deltas, quantities, amounts                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Transition engine                                                      │
//! │  └── Status guards: invalid transitions are ignored, not rejected       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_TABLE_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a table id as printed on the table QR.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Only letters, numbers, hyphens and underscores
///
/// ## Example
/// ```rust
/// use bistro_core::validation::validate_table_id;
///
/// assert!(validate_table_id("12").is_ok());
/// assert!(validate_table_id("terraza-3").is_ok());
/// assert!(validate_table_id("").is_err());
/// assert!(validate_table_id("../etc").is_err());
/// ```
pub fn validate_table_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "table id".to_string(),
        });
    }

    if id.len() > MAX_TABLE_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "table id".to_string(),
            max: MAX_TABLE_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "table id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart delta (`+1` / `-1` buttons, or a bulk amount).
pub fn validate_cart_delta(delta: i32) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::NonZero {
            field: "delta".to_string(),
        });
    }

    let max = MAX_ITEM_QUANTITY as i64;
    if (delta as i64).abs() > max {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -max,
            max,
        });
    }

    Ok(())
}

/// Validates the quantity a cart line would end up with.
///
/// Zero and negatives are fine here: they remove the line.
pub fn validate_line_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity > MAX_ITEM_QUANTITY as i64 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }
    Ok(())
}

/// Validates the amount reported by the client payment flow.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_id_rules() {
        assert!(validate_table_id("1").is_ok());
        assert!(validate_table_id("patio_2").is_ok());
        assert!(matches!(
            validate_table_id("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_table_id(&"9".repeat(33)),
            Err(ValidationError::TooLong { max: 32, .. })
        ));
        assert!(matches!(
            validate_table_id("mesa 4"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_cart_delta_bounds() {
        assert!(validate_cart_delta(1).is_ok());
        assert!(validate_cart_delta(-1).is_ok());
        assert!(validate_cart_delta(999).is_ok());
        assert!(matches!(
            validate_cart_delta(0),
            Err(ValidationError::NonZero { .. })
        ));
        assert!(validate_cart_delta(1000).is_err());
        assert!(validate_cart_delta(i32::MIN).is_err());
    }

    #[test]
    fn test_line_quantity_cap() {
        assert!(validate_line_quantity(-4).is_ok());
        assert!(validate_line_quantity(999).is_ok());
        assert!(validate_line_quantity(1000).is_err());
    }

    #[test]
    fn test_payment_amount() {
        assert!(validate_payment_amount(Money::zero()).is_ok());
        assert!(validate_payment_amount(Money::from_units(8500)).is_ok());
        assert!(validate_payment_amount(Money::from_units(-1)).is_err());
    }
}
