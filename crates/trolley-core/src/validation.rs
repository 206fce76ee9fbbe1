//! # Validation Module
//!
//! Input validation rules for Smart Trolley.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Decoder output                                               │
//! │  └── validate_barcode: digits only, length >= 8                        │
//! │      (nothing else ever reaches the catalog)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog records                                              │
//! │  └── Product::validate: name present, price >= 0                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart rules                                                   │
//! │  ├── validate_quantity: 1..=999 per line                               │
//! │  └── validate_cart_size: at most 100 lines                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use trolley_core::validation::{validate_barcode, validate_quantity};
//!
//! validate_barcode("7891234567890").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, MIN_BARCODE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest barcode accepted. GTIN-14 is the longest retail code; the slack
/// covers CODE-128 shelf labels.
const MAX_BARCODE_LEN: usize = 48;

const MAX_PRODUCT_NAME_LEN: usize = 200;

/// 100% expressed in basis points.
const MAX_TAX_RATE_BPS: u32 = 10_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a decoded barcode as a catalog key.
///
/// ## Rules
/// - Must not be empty
/// - ASCII digits only
/// - At least [`MIN_BARCODE_LEN`] characters
///
/// ## Example
/// ```rust
/// use trolley_core::validation::validate_barcode;
///
/// assert!(validate_barcode("7891234567890").is_ok());
/// assert!(validate_barcode("12345678").is_ok());
/// assert!(validate_barcode("1234567").is_err());
/// assert!(validate_barcode("ABC12345").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if barcode.len() < MIN_BARCODE_LEN {
        return Err(ValidationError::TooShort {
            field: "barcode".to_string(),
            min: MIN_BARCODE_LEN,
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    Ok(())
}

/// Validates a product display name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price. Zero is allowed (free samples), negatives are not.
pub fn validate_price_cents(price_cents: i64) -> ValidationResult<()> {
    if price_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// ## Example
/// ```rust
/// use trolley_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(1000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a cart may hold `line_count` distinct lines.
pub fn validate_cart_size(line_count: usize) -> ValidationResult<()> {
    if line_count > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0..=10000).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_TAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: MAX_TAX_RATE_BPS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("7891234567890").is_ok());
        assert!(validate_barcode("12345678").is_ok());

        assert!(matches!(
            validate_barcode(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_barcode("1234567"),
            Err(ValidationError::TooShort { min: 8, .. })
        ));
        assert!(matches!(
            validate_barcode("ABC-12345"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        // Unicode digits are not ASCII digits
        assert!(validate_barcode("١٢٣٤٥٦٧٨").is_err());
        assert!(validate_barcode(&"9".repeat(49)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Fresh Milk 1L").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_and_tax() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_tax_rate_bps(1000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(100).is_ok());
        assert!(validate_cart_size(101).is_err());
    }

    proptest! {
        #[test]
        fn digit_strings_of_eight_or_more_are_valid(s in "[0-9]{8,20}") {
            prop_assert!(validate_barcode(&s).is_ok());
        }

        #[test]
        fn short_digit_strings_are_rejected(s in "[0-9]{0,7}") {
            prop_assert!(validate_barcode(&s).is_err());
        }

        #[test]
        fn any_non_digit_is_rejected(
            prefix in "[0-9]{4,10}",
            bad in "[^0-9]",
            suffix in "[0-9]{4,10}",
        ) {
            let s = format!("{prefix}{bad}{suffix}");
            prop_assert!(validate_barcode(&s).is_err());
        }
    }
}
