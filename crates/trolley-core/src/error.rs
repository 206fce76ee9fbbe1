//! # Error Types
//!
//! Domain-specific error types for trolley-core.
//!
//! Where each crate's errors end up:
//!
//! ```text
//! ValidationError ──► CoreError ──────────────┐
//!   bad barcode        cart rule broken       │
//!                                             ▼
//! ImageError / DecodeError / ResolveError ──► Notification (toast)
//!   trolley-scan                              │
//!                                             ▼
//! DbError ──► CatalogError ──► ResolveError::ServiceError
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and domain rule errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No cart line exists for the given barcode.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached its maximum number of distinct lines.
    #[error("Cart cannot have more than {max} products")]
    CartTooLarge { max: usize },

    /// Line quantity would exceed the allowed maximum.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart line: Fresh Milk 1L × 999
    ///      │
    ///      ▼
    /// Scan + add another Fresh Milk
    ///      │
    ///      ▼
    /// QuantityTooLarge { requested: 1000, max: 999 }
    /// ```
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was requested with nothing in the cart.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs, e.g. when a decoded symbol is not a
/// usable catalog key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Invalid format (e.g. letters in a barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
