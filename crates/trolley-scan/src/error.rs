//! # Scan Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Upload       │  │    Decode       │  │     Resolve             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Empty          │  │  NoSymbol       │  │  NotFound               │ │
//! │  │  NotAnImage     │  │  UnreadableImage│  │  ServiceError           │ │
//! │  │  Unrecognized   │  │  InvalidSymbol  │  │    ▲                    │ │
//! │  │  Io             │  │  Worker         │  │    └── CatalogError     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │     Cart        │  │    Config       │  None of these are fatal:   │
//! │  │                 │  │                 │  the workflow turns each    │
//! │  │  Empty          │  │  LoadFailed     │  into a notification and a  │
//! │  │  NotInCart      │  │  SaveFailed     │  retryable state.           │
//! │  │  Rejected       │  │  Invalid        │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;
use trolley_core::{CoreError, Notification, ValidationError};

// =============================================================================
// Upload
// =============================================================================

/// The selected file was rejected before any decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("The selected file is empty")]
    Empty,

    /// Declared MIME type is not `image/*`.
    #[error("Expected an image file, got {mime}")]
    NotAnImage { mime: String },

    /// No MIME type given and the bytes don't look like any image format.
    #[error("The selected file is not a recognized image format")]
    UnrecognizedFormat,

    #[error("Failed to read image: {0}")]
    Io(String),
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Io(err.to_string())
    }
}

// =============================================================================
// Decode
// =============================================================================

/// No usable barcode could be read from the image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No barcode found in the image")]
    NoSymbol,

    /// The bytes could not be decoded into pixels.
    #[error("Image could not be read: {0}")]
    UnreadableImage(String),

    #[error("Barcode symbology {0} is not supported")]
    UnsupportedSymbology(String),

    /// A symbol was read but is not a valid catalog barcode.
    #[error("Decoded text '{text}' is not a valid barcode: {reason}")]
    InvalidSymbol {
        text: String,
        reason: ValidationError,
    },

    /// The blocking decode task panicked or was cancelled.
    #[error("Decoder worker failed: {0}")]
    Worker(String),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

// =============================================================================
// Catalog & Resolve
// =============================================================================

/// The catalog backend failed. "No such product" is not an error at this
/// level; catalogs report it as `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog query failed: {0}")]
    Query(String),
}

impl From<trolley_db::DbError> for CatalogError {
    fn from(err: trolley_db::DbError) -> Self {
        if err.is_unavailable() {
            CatalogError::Unavailable(err.to_string())
        } else {
            CatalogError::Query(err.to_string())
        }
    }
}

/// Why a barcode did not resolve to a product.
///
/// The two cases are shown differently to the shopper: one means "this
/// product isn't sold here", the other "try again".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No product found for barcode {barcode}")]
    NotFound { barcode: String },

    /// Catalog unreachable, timed out or returned a malformed record.
    #[error("Lookup of {barcode} failed: {reason}")]
    ServiceError { barcode: String, reason: String },
}

impl ResolveError {
    pub(crate) fn service(barcode: &str, reason: impl Into<String>) -> Self {
        ResolveError::ServiceError {
            barcode: barcode.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn timeout(barcode: &str, after: Duration) -> Self {
        Self::service(barcode, format!("timed out after {}ms", after.as_millis()))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Everything that can send a scan to `Failed`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanFailure {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ScanFailure {
    /// The message shown to the shopper for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            ScanFailure::Decode(DecodeError::InvalidSymbol { text, .. }) => {
                Notification::invalid_barcode(text)
            }
            ScanFailure::Decode(_) => Notification::no_barcode_found(),
            ScanFailure::Resolve(ResolveError::NotFound { barcode }) => {
                Notification::product_not_found(barcode)
            }
            ScanFailure::Resolve(ResolveError::ServiceError { .. }) => {
                Notification::lookup_failed()
            }
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Your cart is empty")]
    Empty,

    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// A cart rule refused the change (line or quantity limit).
    #[error(transparent)]
    Rejected(CoreError),
}

impl From<CoreError> for CartError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => CartError::Empty,
            CoreError::NotInCart(barcode) => CartError::NotInCart(barcode),
            other => CartError::Rejected(other),
        }
    }
}

pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Config
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use trolley_db::DbError;

    #[test]
    fn test_db_errors_map_to_catalog_errors() {
        assert!(matches!(
            CatalogError::from(DbError::PoolExhausted),
            CatalogError::Unavailable(_)
        ));
        assert!(matches!(
            CatalogError::from(DbError::QueryFailed("no such table".into())),
            CatalogError::Query(_)
        ));
    }

    #[test]
    fn test_core_errors_map_to_cart_errors() {
        assert_eq!(CartError::from(CoreError::EmptyCart), CartError::Empty);
        assert_eq!(
            CartError::from(CoreError::NotInCart("12345678".into())),
            CartError::NotInCart("12345678".into())
        );
        assert!(matches!(
            CartError::from(CoreError::CartTooLarge { max: 100 }),
            CartError::Rejected(_)
        ));
    }

    #[test]
    fn test_failure_notifications_are_distinct() {
        let not_found = ScanFailure::Resolve(ResolveError::NotFound {
            barcode: "1234567890123".into(),
        })
        .notification();
        let service = ScanFailure::Resolve(ResolveError::service("1234567890123", "down"))
            .notification();
        let no_symbol = ScanFailure::Decode(DecodeError::NoSymbol).notification();

        assert_eq!(not_found.title, "No product found");
        assert_eq!(service.title, "Lookup failed, try again");
        assert_eq!(no_symbol.title, "No barcode found");
    }
}
