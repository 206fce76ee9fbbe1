//! # Domain Types
//!
//! Core domain types shared by the catalog, the scanner and the cart.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Symbology     │   │ DecodedBarcode  │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  EAN-13, EAN-8  │──►│  barcode        │──►│  barcode (PK)   │       │
//! │  │  UPC-A, UPC-E   │   │  symbology      │   │  name           │       │
//! │  │  CODE-128/39    │   └─────────────────┘   │  price_cents    │       │
//! │  └─────────────────┘                         │  image_url      │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐                                                   │
//! │  │    TaxRate      │   Barcode: digits only, at least 8 of them        │
//! │  │  bps (u32)      │                                                   │
//! │  │  1000 = 10%     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_barcode, validate_price_cents, validate_product_name};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Symbology
// =============================================================================

/// A barcode encoding standard the scanner can be configured to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Symbology {
    #[serde(rename = "EAN-13")]
    Ean13,
    #[serde(rename = "EAN-8")]
    Ean8,
    #[serde(rename = "CODE-128")]
    Code128,
    #[serde(rename = "CODE-39")]
    Code39,
    #[serde(rename = "UPC-A")]
    UpcA,
    #[serde(rename = "UPC-E")]
    UpcE,
}

impl Symbology {
    /// Every symbology the scanner knows, in retail-likelihood order.
    pub const ALL: [Symbology; 6] = [
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Code128,
        Symbology::Code39,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::Code128 => "CODE-128",
            Symbology::Code39 => "CODE-39",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = ValidationError;

    /// Accepts `EAN-13`, `ean13`, `ean_13` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "ean13" => Ok(Symbology::Ean13),
            "ean8" => Ok(Symbology::Ean8),
            "code128" => Ok(Symbology::Code128),
            "code39" => Ok(Symbology::Code39),
            "upca" => Ok(Symbology::UpcA),
            "upce" => Ok(Symbology::UpcE),
            _ => Err(ValidationError::NotAllowed {
                field: "symbology".to_string(),
                allowed: Symbology::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Barcode
// =============================================================================

/// A validated catalog key: digits only, at least [`crate::MIN_BARCODE_LEN`] long.
///
/// The only way to build one is [`Barcode::parse`], so holding a `Barcode`
/// means the string already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Validates and wraps a raw barcode string. Surrounding whitespace is trimmed.
    ///
    /// ```rust
    /// use trolley_core::types::Barcode;
    ///
    /// assert!(Barcode::parse("7891234567890").is_ok());
    /// assert!(Barcode::parse("ABC-1234").is_err());
    /// assert!(Barcode::parse("1234567").is_err()); // too short
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        validate_barcode(raw)?;
        Ok(Barcode(raw.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Barcode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Barcode::parse(&value)
    }
}

impl From<Barcode> for String {
    fn from(barcode: Barcode) -> Self {
        barcode.0
    }
}

/// A barcode read from an image, tagged with the symbology it was printed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DecodedBarcode {
    pub barcode: Barcode,
    pub symbology: Symbology,
}

// =============================================================================
// Product
// =============================================================================

/// A product record from the catalog.
///
/// The barcode is the primary key. Once fetched, a product is never mutated
/// within a scan session; the catalog stays the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Barcode digits (EAN-13, UPC-A, ...).
    pub barcode: String,

    /// Display name shown on the product card and in the cart.
    pub name: String,

    /// Unit price in cents. Never negative.
    pub price_cents: i64,

    /// Product photo for the product card.
    pub image_url: Option<String>,
}

impl Product {
    /// Builds a product without an image.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Product {
            barcode: barcode.into(),
            name: name.into(),
            price_cents,
            image_url: None,
        }
    }

    /// Sets the product image.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks that a record is well-formed: numeric barcode, non-empty name,
    /// non-negative price.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_barcode(&self.barcode)?;
        validate_product_name(&self.name)?;
        validate_price_cents(self.price_cents)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_ten_percent() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_symbology_parsing() {
        assert_eq!("EAN-13".parse::<Symbology>().unwrap(), Symbology::Ean13);
        assert_eq!("upc_a".parse::<Symbology>().unwrap(), Symbology::UpcA);
        assert_eq!("code128".parse::<Symbology>().unwrap(), Symbology::Code128);
        assert!("qr".parse::<Symbology>().is_err());
    }

    #[test]
    fn test_symbology_serializes_with_dashes() {
        let json = serde_json::to_string(&Symbology::Code39).unwrap();
        assert_eq!(json, "\"CODE-39\"");
    }

    #[test]
    fn test_barcode_parse_trims_and_validates() {
        let barcode = Barcode::parse("  7891234567890 ").unwrap();
        assert_eq!(barcode.as_str(), "7891234567890");

        assert!(Barcode::parse("").is_err());
        assert!(Barcode::parse("12345ABC").is_err());
        assert!(Barcode::parse("1234567").is_err());
    }

    #[test]
    fn test_barcode_deserialize_rejects_invalid() {
        let ok: Result<Barcode, _> = serde_json::from_str("\"12345678\"");
        assert!(ok.is_ok());
        let bad: Result<Barcode, _> = serde_json::from_str("\"not-a-code\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_product_validate() {
        let product = Product::new("7891234567890", "Organic Banana Bundle", 499);
        assert!(product.validate().is_ok());
        assert_eq!(product.price().to_string(), "$4.99");

        let free = Product::new("7891234567890", "Sample", 0);
        assert!(free.validate().is_ok());

        let negative = Product::new("7891234567890", "Broken", -1);
        assert!(negative.validate().is_err());

        let unnamed = Product::new("7891234567890", "   ", 100);
        assert!(unnamed.validate().is_err());
    }
}
