//! # trolley-core: Pure Domain Logic for Smart Trolley
//!
//! Everything the scan-to-cart workflow needs to *reason about* lives here:
//! money, products, barcodes, the cart and its checkout math, and the
//! notifications a UI shows. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Smart Trolley Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser UI / trolley-cli                        │   │
//! │  │    Upload ──► Scan ──► Product card ──► Cart ──► Checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          trolley-scan (ScanWorkflow, decoder, resolver)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ trolley-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌───────┐ │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │notification│ │session│ │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │Notification│ │ScanView│ │   │
//! │  │   │ Barcode │ │ TaxRate │ │ Receipt │ │            │ │       │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Barcode, Symbology, TaxRate
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart lines, order summary, checkout receipt
//! - [`notification`] - Transient user-facing messages
//! - [`session`] - Scan session state as seen by a UI
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use trolley_core::cart::Cart;
//! use trolley_core::types::{Product, TaxRate};
//!
//! let banana = Product::new("7891234567890", "Organic Banana Bundle", 499);
//!
//! let mut cart = Cart::new();
//! cart.add_product(&banana).unwrap();
//! cart.add_product(&banana).unwrap();
//!
//! let summary = cart.summary(TaxRate::from_bps(1000));
//! assert_eq!(summary.subtotal.cents(), 998);
//! assert_eq!(summary.total.cents(), 1098);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod notification;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, OrderSummary, Receipt};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use notification::{Notification, NotificationKind};
pub use session::{ScanState, ScanView, SessionId};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single product in the cart.
///
/// Guards against a stuck "+" button turning 3 apples into 300.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Shortest barcode the catalog accepts (EAN-8).
pub const MIN_BARCODE_LEN: usize = 8;

/// Checkout tax rate used when nothing else is configured: 10%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;
