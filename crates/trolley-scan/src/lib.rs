//! # trolley-scan: Scan-to-Cart Engine for Smart Trolley
//!
//! Takes an uploaded photo, reads the barcode on it, looks the product up in
//! the catalog and, when the shopper confirms, puts it in the cart.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Workflow Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  ScanWorkflow (state machine)                    │  │
//! │  │                                                                  │  │
//! │  │  Idle → ImageSelected → Scanning → Resolved/Failed → Added → Idle│  │
//! │  │  Session token guards every async result against staleness      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │      ┌──────────────┬─────────┼──────────────┬──────────────┐          │
//! │      ▼              ▼         ▼              ▼              ▼           │
//! │  ┌────────┐  ┌────────────┐ ┌──────────┐ ┌───────────┐ ┌──────────┐   │
//! │  │ upload │  │  decoder   │ │ resolver │ │cart_store │ │  notify  │   │
//! │  │        │  │            │ │          │ │           │ │          │   │
//! │  │preview │  │ rxing on   │ │ catalog  │ │ Cart with │ │ toasts,  │   │
//! │  │handles │  │ blocking   │ │ lookup + │ │ limits +  │ │ channel, │   │
//! │  │        │  │ pool       │ │ timeout  │ │ checkout  │ │ no-op    │   │
//! │  └────────┘  └────────────┘ └──────────┘ └───────────┘ └──────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use trolley_scan::{
//!     InMemoryCartStore, InMemoryCatalog, ProductResolver, ScanWorkflow, SymbolDecoder, ToastQueue,
//! };
//!
//! let toasts = Arc::new(ToastQueue::new());
//! let workflow = ScanWorkflow::builder()
//!     .with_decoder(Arc::new(SymbolDecoder::default()))
//!     .with_resolver(ProductResolver::new(Arc::new(InMemoryCatalog::demo())))
//!     .with_cart(Arc::new(InMemoryCartStore::new(toasts.clone())))
//!     .with_notifier(toasts.clone())
//!     .build()?;
//!
//! workflow.select_file("shelf-photo.jpg").await?;
//! workflow.scan().await;
//! workflow.add_to_cart().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod decoder;
pub mod error;
pub mod notify;
pub mod resolver;
pub mod upload;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart_store::{CartStore, InMemoryCartStore};
pub use catalog::{InMemoryCatalog, ProductCatalog};
pub use config::TrolleyConfig;
pub use decoder::{BarcodeDecoder, DecodedSymbol, SymbolDecoder};
pub use error::{
    CartError, CatalogError, ConfigError, DecodeError, ImageError, ResolveError, ScanFailure,
};
pub use notify::{ChannelNotifier, NoOpNotifier, Notifier, ToastQueue};
pub use resolver::ProductResolver;
pub use upload::{PreviewHandle, PreviewRegistry, UploadedImage};
pub use workflow::{AddOutcome, ScanOutcome, ScanWorkflow, ScanWorkflowBuilder};
