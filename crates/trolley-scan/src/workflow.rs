//! # Scan Workflow
//!
//! The state machine behind the scan page. Every user action goes through
//! one of its methods; nothing else mutates the session.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐  select   ┌───────────────┐  scan   ┌──────────┐            │
//! │   │ Idle │──────────►│ ImageSelected │────────►│ Scanning │            │
//! │   └──────┘           └───────────────┘         └────┬─────┘            │
//! │      ▲                       ▲  ▲                   │                   │
//! │      │                select │  │ select     ┌──────┴──────┐            │
//! │      │ reset delay           │  │            ▼             ▼            │
//! │      │ (2 s)            ┌────┴──┴──┐  ◄─scan─ ┌────────┐ ┌──────────┐  │
//! │      │                  │  Failed  │  (retry) │        │ │ Resolved │  │
//! │      │                  └──────────┘          └────────┘ └────┬─────┘  │
//! │      │                                                        │ add    │
//! │      │                  ┌──────────┐                          │        │
//! │      └──────────────────│  Added   │◄─────────────────────────┘        │
//! │                         └──────────┘                                    │
//! │                                                                         │
//! │  select from any state starts a new session: token + 1, everything     │
//! │  cleared, reset timer aborted.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stale Results
//! ```text
//! scan(A) ── token 3 ──► decode ······························► result for 3
//!                                  select(B) ── token 4               │
//!                                                                     ▼
//!                                               token is now 4 → discard
//! ```
//!
//! The session lock is never held across a decode or a lookup, so a new
//! selection can always get in while a scan is in flight.

use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use trolley_core::notification::DEFAULT_NOTIFICATION_MS;
use trolley_core::{DecodedBarcode, Notification, Product, ScanState, ScanView, SessionId};

use crate::cart_store::CartStore;
use crate::config::TrolleyConfig;
use crate::decoder::{BarcodeDecoder, DecodedSymbol};
use crate::error::{CartError, ConfigError, ConfigResult, ImageError, ScanFailure};
use crate::notify::{NoOpNotifier, Notifier};
use crate::resolver::ProductResolver;
use crate::upload::{PreviewRegistry, UploadedImage};

const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

// =============================================================================
// Outcomes
// =============================================================================

/// What a call to [`ScanWorkflow::scan`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Resolved(Product),
    Failed(ScanFailure),

    /// The session was superseded while the scan was in flight; the result
    /// was thrown away.
    Stale,

    /// Nothing to scan, or a scan is already running.
    Ignored,
}

/// What a call to [`ScanWorkflow::add_to_cart`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { product: Product, quantity: i64 },

    /// The cart refused the product. The session stays `Resolved`.
    Rejected(CartError),

    /// No resolved product, or it was already added.
    Ignored,
}

// =============================================================================
// Session
// =============================================================================

struct Session {
    id: SessionId,
    state: ScanState,
    image: Option<UploadedImage>,
    barcode: Option<DecodedBarcode>,
    product: Option<Product>,
    added: bool,
    reset_timer: Option<JoinHandle<()>>,
}

impl Session {
    fn new() -> Self {
        Session {
            id: SessionId::default(),
            state: ScanState::Idle,
            image: None,
            barcode: None,
            product: None,
            added: false,
            reset_timer: None,
        }
    }

    /// Starts over with a fresh token. Drops the image (releasing its
    /// preview once no decode holds it) and cancels a pending reset.
    fn restart(&mut self) {
        if let Some(timer) = self.reset_timer.take() {
            timer.abort();
        }
        self.id = self.id.next();
        self.state = ScanState::Idle;
        self.image = None;
        self.barcode = None;
        self.product = None;
        self.added = false;
    }

    fn view(&self) -> ScanView {
        ScanView {
            state: self.state,
            session: self.id,
            preview_url: self.image.as_ref().map(|i| i.preview_url().to_string()),
            barcode: self.barcode.clone(),
            product: self.product.clone(),
            added: self.added,
        }
    }
}

// =============================================================================
// Scan Workflow
// =============================================================================

struct Inner {
    decoder: Arc<dyn BarcodeDecoder>,
    resolver: ProductResolver,
    cart: Arc<dyn CartStore>,
    notifier: Arc<dyn Notifier>,
    previews: PreviewRegistry,
    reset_delay: Duration,
    notification_ms: u64,
    session: Mutex<Session>,
}

impl Inner {
    fn notify(&self, notification: Notification) {
        self.notifier
            .notify(notification.with_duration_ms(self.notification_ms));
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.session.get_mut().reset_timer.take() {
            timer.abort();
        }
    }
}

/// Scan-to-cart controller. Clones share the same session.
#[derive(Clone)]
pub struct ScanWorkflow {
    inner: Arc<Inner>,
}

impl ScanWorkflow {
    pub fn builder() -> ScanWorkflowBuilder {
        ScanWorkflowBuilder::new()
    }

    /// Snapshot for rendering.
    pub async fn view(&self) -> ScanView {
        self.inner.session.lock().await.view()
    }

    pub fn cart(&self) -> &Arc<dyn CartStore> {
        &self.inner.cart
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.inner.previews
    }

    // =========================================================================
    // Image Selection
    // =========================================================================

    /// Selects an image from raw bytes and starts a new session.
    ///
    /// A rejected file leaves the current session untouched.
    pub async fn select_image(
        &self,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<ScanView, ImageError> {
        let selected = self.inner.previews.select(bytes, mime);
        self.install(selected).await
    }

    /// Selects an image file from disk and starts a new session.
    pub async fn select_file(&self, path: impl AsRef<Path>) -> Result<ScanView, ImageError> {
        let selected = self.inner.previews.select_file(path).await;
        self.install(selected).await
    }

    async fn install(
        &self,
        selected: Result<UploadedImage, ImageError>,
    ) -> Result<ScanView, ImageError> {
        let image = selected.map_err(|e| {
            warn!(error = %e, "Image rejected");
            self.inner.notify(Notification::invalid_image(&e.to_string()));
            e
        })?;

        let mut session = self.inner.session.lock().await;
        session.restart();
        session.image = Some(image);
        session.state = ScanState::ImageSelected;

        debug!(session = %session.id, "Image selected");
        Ok(session.view())
    }

    /// Drops the current image and goes back to `Idle`.
    ///
    /// An in-flight scan for the dropped image becomes stale.
    pub async fn discard(&self) -> ScanView {
        let mut session = self.inner.session.lock().await;
        if session.state != ScanState::Idle || session.image.is_some() {
            session.restart();
            debug!(session = %session.id, "Session discarded");
        }
        session.view()
    }

    // =========================================================================
    // Scan
    // =========================================================================

    /// Decodes the selected image and looks the barcode up.
    ///
    /// Runs from `ImageSelected`, or from `Failed` to retry the same image.
    /// Any other state makes this a no-op.
    pub async fn scan(&self) -> ScanOutcome {
        let (token, image) = {
            let mut session = self.inner.session.lock().await;
            if !matches!(session.state, ScanState::ImageSelected | ScanState::Failed) {
                debug!(session = %session.id, state = %session.state, "Scan ignored");
                return ScanOutcome::Ignored;
            }
            let Some(image) = session.image.clone() else {
                return ScanOutcome::Ignored;
            };

            session.state = ScanState::Scanning;
            session.barcode = None;
            session.product = None;
            (session.id, image)
        };

        info!(session = %token, "Scanning image");

        let decoded = self
            .inner
            .decoder
            .decode(&image)
            .await
            .and_then(DecodedSymbol::into_barcode);
        drop(image);

        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => return self.fail(token, e.into()).await,
        };

        if self.inner.session.lock().await.id != token {
            debug!(session = %token, barcode = %decoded.barcode, "Discarding stale decode");
            return ScanOutcome::Stale;
        }

        let resolved = self.inner.resolver.resolve(&decoded.barcode).await;

        let product = match resolved {
            Ok(product) => product,
            Err(e) => return self.fail(token, e.into()).await,
        };

        let mut session = self.inner.session.lock().await;
        if session.id != token {
            debug!(session = %token, barcode = %decoded.barcode, "Discarding stale lookup");
            return ScanOutcome::Stale;
        }

        info!(
            session = %token,
            barcode = %decoded.barcode,
            symbology = %decoded.symbology,
            product = %product.name,
            "Product resolved"
        );
        session.state = ScanState::Resolved;
        session.barcode = Some(decoded);
        session.product = Some(product.clone());

        ScanOutcome::Resolved(product)
    }

    async fn fail(&self, token: SessionId, failure: ScanFailure) -> ScanOutcome {
        let mut session = self.inner.session.lock().await;
        if session.id != token {
            debug!(session = %token, error = %failure, "Discarding stale failure");
            return ScanOutcome::Stale;
        }

        warn!(session = %token, error = %failure, "Scan failed");
        session.state = ScanState::Failed;
        self.inner.notify(failure.notification());

        ScanOutcome::Failed(failure)
    }

    // =========================================================================
    // Add to Cart
    // =========================================================================

    /// Puts the resolved product in the cart, then schedules the reset.
    ///
    /// The cart store is called at most once per resolved product.
    pub async fn add_to_cart(&self) -> AddOutcome {
        let mut session = self.inner.session.lock().await;
        if session.state != ScanState::Resolved {
            debug!(session = %session.id, state = %session.state, "Add ignored");
            return AddOutcome::Ignored;
        }
        let Some(product) = session.product.clone() else {
            return AddOutcome::Ignored;
        };

        match self.inner.cart.add_to_cart(&product) {
            Ok(quantity) => {
                info!(session = %session.id, barcode = %product.barcode, quantity, "Added to cart");
                session.state = ScanState::Added;
                session.added = true;
                session.reset_timer = Some(self.schedule_reset(session.id));
                self.inner.notify(Notification::added_to_cart(&product.name));

                AddOutcome::Added { product, quantity }
            }
            Err(e) => {
                warn!(session = %session.id, error = %e, "Cart rejected product");
                self.inner.notify(Notification::cart_rejected(&e.to_string()));
                AddOutcome::Rejected(e)
            }
        }
    }

    fn schedule_reset(&self, token: SessionId) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.reset_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut session = inner.session.lock().await;
            if session.id == token && session.state == ScanState::Added {
                // our own handle; nothing left to abort
                session.reset_timer = None;
                session.restart();
                debug!(session = %session.id, "Session reset after add");
            }
        })
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for [`ScanWorkflow`].
pub struct ScanWorkflowBuilder {
    decoder: Option<Arc<dyn BarcodeDecoder>>,
    resolver: Option<ProductResolver>,
    cart: Option<Arc<dyn CartStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    previews: Option<PreviewRegistry>,
    reset_delay: Duration,
    notification_ms: u64,
}

impl ScanWorkflowBuilder {
    pub fn new() -> Self {
        ScanWorkflowBuilder {
            decoder: None,
            resolver: None,
            cart: None,
            notifier: None,
            previews: None,
            reset_delay: DEFAULT_RESET_DELAY,
            notification_ms: DEFAULT_NOTIFICATION_MS,
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_resolver(mut self, resolver: ProductResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_cart(mut self, cart: Arc<dyn CartStore>) -> Self {
        self.cart = Some(cart);
        self
    }

    /// Defaults to [`NoOpNotifier`].
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Shares an existing preview registry (e.g. one a UI also reads).
    pub fn with_previews(mut self, previews: PreviewRegistry) -> Self {
        self.previews = Some(previews);
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Takes the reset delay and notification duration from config.
    pub fn with_config(mut self, config: &TrolleyConfig) -> Self {
        self.reset_delay = config.workflow.reset_delay();
        self.notification_ms = config.workflow.notification_ms;
        self
    }

    pub fn build(self) -> ConfigResult<ScanWorkflow> {
        let decoder = self
            .decoder
            .ok_or_else(|| ConfigError::Invalid("Decoder required".into()))?;
        let resolver = self
            .resolver
            .ok_or_else(|| ConfigError::Invalid("Resolver required".into()))?;
        let cart = self
            .cart
            .ok_or_else(|| ConfigError::Invalid("Cart store required".into()))?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoOpNotifier));

        Ok(ScanWorkflow {
            inner: Arc::new(Inner {
                decoder,
                resolver,
                cart,
                notifier,
                previews: self.previews.unwrap_or_default(),
                reset_delay: self.reset_delay,
                notification_ms: self.notification_ms,
                session: Mutex::new(Session::new()),
            }),
        })
    }
}

impl Default for ScanWorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
