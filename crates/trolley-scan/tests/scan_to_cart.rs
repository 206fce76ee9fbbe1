//! End-to-end scan-to-cart runs against a real SQLite catalog.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use tokio::sync::Semaphore;

use trolley_core::{Product, ScanState, Symbology, TaxRate};
use trolley_db::{demo_catalog, Database, DbConfig};
use trolley_scan::error::DecodeResult;
use trolley_scan::{
    AddOutcome, BarcodeDecoder, CartStore, DecodeError, DecodedSymbol, InMemoryCartStore,
    InMemoryCatalog, ProductResolver, ScanFailure, ScanOutcome, ScanWorkflow, ToastQueue,
    UploadedImage,
};

// =============================================================================
// Fixtures
// =============================================================================

// SQLite answers from its own worker thread, so these tests run on real time
// with a short reset delay instead of a paused clock.
const RESET_DELAY: Duration = Duration::from_millis(100);

/// Treats the image bytes as the printed barcode. `-` means "nothing found".
/// With a gate, every decode waits for one permit.
struct PrintedTextDecoder {
    gate: Option<Arc<Semaphore>>,
}

#[async_trait]
impl BarcodeDecoder for PrintedTextDecoder {
    async fn decode(&self, image: &UploadedImage) -> DecodeResult<DecodedSymbol> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match std::str::from_utf8(image.bytes()).unwrap() {
            "-" => Err(DecodeError::NoSymbol),
            text => Ok(DecodedSymbol::new(text, Symbology::Ean13)),
        }
    }
}

struct Trolley {
    workflow: ScanWorkflow,
    cart: Arc<InMemoryCartStore>,
    toasts: Arc<ToastQueue>,
    _db: Database,
}

async fn trolley(gate: Option<Arc<Semaphore>>) -> Trolley {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.products().upsert_many(&demo_catalog()).await.unwrap();

    let toasts = Arc::new(ToastQueue::new());
    let cart = Arc::new(InMemoryCartStore::new(toasts.clone()));
    let workflow = ScanWorkflow::builder()
        .with_decoder(Arc::new(PrintedTextDecoder { gate }))
        .with_resolver(
            ProductResolver::new(Arc::new(db.products()))
                .with_timeout(Some(Duration::from_secs(5))),
        )
        .with_cart(cart.clone())
        .with_notifier(toasts.clone())
        .with_reset_delay(RESET_DELAY)
        .build()
        .unwrap();

    Trolley {
        workflow,
        cart,
        toasts,
        _db: db,
    }
}

async fn photo_of(workflow: &ScanWorkflow, printed: &str) {
    workflow
        .select_image(printed.as_bytes().to_vec(), Some("image/jpeg"))
        .await
        .unwrap();
}

async fn wait_for(workflow: &ScanWorkflow, state: ScanState) {
    while workflow.view().await.state != state {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_scan_add_and_reset() {
    let t = trolley(None).await;
    photo_of(&t.workflow, "7891234567890").await;

    let outcome = t.workflow.scan().await;
    assert!(matches!(outcome, ScanOutcome::Resolved(ref p) if p.name == "Organic Banana Bundle"));
    assert_eq!(t.workflow.view().await.state, ScanState::Resolved);

    assert!(matches!(t.workflow.add_to_cart().await, AddOutcome::Added { quantity: 1, .. }));
    let cart = t.cart.snapshot();
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.lines()[0].barcode(), "7891234567890");
    assert_eq!(cart.lines()[0].quantity, 1);
    assert_eq!(t.workflow.view().await.state, ScanState::Added);

    tokio::time::sleep(RESET_DELAY * 4).await;
    let view = t.workflow.view().await;
    assert_eq!(view.state, ScanState::Idle);
    assert!(view.preview_url.is_none());
    assert_eq!(t.workflow.previews().live_count(), 0);
}

#[tokio::test]
async fn test_new_photo_while_decoding_wins() {
    let gate = Arc::new(Semaphore::new(0));
    let t = trolley(Some(gate.clone())).await;
    photo_of(&t.workflow, "7891234567890").await;

    let first_scan = tokio::spawn({
        let workflow = t.workflow.clone();
        async move { workflow.scan().await }
    });
    wait_for(&t.workflow, ScanState::Scanning).await;

    photo_of(&t.workflow, "7891234567891").await;
    let second = t.workflow.view().await;

    gate.add_permits(1);
    assert_eq!(first_scan.await.unwrap(), ScanOutcome::Stale);

    let view = t.workflow.view().await;
    assert_eq!(view, second);
    assert!(view.product.is_none());
    assert_eq!(t.workflow.previews().live_count(), 1);

    gate.add_permits(1);
    let outcome = t.workflow.scan().await;
    assert!(matches!(outcome, ScanOutcome::Resolved(ref p) if p.name == "Fresh Milk 1L"));
}

#[tokio::test]
async fn test_photo_without_barcode_fails_visibly() {
    let t = trolley(None).await;
    photo_of(&t.workflow, "-").await;

    let outcome = t.workflow.scan().await;
    assert_eq!(outcome, ScanOutcome::Failed(ScanFailure::Decode(DecodeError::NoSymbol)));

    let view = t.workflow.view().await;
    assert_eq!(view.state, ScanState::Failed);
    assert!(view.product.is_none());
    assert!(view.preview_url.is_some());
    assert!(view.can_scan());

    let toasts = t.toasts.take_all();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "No barcode found");
    assert!(toasts[0].is_error());
}

#[tokio::test]
async fn test_unknown_barcode_is_not_found() {
    let t = trolley(None).await;
    photo_of(&t.workflow, "5000000000001").await;

    t.workflow.scan().await;
    assert_eq!(t.toasts.take_all()[0].title, "No product found");
}

#[tokio::test]
async fn test_two_scan_cycles_make_one_line() {
    let t = trolley(None).await;

    for _ in 0..2 {
        photo_of(&t.workflow, "7891234567891").await;
        t.workflow.scan().await;
        t.workflow.add_to_cart().await;
    }

    let cart = t.cart.snapshot();
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.lines()[0].quantity, 2);
}

#[tokio::test]
async fn test_scan_into_cart_and_check_out() {
    let t = trolley(None).await;

    for printed in ["7891234567890", "7891234567891", "7891234567891", "7891234567893"] {
        photo_of(&t.workflow, printed).await;
        assert!(matches!(t.workflow.scan().await, ScanOutcome::Resolved(_)));
        assert!(matches!(t.workflow.add_to_cart().await, AddOutcome::Added { .. }));
    }

    // decrement at quantity 1 does nothing
    assert!(!t.cart.decrement("7891234567890").unwrap());

    let receipt = t.cart.checkout(TaxRate::from_bps(1000)).unwrap();
    assert_eq!(receipt.summary.subtotal.cents(), 1596);
    assert_eq!(receipt.summary.tax.cents(), 160);
    assert_eq!(receipt.summary.total.cents(), 1756);
    assert_eq!(receipt.summary.shipping_label(), "Free");
    assert!(t.cart.snapshot().is_empty());
    assert_eq!(t.cart.item_count(), 0);
}

#[tokio::test]
async fn test_broken_catalog_record_is_a_service_error() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(Product::new("7891234567890", "   ", 499));

    let toasts = Arc::new(ToastQueue::new());
    let workflow = ScanWorkflow::builder()
        .with_decoder(Arc::new(PrintedTextDecoder { gate: None }))
        .with_resolver(ProductResolver::new(Arc::new(catalog)))
        .with_cart(Arc::new(InMemoryCartStore::new(toasts.clone())))
        .with_notifier(toasts.clone())
        .build()
        .unwrap();

    photo_of(&workflow, "7891234567890").await;
    assert!(matches!(workflow.scan().await, ScanOutcome::Failed(ScanFailure::Resolve(_))));
    assert_eq!(toasts.take_all()[0].title, "Lookup failed, try again");
}

// =============================================================================
// Properties
// =============================================================================

const DEMO_BARCODES: [&str; 5] = [
    "7891234567890",
    "7891234567891",
    "7891234567892",
    "7891234567893",
    "7891234567894",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// However many photos are picked mid-scan, only the last one's product
    /// ever shows up.
    #[test]
    fn prop_only_latest_selection_is_visible(picks in prop::collection::vec(0usize..5, 1..6)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let gate = Arc::new(Semaphore::new(0));
            let t = trolley(Some(gate.clone())).await;

            let mut scans = Vec::new();
            for &pick in &picks {
                photo_of(&t.workflow, DEMO_BARCODES[pick]).await;
                let workflow = t.workflow.clone();
                scans.push(tokio::spawn(async move { workflow.scan().await }));
                wait_for(&t.workflow, ScanState::Scanning).await;
            }

            gate.add_permits(picks.len());
            let mut outcomes = Vec::new();
            for scan in scans {
                outcomes.push(scan.await.unwrap());
            }

            let (last, earlier) = outcomes.split_last().unwrap();
            assert!(earlier.iter().all(|o| *o == ScanOutcome::Stale));

            let expected = DEMO_BARCODES[*picks.last().unwrap()];
            assert!(matches!(last, ScanOutcome::Resolved(p) if p.barcode == expected));

            let view = t.workflow.view().await;
            assert_eq!(view.product.unwrap().barcode, expected);
            assert_eq!(t.workflow.previews().live_count(), 1);
        });
    }
}
