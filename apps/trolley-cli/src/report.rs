//! Command output, as text or JSON.

use std::path::Path;

use serde::Serialize;
use trolley_core::{
    Barcode, Cart, CartLine, Notification, NotificationKind, OrderSummary, Product, Receipt,
    ScanState, ScanView, Symbology,
};
use trolley_scan::error::ResolveResult;
use trolley_scan::TrolleyConfig;

/// What happened to one photo.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub image: String,
    pub state: ScanState,
    pub barcode: Option<String>,
    pub symbology: Option<Symbology>,
    pub product: Option<Product>,
    pub quantity: Option<i64>,
    pub error: Option<String>,
}

impl ScanReport {
    pub fn new(path: &Path) -> Self {
        ScanReport {
            image: path.display().to_string(),
            state: ScanState::Idle,
            barcode: None,
            symbology: None,
            product: None,
            quantity: None,
            error: None,
        }
    }

    pub fn fill_from(&mut self, view: &ScanView) {
        self.state = view.state;
        if let Some(decoded) = &view.barcode {
            self.barcode = Some(decoded.barcode.to_string());
            self.symbology = Some(decoded.symbology);
        }
        self.product = view.product.clone();
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReport {
    pub cart: Cart,
    pub summary: OrderSummary,
    pub notifications: Vec<Notification>,
}

impl CartReport {
    pub fn new(cart: Cart, config: &TrolleyConfig, notifications: Vec<Notification>) -> Self {
        let summary = cart.summary(config.tax_rate());
        CartReport {
            cart,
            summary,
            notifications,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupReport {
    pub barcode: String,
    pub product: Option<Product>,
    pub not_found: bool,
    pub error: Option<String>,
}

impl LookupReport {
    pub fn from_result(barcode: &Barcode, result: ResolveResult<Product>) -> Self {
        let (product, not_found, error) = match result {
            Ok(product) => (Some(product), false, None),
            Err(e) => (None, e.is_not_found(), Some(e.to_string())),
        };

        LookupReport {
            barcode: barcode.to_string(),
            product,
            not_found,
            error,
        }
    }
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    scans: &'a [ScanReport],
    #[serde(flatten)]
    cart: &'a CartReport,
}

#[derive(Serialize)]
struct CheckoutOutput<'a> {
    scans: &'a [ScanReport],
    receipt: &'a Receipt,
    notifications: &'a [Notification],
}

// =============================================================================
// Printers
// =============================================================================

pub fn print_scan(
    scans: &[ScanReport],
    cart: &CartReport,
    config: &TrolleyConfig,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ScanOutput { scans, cart })?);
        return Ok(());
    }

    print_scans(scans, config);
    print_notifications(&cart.notifications);

    println!();
    if cart.cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }
    println!("Cart ({} items)", cart.summary.item_count);
    print_lines(cart.cart.lines(), config);
    print_summary(&cart.summary, config);
    Ok(())
}

pub fn print_receipt(
    scans: &[ScanReport],
    receipt: &Receipt,
    notifications: Vec<Notification>,
    config: &TrolleyConfig,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let output = CheckoutOutput {
            scans,
            receipt,
            notifications: &notifications,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_scans(scans, config);
    print_notifications(&notifications);

    println!();
    println!("Order {}", receipt.order_id);
    println!("Placed {}", receipt.placed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    print_lines(&receipt.lines, config);
    print_summary(&receipt.summary, config);
    Ok(())
}

pub fn print_lookup(report: &LookupReport, config: &TrolleyConfig, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match (&report.product, &report.error) {
        (Some(product), _) => {
            println!("{}  {}", product.barcode, product.name);
            println!("  Price: {}", config.checkout.format(product.price()));
            if let Some(url) = &product.image_url {
                println!("  Image: {url}");
            }
        }
        (None, Some(error)) => println!("✗ {error}"),
        (None, None) => println!("✗ {}: no answer", report.barcode),
    }
    Ok(())
}

fn print_scans(scans: &[ScanReport], config: &TrolleyConfig) {
    for scan in scans {
        match (&scan.product, &scan.error) {
            (Some(product), None) => println!(
                "✓ {}: {} ({}) x{}",
                scan.image,
                product.name,
                config.checkout.format(product.price()),
                scan.quantity.unwrap_or(0)
            ),
            (_, Some(error)) => println!("✗ {}: {error}", scan.image),
            (None, None) => println!("- {}: {}", scan.image, scan.state),
        }
    }
}

fn print_notifications(notifications: &[Notification]) {
    for n in notifications {
        let tag = match n.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        println!("  [{tag}] {}: {}", n.title, n.description);
    }
}

fn print_lines(lines: &[CartLine], config: &TrolleyConfig) {
    for line in lines {
        println!(
            "  {:<32} {:>4} x {:>9}  {:>10}",
            line.product.name,
            line.quantity,
            config.checkout.format(line.unit_price()),
            config.checkout.format(line.line_total())
        );
    }
}

fn print_summary(summary: &OrderSummary, config: &TrolleyConfig) {
    let fmt = |m| config.checkout.format(m);
    println!("  {:<20} {:>10}", "Subtotal", fmt(summary.subtotal));
    println!("  {:<20} {:>10}", "Shipping", summary.shipping_label());
    println!(
        "  {:<20} {:>10}",
        format!("Tax ({}%)", config.tax_rate().percentage()),
        fmt(summary.tax)
    );
    println!("  {:<20} {:>10}", "Total", fmt(summary.total));
}
