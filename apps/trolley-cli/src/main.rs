//! # Smart Trolley CLI
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ─────────────────────────────────────────────►  │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: INFO, can be overridden with RUST_LOG                    │
//! │                                                                         │
//! │  2. Load Configuration ─────────────────────────────────────────────►  │
//! │     • defaults → trolley.toml → TROLLEY_* env → --db flag               │
//! │                                                                         │
//! │  3. Open Catalog ───────────────────────────────────────────────────►  │
//! │     • SQLite file (migrations run on connect), or --demo in memory      │
//! │                                                                         │
//! │  4. Wire Workflow ──────────────────────────────────────────────────►  │
//! │     • SymbolDecoder + ProductResolver + InMemoryCartStore + ToastQueue  │
//! │                                                                         │
//! │  5. Run Command ────────────────────────────────────────────────────►  │
//! │     • scan / lookup / checkout                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use trolley_core::Barcode;
use trolley_db::{Database, DbConfig};
use trolley_scan::{
    AddOutcome, InMemoryCartStore, InMemoryCatalog, ProductCatalog, ProductResolver,
    ScanOutcome, ScanWorkflow, SymbolDecoder, ToastQueue, TrolleyConfig,
};

use report::{CartReport, LookupReport, ScanReport};

#[derive(Debug, Parser)]
#[command(name = "trolley", version, about = "Scan product barcodes into a cart")]
struct Cli {
    /// Config file (default: per-user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use the built-in demo catalog instead of a database
    #[arg(long, global = true, conflicts_with = "db")]
    demo: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan each photo and add what it shows to the cart
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Look up a single barcode in the catalog
    Lookup { barcode: String },

    /// Scan photos into the cart, then place the order
    Checkout {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = TrolleyConfig::load(cli.config.clone()).context("loading configuration")?;
    if let Some(db) = &cli.db {
        config.catalog.database_path = Some(db.clone());
    }

    let (catalog, db) = open_catalog(&config, cli.demo).await?;
    let resolver = ProductResolver::new(catalog).with_timeout(config.lookup_timeout());

    let result = match cli.command {
        Command::Lookup { barcode } => lookup(&resolver, &barcode, &config, cli.json).await,
        Command::Scan { images } => {
            let (workflow, toasts) = wire(&config, resolver)?;
            let scans = scan_all(&workflow, &images).await;
            let cart = CartReport::new(workflow.cart().snapshot(), &config, toasts.take_all());
            report::print_scan(&scans, &cart, &config, cli.json)
        }
        Command::Checkout { images } => {
            let (workflow, toasts) = wire(&config, resolver)?;
            let scans = scan_all(&workflow, &images).await;
            match workflow.cart().checkout(config.tax_rate()) {
                Ok(receipt) => {
                    report::print_receipt(&scans, &receipt, toasts.take_all(), &config, cli.json)
                }
                Err(e) => {
                    let cart =
                        CartReport::new(workflow.cart().snapshot(), &config, toasts.take_all());
                    report::print_scan(&scans, &cart, &config, cli.json)?;
                    Err(anyhow::Error::new(e).context("checkout failed"))
                }
            }
        }
    };

    if let Some(db) = db {
        db.close().await;
    }
    result
}

const DEFAULT_LOG_FILTER: &str = "info,trolley=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    log_subscriber(filter).init();
}

fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

async fn open_catalog(
    config: &TrolleyConfig,
    demo: bool,
) -> anyhow::Result<(Arc<dyn ProductCatalog>, Option<Database>)> {
    if demo {
        info!("Using the in-memory demo catalog");
        let catalog: Arc<dyn ProductCatalog> = Arc::new(InMemoryCatalog::demo());
        return Ok((catalog, None));
    }

    let Some(path) = config.database_path() else {
        bail!("no catalog database path; pass --db or --demo");
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    info!(path = %path.display(), "Opening catalog");
    let db = Database::new(DbConfig::new(&path))
        .await
        .with_context(|| format!("opening catalog at {}", path.display()))?;

    if db.products().count().await? == 0 {
        warn!("Catalog is empty; run the seed binary to load the demo products");
    }

    let catalog: Arc<dyn ProductCatalog> = Arc::new(db.products());
    Ok((catalog, Some(db)))
}

fn wire(
    config: &TrolleyConfig,
    resolver: ProductResolver,
) -> anyhow::Result<(ScanWorkflow, Arc<ToastQueue>)> {
    let toasts = Arc::new(ToastQueue::new());
    let cart = InMemoryCartStore::new(toasts.clone())
        .with_durations(config.workflow.notification_ms, config.workflow.order_placed_ms);
    let decoder = SymbolDecoder::new(&config.scanner.symbologies, config.scanner.try_harder);

    let workflow = ScanWorkflow::builder()
        .with_decoder(Arc::new(decoder))
        .with_resolver(resolver)
        .with_cart(Arc::new(cart))
        .with_notifier(toasts.clone())
        .with_config(config)
        .build()?;

    Ok((workflow, toasts))
}

/// Runs select → scan → add for each image, in order.
async fn scan_all(workflow: &ScanWorkflow, images: &[PathBuf]) -> Vec<ScanReport> {
    let mut reports = Vec::with_capacity(images.len());

    for path in images {
        let mut report = ScanReport::new(path);

        if let Err(e) = workflow.select_file(path).await {
            report.error = Some(e.to_string());
            reports.push(report);
            continue;
        }

        match workflow.scan().await {
            ScanOutcome::Resolved(_) => match workflow.add_to_cart().await {
                AddOutcome::Added { quantity, .. } => report.quantity = Some(quantity),
                AddOutcome::Rejected(e) => report.error = Some(e.to_string()),
                AddOutcome::Ignored => {}
            },
            ScanOutcome::Failed(failure) => report.error = Some(failure.to_string()),
            ScanOutcome::Stale | ScanOutcome::Ignored => {}
        }

        report.fill_from(&workflow.view().await);
        reports.push(report);
    }

    reports
}

async fn lookup(
    resolver: &ProductResolver,
    raw: &str,
    config: &TrolleyConfig,
    json: bool,
) -> anyhow::Result<()> {
    let barcode = Barcode::parse(raw).with_context(|| format!("'{raw}' is not a barcode"))?;
    let report = LookupReport::from_result(&barcode, resolver.resolve(&barcode).await);
    report::print_lookup(&report, config, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_applies_per_target_levels() {
        let subscriber = log_subscriber(EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "trolley_scan", Level::INFO));
            assert!(tracing::enabled!(target: "trolley", Level::DEBUG));
            assert!(tracing::enabled!(target: "sqlx", Level::WARN));
            assert!(!tracing::enabled!(target: "sqlx", Level::DEBUG));
            assert!(!tracing::enabled!(target: "hyper", Level::TRACE));
        });
    }

    #[test]
    fn test_explicit_filter_is_respected() {
        let subscriber = log_subscriber(EnvFilter::new("warn"));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "trolley", Level::WARN));
            assert!(!tracing::enabled!(target: "trolley", Level::INFO));
        });
    }
}
