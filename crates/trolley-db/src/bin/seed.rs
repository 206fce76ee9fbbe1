//! # Catalog Seeder
//!
//! Loads the demo grocery catalog into a database file.
//!
//! ## Usage
//! ```bash
//! # Demo catalog into ./trolley_dev.db
//! cargo run -p trolley-db --bin seed
//!
//! # Add 500 generated filler products
//! cargo run -p trolley-db --bin seed -- --extra 500
//!
//! # Specify database path
//! cargo run -p trolley-db --bin seed -- --db ./data/catalog.db
//! ```
//!
//! Seeding is an upsert, so running it twice leaves one row per barcode.
//! Filler products use the in-store `200` barcode prefix and never collide
//! with the demo catalog.

use std::env;
use trolley_core::Product;
use trolley_db::{demo_catalog, Database, DbConfig};

const FILLER_NAMES: &[&str] = &[
    "Basmati Rice",
    "Penne Pasta",
    "Tomato Passata",
    "Greek Yogurt",
    "Cheddar Cheese",
    "Orange Juice",
    "Sparkling Water",
    "Rolled Oats",
    "Peanut Butter",
    "Green Tea",
];

const FILLER_SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 100), ("Large", 250), ("Family", 400)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut extra: usize = 0;
    let mut db_path = String::from("./trolley_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--extra" | "-e" => {
                if i + 1 < args.len() {
                    extra = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Smart Trolley Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -e, --extra <N>    Generated filler products to add (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./trolley_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    println!("🌱 Smart Trolley Catalog Seeder");
    println!("===============================");
    println!("Database: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut products = demo_catalog();
    products.extend((0..extra).map(filler_product));

    let start = std::time::Instant::now();
    let written = db.products().upsert_many(&products).await?;
    println!("✓ Upserted {written} products in {:?}", start.elapsed());

    let total = db.products().count().await?;
    println!("  Catalog now holds {total} products");

    println!();
    println!("Verifying lookup...");
    match db.products().get_by_barcode("7891234567890").await? {
        Some(product) => println!("  7891234567890 → {} ({})", product.name, product.price()),
        None => println!("  ⚠ demo product missing after seed"),
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one filler product. Deterministic in `seed`.
fn filler_product(seed: usize) -> Product {
    let name = FILLER_NAMES[seed % FILLER_NAMES.len()];
    let (size, price_addon) = FILLER_SIZES[(seed / FILLER_NAMES.len()) % FILLER_SIZES.len()];

    // $0.99 - $8.98 before the size addon
    let price_cents = 99 + ((seed * 37) % 800) as i64 + price_addon;

    Product::new(format!("200{seed:010}"), format!("{name} {size}"), price_cents)
}
