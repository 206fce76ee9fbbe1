//! # Product Repository
//!
//! Database operations for catalog products. The scan workflow only reads
//! (`get_by_barcode`); the write operations exist for seeding and admin use.
//!
//! ## Lookup Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Decoded "7891234567891"                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE barcode = ?1   (primary key lookup)    │
//! │       │                                                                 │
//! │       ├── row    → Ok(Some(Product { "Fresh Milk 1L", 249, ... }))     │
//! │       └── no row → Ok(None)                    never an error          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use trolley_core::Product;

/// Column list matching `Product`'s `FromRow` layout.
const PRODUCT_COLUMNS: &str = "barcode, name, price_cents, image_url";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let milk = repo.get_by_barcode("7891234567891").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its exact barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product with that barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Looking up product");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    /// * `Err(DbError::ConstraintViolation)` - negative price, bad barcode
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(barcode = %product.barcode, "Inserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (barcode, name, price_cents, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.image_url)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.barcode.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Inserts the product or replaces name, price and image of the existing
    /// row with the same barcode.
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        debug!(barcode = %product.barcode, "Upserting product");

        upsert_with(&self.pool, product).await
    }

    /// Upserts a batch in a single transaction: all rows land or none do.
    pub async fn upsert_many(&self, products: &[Product]) -> DbResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for product in products {
            upsert_with(&mut *tx, product).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = products.len(), "Upserted product batch");
        Ok(products.len())
    }

    /// Deletes a product by barcode.
    pub async fn delete(&self, barcode: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE barcode = ?1")
            .bind(barcode)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", barcode));
        }

        Ok(())
    }

    /// Counts catalog products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn upsert_with<'e, E>(executor: E, product: &Product) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO products (barcode, name, price_cents, image_url, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(barcode) DO UPDATE SET
            name = excluded.name,
            price_cents = excluded.price_cents,
            image_url = excluded.image_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&product.barcode)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(&product.image_url)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// The five grocery products the demo store ships with.
pub fn demo_catalog() -> Vec<Product> {
    const PHOTO: &str = "https://images.unsplash.com";
    const SIZE: &str = "?q=80&w=800&auto=format&fit=crop";

    [
        ("7891234567890", "Organic Banana Bundle", 499, "photo-1528825871115-3581a5387919"),
        ("7891234567891", "Fresh Milk 1L", 249, "photo-1563636619-e9143da7973b"),
        ("7891234567892", "Whole Grain Bread", 329, "photo-1509440159596-0249088772ff"),
        ("7891234567893", "Free Range Eggs (12pk)", 599, "photo-1506976785307-8732e854ad03"),
        ("7891234567894", "Organic Apples (1kg)", 399, "photo-1567306226416-28f0efdc88ce"),
    ]
    .into_iter()
    .map(|(barcode, name, price_cents, photo)| {
        Product::new(barcode, name, price_cents).with_image(format!("{PHOTO}/{photo}{SIZE}"))
    })
    .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
