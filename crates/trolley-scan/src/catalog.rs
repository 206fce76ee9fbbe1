//! # Product Catalog
//!
//! The read side the resolver looks products up in.
//!
//! ## Implementations
//! - [`trolley_db::ProductRepository`] - SQLite catalog
//! - [`InMemoryCatalog`] - fixed product list (demo mode, tests)

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use trolley_core::Product;
use trolley_db::{demo_catalog, ProductRepository};

use crate::error::CatalogError;

/// Fetches product records by exact barcode.
///
/// An absent product is `Ok(None)`; `Err` is reserved for a catalog that
/// could not answer.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn fetch_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CatalogError>;
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn fetch_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.get_by_barcode(barcode).await?)
    }
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// A catalog held in a map.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five demo grocery products.
    pub fn demo() -> Self {
        Self::from_products(demo_catalog())
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|p| (p.barcode.clone(), p))
            .collect();

        InMemoryCatalog {
            products: RwLock::new(products),
        }
    }

    /// Inserts or replaces a product.
    pub fn insert(&self, product: Product) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.barcode.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn fetch_by_barcode(&self, barcode: &str) -> Result<Option<Product>, CatalogError> {
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        Ok(products.get(barcode).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trolley_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let catalog = InMemoryCatalog::demo();
        assert_eq!(catalog.len(), 5);

        let eggs = catalog.fetch_by_barcode("7891234567893").await.unwrap().unwrap();
        assert_eq!(eggs.name, "Free Range Eggs (12pk)");
        assert!(catalog.fetch_by_barcode("0000000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.is_empty());

        catalog.insert(Product::new("12345678", "Old", 100));
        catalog.insert(Product::new("12345678", "New", 200));

        let product = catalog.fetch_by_barcode("12345678").await.unwrap().unwrap();
        assert_eq!(product.name, "New");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_repository_as_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().upsert_many(&demo_catalog()).await.unwrap();

        let catalog: &dyn ProductCatalog = &db.products();
        let bread = catalog.fetch_by_barcode("7891234567892").await.unwrap();
        assert_eq!(bread.unwrap().price_cents, 329);
    }

    #[tokio::test]
    async fn test_closed_repository_is_an_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        db.close().await;

        let err = repo.fetch_by_barcode("7891234567892").await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
