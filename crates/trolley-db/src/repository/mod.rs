//! # Repository Module
//!
//! Database access behind a typed API.
//!
//! ```text
//! ProductResolver
//!      │
//!      │  db.products().get_by_barcode("7891234567890")
//!      ▼
//! ProductRepository
//! ├── get_by_barcode(&self, barcode)
//! ├── insert(&self, product)
//! ├── upsert(&self, product)
//! ├── upsert_many(&self, products)
//! ├── list(&self, limit)
//! └── count(&self)
//!      │
//!      ▼
//! SQLite products table
//! ```

pub mod product;
