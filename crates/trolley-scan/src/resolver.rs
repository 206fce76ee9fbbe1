//! # Product Resolver
//!
//! Maps a validated barcode to a product, keeping "not sold here" and
//! "catalog trouble" apart.
//!
//! ```text
//! catalog answer                         resolve()
//! ──────────────                         ─────────
//! Ok(Some(valid product, same barcode))  Ok(product)
//! Ok(None)                               Err(NotFound)
//! Ok(Some(malformed record))             Err(ServiceError)
//! Err(CatalogError)                      Err(ServiceError)
//! no answer within the timeout           Err(ServiceError)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use trolley_core::{Barcode, Product};

use crate::catalog::ProductCatalog;
use crate::error::{ResolveError, ResolveResult};

#[derive(Clone)]
pub struct ProductResolver {
    catalog: Arc<dyn ProductCatalog>,
    timeout: Option<Duration>,
}

impl ProductResolver {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        ProductResolver {
            catalog,
            timeout: None,
        }
    }

    /// Bounds each lookup. `None` waits as long as the catalog takes.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Looks up the product for `barcode`.
    ///
    /// Only a [`Barcode`] is accepted, so unvalidated text can't get here.
    pub async fn resolve(&self, barcode: &Barcode) -> ResolveResult<Product> {
        let code = barcode.as_str();
        debug!(barcode = %code, "Resolving product");

        let lookup = self.catalog.fetch_by_barcode(code);
        let answer = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .map_err(|_| ResolveError::timeout(code, limit))?,
            None => lookup.await,
        };

        let product = answer
            .map_err(|e| {
                warn!(barcode = %code, error = %e, "Catalog lookup failed");
                ResolveError::service(code, e.to_string())
            })?
            .ok_or_else(|| ResolveError::NotFound {
                barcode: code.to_string(),
            })?;

        if product.barcode != code {
            warn!(barcode = %code, returned = %product.barcode, "Catalog returned a different product");
            return Err(ResolveError::service(code, "catalog returned a record for another barcode"));
        }

        if let Err(e) = product.validate() {
            warn!(barcode = %code, error = %e, "Catalog returned a malformed record");
            return Err(ResolveError::service(code, format!("malformed record: {e}")));
        }

        debug!(barcode = %code, name = %product.name, "Product resolved");
        Ok(product)
    }
}
