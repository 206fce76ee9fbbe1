//! # Cart Store
//!
//! The shopper's cart as a shared collaborator. The scan workflow only ever
//! calls [`CartStore::add_to_cart`]; cart pages use the rest.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI action              CartStore call            Cart change          │
//! │  ─────────              ──────────────            ───────────          │
//! │  Add to cart ─────────► add_to_cart(product) ───► qty + 1 / new line  │
//! │  "+" / "-" ───────────► increment / decrement ──► qty ± 1 (min 1)     │
//! │  Quantity field ──────► update_quantity(n) ─────► qty = n (n ≥ 1)     │
//! │  Trash icon ──────────► remove_item ────────────► line removed        │
//! │  Place order ─────────► checkout(tax) ──────────► Receipt, cart empty │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use trolley_core::notification::{DEFAULT_NOTIFICATION_MS, ORDER_PLACED_MS};
use trolley_core::{Cart, CartLine, Notification, OrderSummary, Product, Receipt, TaxRate};

use crate::error::CartResult;
use crate::notify::Notifier;

/// Shared cart state.
///
/// Methods are synchronous and must not block; implementations guard their
/// state with a short-lived lock.
pub trait CartStore: Send + Sync {
    /// Adds one unit. Returns the line's new quantity.
    fn add_to_cart(&self, product: &Product) -> CartResult<i64>;

    /// Sets a line's quantity. `Ok(false)` (nothing changed) when
    /// `quantity < 1`.
    fn update_quantity(&self, barcode: &str, quantity: i64) -> CartResult<bool>;

    fn increment(&self, barcode: &str) -> CartResult<bool>;

    /// Quantity - 1. At quantity 1 this is a no-op returning `Ok(false)`.
    fn decrement(&self, barcode: &str) -> CartResult<bool>;

    /// Removes a line whatever its quantity.
    fn remove_item(&self, barcode: &str) -> CartResult<Option<CartLine>>;

    fn clear(&self);

    fn snapshot(&self) -> Cart;

    fn summary(&self, tax_rate: TaxRate) -> OrderSummary;

    /// Total units, for the cart badge.
    fn item_count(&self) -> i64;

    /// Places the order and empties the cart.
    fn checkout(&self, tax_rate: TaxRate) -> CartResult<Receipt>;
}

// =============================================================================
// In-Memory Cart Store
// =============================================================================

/// Cart held in process memory behind a mutex.
pub struct InMemoryCartStore {
    cart: Mutex<Cart>,
    notifier: Arc<dyn Notifier>,
    notification_ms: u64,
    order_placed_ms: u64,
}

impl InMemoryCartStore {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        InMemoryCartStore {
            cart: Mutex::new(Cart::new()),
            notifier,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            order_placed_ms: ORDER_PLACED_MS,
        }
    }

    /// Overrides how long removal and order notifications stay visible.
    pub fn with_durations(mut self, notification_ms: u64, order_placed_ms: u64) -> Self {
        self.notification_ms = notification_ms;
        self.order_placed_ms = order_placed_ms;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStore for InMemoryCartStore {
    fn add_to_cart(&self, product: &Product) -> CartResult<i64> {
        let quantity = self.lock().add_product(product)?;
        debug!(barcode = %product.barcode, quantity, "Cart line updated");
        Ok(quantity)
    }

    fn update_quantity(&self, barcode: &str, quantity: i64) -> CartResult<bool> {
        Ok(self.lock().update_quantity(barcode, quantity)?)
    }

    fn increment(&self, barcode: &str) -> CartResult<bool> {
        Ok(self.lock().increment(barcode)?)
    }

    fn decrement(&self, barcode: &str) -> CartResult<bool> {
        Ok(self.lock().decrement(barcode)?)
    }

    fn remove_item(&self, barcode: &str) -> CartResult<Option<CartLine>> {
        let removed = self.lock().remove_line(barcode);

        if let Some(line) = &removed {
            debug!(barcode = %barcode, "Cart line removed");
            self.notifier.notify(
                Notification::removed_from_cart(&line.product.name)
                    .with_duration_ms(self.notification_ms),
            );
        }
        Ok(removed)
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    fn summary(&self, tax_rate: TaxRate) -> OrderSummary {
        self.lock().summary(tax_rate)
    }

    fn item_count(&self) -> i64 {
        self.lock().item_count()
    }

    fn checkout(&self, tax_rate: TaxRate) -> CartResult<Receipt> {
        let receipt = self.lock().checkout(tax_rate)?;

        info!(
            order_id = %receipt.order_id,
            items = receipt.summary.item_count,
            total = %receipt.summary.total,
            "Order placed"
        );
        self.notifier
            .notify(Notification::order_placed().with_duration_ms(self.order_placed_ms));
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::notify::ToastQueue;

    fn store() -> (InMemoryCartStore, Arc<ToastQueue>) {
        let toasts = Arc::new(ToastQueue::new());
        (InMemoryCartStore::new(toasts.clone()), toasts)
    }

    fn milk() -> Product {
        Product::new("7891234567891", "Fresh Milk 1L", 249)
    }

    #[test]
    fn test_add_same_product_twice() {
        let (store, _) = store();
        assert_eq!(store.add_to_cart(&milk()).unwrap(), 1);
        assert_eq!(store.add_to_cart(&milk()).unwrap(), 2);

        let cart = store.snapshot();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_update_quantity_below_one_is_noop() {
        let (store, _) = store();
        store.add_to_cart(&milk()).unwrap();

        assert!(!store.update_quantity("7891234567891", 0).unwrap());
        assert!(store.update_quantity("7891234567891", 4).unwrap());
        assert_eq!(store.item_count(), 4);

        assert_eq!(
            store.update_quantity("00000000", 2).unwrap_err(),
            CartError::NotInCart("00000000".into())
        );
    }

    #[test]
    fn test_decrement_stops_at_one() {
        let (store, _) = store();
        store.add_to_cart(&milk()).unwrap();

        assert!(!store.decrement("7891234567891").unwrap());
        assert_eq!(store.item_count(), 1);

        assert!(store.increment("7891234567891").unwrap());
        assert!(store.decrement("7891234567891").unwrap());
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_remove_notifies_once() {
        let (store, toasts) = store();
        store.add_to_cart(&milk()).unwrap();
        store.add_to_cart(&milk()).unwrap();

        let removed = store.remove_item("7891234567891").unwrap().unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(store.remove_item("7891234567891").unwrap().is_none());

        let toasts = toasts.take_all();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].description, "Fresh Milk 1L has been removed from your cart.");
    }

    #[test]
    fn test_checkout_clears_and_notifies() {
        let (store, toasts) = store();
        assert_eq!(store.checkout(TaxRate::default()).unwrap_err(), CartError::Empty);

        store.add_to_cart(&milk()).unwrap();
        let receipt = store.checkout(TaxRate::default()).unwrap();

        assert_eq!(receipt.summary.subtotal.cents(), 249);
        assert!(store.snapshot().is_empty());

        let toasts = toasts.take_all();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Order placed!");
        assert_eq!(toasts[0].duration_ms, 4000);
    }

    #[test]
    fn test_custom_durations() {
        let toasts = Arc::new(ToastQueue::new());
        let store = InMemoryCartStore::new(toasts.clone()).with_durations(1500, 2500);
        store.add_to_cart(&milk()).unwrap();
        store.remove_item("7891234567891").unwrap();
        store.add_to_cart(&milk()).unwrap();
        store.checkout(TaxRate::zero()).unwrap();

        let durations: Vec<_> = toasts.take_all().iter().map(|n| n.duration_ms).collect();
        assert_eq!(durations, vec![1500, 2500]);
    }
}
