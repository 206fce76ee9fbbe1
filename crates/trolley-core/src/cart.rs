//! # Cart Module
//!
//! The shopping cart: lines keyed by barcode, quantity math, order summary
//! and checkout.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Action                 Method                  Effect                  │
//! │  ──────                 ──────                  ──────                  │
//! │  Scan + "Add to cart" ─► add_product() ────────► qty += 1 or new line  │
//! │  "+" button ───────────► increment() ──────────► qty += 1              │
//! │  "−" button ───────────► decrement() ──────────► qty -= 1, never < 1   │
//! │  Trash icon ───────────► remove_line() ────────► line removed          │
//! │  "Proceed to checkout" ► checkout() ───────────► Receipt, cart cleared │
//! │                                                                         │
//! │  Lines keep insertion order so the cart renders stably.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart with its quantity.
///
/// The product is a snapshot taken when it was first added; the price shown
/// in the cart does not move if the catalog changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,

    /// Always at least 1.
    pub quantity: i64,
}

impl CartLine {
    #[inline]
    pub fn barcode(&self) -> &str {
        &self.product.barcode
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.product.price()
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Summary
// =============================================================================

/// Totals shown in the cart sidebar and on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Distinct products.
    pub line_count: usize,

    /// Sum of quantities (the cart badge).
    pub item_count: i64,

    pub subtotal: Money,

    /// Always zero; rendered as "Free".
    pub shipping: Money,

    pub tax: Money,

    pub total: Money,
}

impl OrderSummary {
    /// Shipping label as shown to the shopper.
    pub fn shipping_label(&self) -> String {
        if self.shipping.is_zero() {
            "Free".to_string()
        } else {
            self.shipping.to_string()
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[ts(as = "String")]
    pub order_id: Uuid,

    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,

    pub lines: Vec<CartLine>,

    pub summary: OrderSummary,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by barcode (adding the same product bumps its quantity)
/// - Every quantity is in `1..=MAX_LINE_QUANTITY`
/// - At most `MAX_CART_LINES` distinct lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1
    /// - Not in cart: new line at quantity 1
    ///
    /// Returns the resulting quantity of that line.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<i64> {
        if let Some(line) = self.find_mut(&product.barcode) {
            let requested = line.quantity + 1;
            if requested > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = requested;
            return Ok(requested);
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        Ok(1)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Returns
    /// - `Ok(true)` when the quantity was changed
    /// - `Ok(false)` when `quantity < 1` (no-op; removal is explicit)
    /// - `Err(NotInCart)` when no line has that barcode
    /// - `Err(QuantityTooLarge)` above the per-line maximum
    pub fn update_quantity(&mut self, barcode: &str, quantity: i64) -> CoreResult<bool> {
        let line = self
            .find_mut(barcode)
            .ok_or_else(|| CoreError::NotInCart(barcode.to_string()))?;

        if quantity < 1 {
            return Ok(false);
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        line.quantity = quantity;
        Ok(true)
    }

    /// Quantity + 1.
    pub fn increment(&mut self, barcode: &str) -> CoreResult<bool> {
        let current = self.quantity_of(barcode)?;
        self.update_quantity(barcode, current + 1)
    }

    /// Quantity − 1. At quantity 1 this is a no-op returning `Ok(false)`.
    pub fn decrement(&mut self, barcode: &str) -> CoreResult<bool> {
        let current = self.quantity_of(barcode)?;
        self.update_quantity(barcode, current - 1)
    }

    /// Removes a line regardless of its quantity.
    pub fn remove_line(&mut self, barcode: &str) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.barcode() == barcode)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, barcode: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.barcode() == barcode)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Computes the order summary. Tax is applied once to the subtotal.
    ///
    /// ```rust
    /// use trolley_core::cart::Cart;
    /// use trolley_core::types::{Product, TaxRate};
    ///
    /// let mut cart = Cart::new();
    /// cart.add_product(&Product::new("7891234567891", "Fresh Milk 1L", 249)).unwrap();
    /// let summary = cart.summary(TaxRate::from_bps(1000));
    /// assert_eq!(summary.tax.cents(), 25);
    /// assert_eq!(summary.shipping_label(), "Free");
    /// ```
    pub fn summary(&self, tax_rate: TaxRate) -> OrderSummary {
        let subtotal = self.subtotal();
        let shipping = Money::zero();
        let tax = subtotal.calculate_tax(tax_rate);

        OrderSummary {
            line_count: self.line_count(),
            item_count: self.item_count(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Places the order: returns a receipt and empties the cart.
    ///
    /// An empty cart cannot be checked out.
    pub fn checkout(&mut self, tax_rate: TaxRate) -> CoreResult<Receipt> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let summary = self.summary(tax_rate);
        let lines = std::mem::take(&mut self.lines);

        Ok(Receipt {
            order_id: Uuid::new_v4(),
            placed_at: Utc::now(),
            lines,
            summary,
        })
    }

    fn find_mut(&mut self, barcode: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.barcode() == barcode)
    }

    fn quantity_of(&self, barcode: &str) -> CoreResult<i64> {
        self.line(barcode)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::NotInCart(barcode.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn banana() -> Product {
        Product::new("7891234567890", "Organic Banana Bundle", 499)
    }

    fn milk() -> Product {
        Product::new("7891234567891", "Fresh Milk 1L", 249)
    }

    fn eggs() -> Product {
        Product::new("7891234567893", "Free Range Eggs (12pk)", 599)
    }

    #[test]
    fn test_add_same_product_twice_is_one_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_product(&banana()).unwrap(), 1);
        assert_eq!(cart.add_product(&banana()).unwrap(), 2);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal().cents(), 998);
    }

    #[test]
    fn test_decrement_at_one_is_noop() {
        let mut cart = Cart::new();
        cart.add_product(&milk()).unwrap();

        assert_eq!(cart.decrement("7891234567891").unwrap(), false);
        assert_eq!(cart.line("7891234567891").unwrap().quantity, 1);

        assert_eq!(cart.update_quantity("7891234567891", 0).unwrap(), false);
        assert_eq!(cart.update_quantity("7891234567891", -5).unwrap(), false);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_increment_then_decrement() {
        let mut cart = Cart::new();
        cart.add_product(&milk()).unwrap();

        assert!(cart.increment("7891234567891").unwrap());
        assert!(cart.increment("7891234567891").unwrap());
        assert_eq!(cart.item_count(), 3);

        assert!(cart.decrement("7891234567891").unwrap());
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_unknown_line_is_not_in_cart() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.increment("00000000"),
            Err(CoreError::NotInCart("00000000".to_string()))
        );
        assert!(cart.remove_line("00000000").is_none());
    }

    #[test]
    fn test_remove_line_is_unconditional() {
        let mut cart = Cart::new();
        cart.add_product(&eggs()).unwrap();
        cart.update_quantity("7891234567893", 7).unwrap();

        let removed = cart.remove_line("7891234567893").unwrap();
        assert_eq!(removed.quantity, 7);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new();
        cart.add_product(&milk()).unwrap();
        cart.update_quantity("7891234567891", MAX_LINE_QUANTITY).unwrap();

        assert!(matches!(
            cart.add_product(&milk()),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            let product = Product::new(format!("{:013}", i), format!("Item {i}"), 100);
            cart.add_product(&product).unwrap();
        }

        let one_too_many = Product::new("9999999999999", "Overflow", 100);
        assert_eq!(
            cart.add_product(&one_too_many),
            Err(CoreError::CartTooLarge { max: MAX_CART_LINES })
        );
    }

    #[test]
    fn test_checkout_scenario() {
        let mut cart = Cart::new();
        cart.add_product(&banana()).unwrap();
        cart.add_product(&milk()).unwrap();
        cart.add_product(&milk()).unwrap();
        cart.add_product(&eggs()).unwrap();

        let receipt = cart.checkout(TaxRate::from_bps(1000)).unwrap();

        assert_eq!(receipt.summary.subtotal.cents(), 1596);
        assert_eq!(receipt.summary.tax.cents(), 160);
        assert_eq!(receipt.summary.total.cents(), 1756);
        assert_eq!(receipt.summary.item_count, 4);
        assert_eq!(receipt.summary.line_count, 3);
        assert_eq!(receipt.lines.len(), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let mut cart = Cart::new();
        assert_eq!(cart.checkout(TaxRate::default()), Err(CoreError::EmptyCart));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_product(&eggs()).unwrap();
        cart.add_product(&banana()).unwrap();
        cart.add_product(&eggs()).unwrap();

        let order: Vec<&str> = cart.lines().iter().map(|l| l.barcode()).collect();
        assert_eq!(order, vec!["7891234567893", "7891234567890"]);
    }

    proptest! {
        #[test]
        fn quantities_never_drop_below_one(ops in prop::collection::vec(-3i64..5, 1..40)) {
            let mut cart = Cart::new();
            cart.add_product(&milk()).unwrap();

            for op in ops {
                let _ = match op {
                    -3 => cart.decrement("7891234567891"),
                    4 => cart.increment("7891234567891"),
                    n => cart.update_quantity("7891234567891", n),
                };
                let qty = cart.line("7891234567891").unwrap().quantity;
                prop_assert!(qty >= 1);
            }
        }

        #[test]
        fn total_is_subtotal_plus_tax(prices in prop::collection::vec(0i64..100_000, 1..20)) {
            let mut cart = Cart::new();
            for (i, price) in prices.iter().enumerate() {
                let product = Product::new(format!("{:08}", i), "Item", *price);
                cart.add_product(&product).unwrap();
            }

            let summary = cart.summary(TaxRate::from_bps(1000));
            prop_assert_eq!(summary.subtotal.cents(), prices.iter().sum::<i64>());
            prop_assert_eq!(summary.total, summary.subtotal + summary.tax);
            prop_assert!(summary.shipping.is_zero());
        }
    }
}
