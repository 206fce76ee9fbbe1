//! # Notifications
//!
//! Transient messages shown to the shopper ("toasts"). The workflow decides
//! *which* message to show; delivery is up to a notifier in `trolley-scan`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How long a notification stays visible unless configured otherwise.
pub const DEFAULT_NOTIFICATION_MS: u64 = 3000;

/// "Order placed!" stays up a little longer.
pub const ORDER_PLACED_MS: u64 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A user-facing message with a title, a description and a display duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Notification {
            kind,
            title: title.into(),
            description: description.into(),
            duration_ms: DEFAULT_NOTIFICATION_MS,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn added_to_cart(product_name: &str) -> Self {
        Notification::new(
            NotificationKind::Success,
            "Added to cart",
            format!("{product_name} has been added to your cart."),
        )
    }

    pub fn removed_from_cart(product_name: &str) -> Self {
        Notification::new(
            NotificationKind::Info,
            "Removed from cart",
            format!("{product_name} has been removed from your cart."),
        )
    }

    pub fn order_placed() -> Self {
        Notification::new(
            NotificationKind::Success,
            "Order placed!",
            "Your order has been submitted successfully.",
        )
        .with_duration_ms(ORDER_PLACED_MS)
    }

    pub fn invalid_image(reason: &str) -> Self {
        Notification::new(NotificationKind::Error, "Invalid file", reason.to_string())
    }

    pub fn no_barcode_found() -> Self {
        Notification::new(
            NotificationKind::Error,
            "No barcode found",
            "We couldn't read a barcode in this image. Try a sharper, well-lit photo.",
        )
    }

    pub fn invalid_barcode(text: &str) -> Self {
        Notification::new(
            NotificationKind::Error,
            "Invalid barcode",
            format!("\"{text}\" is not a valid product barcode."),
        )
    }

    pub fn product_not_found(barcode: &str) -> Self {
        Notification::new(
            NotificationKind::Error,
            "No product found",
            format!("No product matches barcode {barcode}."),
        )
    }

    pub fn lookup_failed() -> Self {
        Notification::new(
            NotificationKind::Error,
            "Lookup failed, try again",
            "The product catalog could not be reached.",
        )
    }

    pub fn cart_rejected(reason: &str) -> Self {
        Notification::new(
            NotificationKind::Error,
            "Couldn't add to cart",
            reason.to_string(),
        )
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_messages() {
        let added = Notification::added_to_cart("Fresh Milk 1L");
        assert_eq!(added.title, "Added to cart");
        assert_eq!(added.description, "Fresh Milk 1L has been added to your cart.");
        assert_eq!(added.duration_ms, 3000);
        assert!(!added.is_error());

        let removed = Notification::removed_from_cart("Fresh Milk 1L");
        assert_eq!(removed.description, "Fresh Milk 1L has been removed from your cart.");
    }

    #[test]
    fn test_order_placed_lasts_longer() {
        let placed = Notification::order_placed();
        assert_eq!(placed.title, "Order placed!");
        assert_eq!(placed.duration_ms, 4000);
    }

    #[test]
    fn test_not_found_and_service_error_differ() {
        let not_found = Notification::product_not_found("1234567890123");
        let failed = Notification::lookup_failed();
        assert!(not_found.is_error() && failed.is_error());
        assert_ne!(not_found.title, failed.title);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_value(Notification::no_barcode_found()).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["durationMs"], 3000);
    }
}
