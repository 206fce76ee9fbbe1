//! # Scan Session State
//!
//! The visible states of one scan attempt and the read-only view a UI renders.
//!
//! ## State Machine
//! ```text
//!                 select image (from any state)
//!        ┌──────────────────────────────────────────────┐
//!        ▼                                              │
//!   ┌────────┐  select  ┌───────────────┐  scan  ┌──────────┐
//!   │  Idle  │ ───────► │ ImageSelected │ ─────► │ Scanning │
//!   └────────┘          └───────────────┘        └────┬─────┘
//!        ▲                      ▲           ok ┌──────┴──────┐ err
//!        │ reset after          │              ▼             ▼
//!        │ delay           ┌────┴────┐   ┌──────────┐  ┌────────┐
//!        └──────────────── │  Added  │◄──│ Resolved │  │ Failed │──► scan (retry)
//!                          └─────────┘add└──────────┘  └────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::{DecodedBarcode, Product};

/// Token identifying one scan session.
///
/// Strictly increasing: every image selection and every reset mints a new
/// one, so an async result tagged with an older id is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        SessionId(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id that supersedes this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        SessionId(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ScanState {
    #[default]
    Idle,
    ImageSelected,
    Scanning,
    Resolved,
    Failed,
    Added,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::ImageSelected => "imageSelected",
            ScanState::Scanning => "scanning",
            ScanState::Resolved => "resolved",
            ScanState::Failed => "failed",
            ScanState::Added => "added",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the scan workflow for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScanView {
    pub state: ScanState,
    pub session: SessionId,
    pub preview_url: Option<String>,
    pub barcode: Option<DecodedBarcode>,
    pub product: Option<Product>,
    pub added: bool,
}

impl ScanView {
    /// Whether the "Scan barcode" button is enabled.
    pub fn can_scan(&self) -> bool {
        matches!(self.state, ScanState::ImageSelected | ScanState::Failed)
    }

    /// Whether the "Add to cart" button is enabled.
    pub fn can_add(&self) -> bool {
        self.state == ScanState::Resolved && self.product.is_some()
    }

    /// Whether a spinner should be shown.
    pub fn is_busy(&self) -> bool {
        self.state == ScanState::Scanning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_increase() {
        let first = SessionId::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(second.to_string(), "#1");
    }

    #[test]
    fn test_view_affordances() {
        let mut view = ScanView::default();
        assert!(!view.can_scan());
        assert!(!view.can_add());

        view.state = ScanState::ImageSelected;
        assert!(view.can_scan());

        view.state = ScanState::Scanning;
        assert!(view.is_busy());
        assert!(!view.can_scan());

        view.state = ScanState::Resolved;
        assert!(!view.can_add());
        view.product = Some(Product::new("7891234567892", "Whole Grain Bread", 329));
        assert!(view.can_add());

        view.state = ScanState::Failed;
        assert!(view.can_scan());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_string(&ScanState::ImageSelected).unwrap();
        assert_eq!(json, "\"imageSelected\"");
    }
}
