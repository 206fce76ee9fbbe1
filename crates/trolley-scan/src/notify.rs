//! # Notification Sinks
//!
//! The workflow and the cart store decide *what* to tell the shopper; a
//! [`Notifier`] decides where it goes.
//!
//! ## Implementations
//! - [`ToastQueue`] - in-memory toasts that expire after their duration
//! - [`ChannelNotifier`] - forwards over a tokio channel (UI event loop)
//! - [`NoOpNotifier`] - drops everything (tests, headless use)

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::trace;
use trolley_core::Notification;

/// Receives user-facing notifications.
///
/// Must not block: it is called from inside workflow transitions.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Drops every notification.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notification: Notification) {}
}

// =============================================================================
// Toast Queue
// =============================================================================

/// Notifications waiting to be shown, each with its own expiry.
///
/// A toast disappears from [`active`](Self::active) once its
/// `duration_ms` has passed.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<VecDeque<(Notification, Instant)>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unexpired toasts, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut toasts = self.lock();
        toasts.retain(|(_, expires)| *expires > now);
        toasts.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Everything queued so far, expired or not, leaving the queue empty.
    pub fn take_all(&self) -> Vec<Notification> {
        self.lock().drain(..).map(|(n, _)| n).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<(Notification, Instant)>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        let expires = Instant::now() + Duration::from_millis(notification.duration_ms);
        trace!(title = %notification.title, "Toast queued");
        self.lock().push_back((notification, expires));
    }
}

// =============================================================================
// Channel Notifier
// =============================================================================

/// Sends notifications to whoever holds the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            trace!("Notification receiver gone, dropping");
        }
    }
}
