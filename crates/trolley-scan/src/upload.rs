//! # Image Acquisition
//!
//! Accepts the photo a shopper picked and hands out a preview handle for it.
//!
//! ## Preview Handle Lifetime
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select(photo A) ──► UploadedImage A ──► preview://1f3c…  (live: 1)    │
//! │       │                   │                                             │
//! │       │                   ├── session holds a clone                     │
//! │       │                   └── in-flight decode holds a clone            │
//! │       ▼                                                                 │
//! │  select(photo B) ──► session drops A                                    │
//! │                      decode of A finishes, drops A ──► released        │
//! │                                                          (live: 1)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handle is released when the last clone of the image goes away, never
//! while a decoder is still reading the bytes.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use image::ImageFormat;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::ImageError;

const PREVIEW_SCHEME: &str = "preview://";

// =============================================================================
// Preview Registry
// =============================================================================

/// Tracks which preview handles are currently live.
///
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts an image payload.
    ///
    /// ## Rules
    /// - Empty payload → `ImageError::Empty`
    /// - Declared MIME type must be `image/*`
    /// - Without a MIME type the format is sniffed from the bytes
    ///
    /// No size cap is applied.
    pub fn select(&self, bytes: Vec<u8>, mime: Option<&str>) -> Result<UploadedImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let mime = match mime {
            Some(mime) => {
                let normalized = mime.trim().to_ascii_lowercase();
                if !normalized.starts_with("image/") {
                    return Err(ImageError::NotAnImage { mime: mime.to_string() });
                }
                normalized
            }
            None => image::guess_format(&bytes)
                .map_err(|_| ImageError::UnrecognizedFormat)?
                .to_mime_type()
                .to_string(),
        };

        let preview = self.allocate();
        debug!(preview = %preview.url(), mime = %mime, size = bytes.len(), "Image selected");

        Ok(UploadedImage {
            bytes: Arc::from(bytes),
            mime,
            preview: Arc::new(preview),
        })
    }

    /// Reads an image file from disk. The MIME type comes from the file
    /// extension when it has a known one, otherwise from the contents.
    pub async fn select_file(&self, path: impl AsRef<Path>) -> Result<UploadedImage, ImageError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let mime = ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type());

        self.select(bytes, mime)
    }

    /// Number of preview handles not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    fn allocate(&self) -> PreviewHandle {
        let url = format!("{PREVIEW_SCHEME}{}", Uuid::new_v4());
        self.lock().insert(url.clone());

        PreviewHandle {
            url,
            registry: self.clone(),
        }
    }

    fn release(&self, url: &str) {
        if self.lock().remove(url) {
            trace!(preview = %url, "Preview released");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // the set stays consistent even if a holder panicked
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Preview Handle
// =============================================================================

/// A displayable reference (`preview://<uuid>`) to an uploaded image.
/// Released from its registry on drop.
pub struct PreviewHandle {
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.url).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

// =============================================================================
// Uploaded Image
// =============================================================================

/// An accepted image: shared bytes plus its preview handle.
///
/// Clones are cheap and share both.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    bytes: Arc<[u8]>,
    mime: String,
    preview: Arc<PreviewHandle>,
}

impl UploadedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle on the bytes, for moving into a blocking task.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
