//! previewd - file preview resolution and caching engine
//!
//! This crate provides the core pipeline behind a file preview widget:
//! - Content-kind classification from names and extensions (no I/O)
//! - Fetch-based resolution for locators the classifier cannot decide
//! - A process-wide TTL cache keyed by (locator, display name)
//! - Line/row-windowed rendering for large text and tabular content
//! - Bounded retry for image display and a guaranteed download fallback

pub mod blob;
pub mod cache;
pub mod classify;
pub mod core;
pub mod fetch;
pub mod present;
pub mod render;
pub mod session;

// Re-export commonly used items
pub use crate::core::config::PreviewConfig;
pub use crate::core::error::{PreviewError, Result};
pub use crate::core::types::{
    BlobHandle, ClassifiedContent, ContentKind, DocumentSubtype, Locator, PreviewRequest,
};
pub use blob::{BlobStore, OwnedBlob};
pub use cache::{CacheEntry, CacheKey, CacheStats, PreviewCache};
pub use fetch::{ContentFetcher, FetchError, HttpTransport, Resolved, Transport};
pub use present::{
    error_view, view_for, DownloadPayload, Downloader, ImagePhase, ImagePresenter, PreviewView,
};
pub use render::{RenderWindow, RenderedText, TableView, TextRenderer, TextView};
pub use session::{PreviewOutcome, PreviewSession};
