//! Pipeline configuration.

use std::time::Duration;

/// Default freshness window for cache entries (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default number of lines/rows shown before any expansion.
const DEFAULT_INITIAL_WINDOW: usize = 20;

/// Default "show more" step.
const DEFAULT_WINDOW_CHUNK: usize = 50;

/// Default cap on automatic image re-load attempts.
const DEFAULT_MAX_IMAGE_RETRIES: u32 = 2;

/// Configuration for the preview pipeline.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Freshness window for cache entries, measured from write time.
    /// There is no sliding expiry.
    pub cache_ttl: Duration,
    /// Lines/rows visible before any expansion; collapse resets to this.
    pub initial_window: usize,
    /// How many lines/rows each "show more" adds.
    pub window_chunk: usize,
    /// Automatic re-load attempts for failed image display.
    pub max_image_retries: u32,
    /// Optional network timeout. `None` leaves fetches unbounded; a stuck
    /// fetch then keeps its widget in the loading state indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            initial_window: DEFAULT_INITIAL_WINDOW,
            window_chunk: DEFAULT_WINDOW_CHUNK,
            max_image_retries: DEFAULT_MAX_IMAGE_RETRIES,
            request_timeout: None,
        }
    }
}

impl PreviewConfig {
    /// Create a configuration with a custom cache TTL.
    pub fn with_cache_ttl(cache_ttl: Duration) -> Self {
        Self {
            cache_ttl,
            ..Default::default()
        }
    }
}
