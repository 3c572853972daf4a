//! Error types for previewd
//!
//! Each pipeline stage defines its own error enum; this module provides
//! the crate-level aggregate.

use thiserror::Error;

/// Result type alias for previewd operations
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Main error type for previewd
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
