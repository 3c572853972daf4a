//! Core types, configuration and errors shared across the preview pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::PreviewConfig;
pub use error::{PreviewError, Result};
pub use types::{
    BlobHandle, ClassifiedContent, ContentKind, DocumentSubtype, Locator, PreviewRequest,
};
