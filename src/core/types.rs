//! Preview domain types
//!
//! Defines locators, requests and the classified-content union that the
//! rest of the pipeline dispatches on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to ephemeral, session-scoped bytes (a not-yet-persisted
/// local file). Invalid after revocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlobHandle(pub(crate) u64);

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// Reference to file content, either a stable remote address or an
/// ephemeral local handle.
///
/// The two are not interchangeable: ephemeral handles cannot be
/// re-fetched after revocation and must never outlive the session that
/// created them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Stable, authorization-checked remote address.
    Remote(String),
    /// Session-scoped handle into the [`crate::blob::BlobStore`].
    Ephemeral(BlobHandle),
}

impl Locator {
    /// Create a remote locator from a URL string.
    pub fn remote(url: impl Into<String>) -> Self {
        Locator::Remote(url.into())
    }

    /// Stable string form used as the cache key component.
    pub fn cache_key(&self) -> String {
        match self {
            Locator::Remote(url) => format!("remote:{url}"),
            Locator::Ephemeral(handle) => handle.to_string(),
        }
    }

    /// The remote URL, if this locator is remote.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Locator::Remote(url) => Some(url.as_str()),
            Locator::Ephemeral(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Remote(url) => write!(f, "{url}"),
            Locator::Ephemeral(handle) => write!(f, "{handle}"),
        }
    }
}

/// A preview request: locator plus the original filename, when known.
///
/// Cache identity is the pair; the display name participates because it
/// influences extension-based classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PreviewRequest {
    /// Reference to the file content.
    pub locator: Locator,
    /// Original filename, used for classification and downloads.
    pub display_name: Option<String>,
}

impl PreviewRequest {
    /// Create a new request.
    pub fn new(locator: Locator, display_name: Option<String>) -> Self {
        Self {
            locator,
            display_name,
        }
    }

    /// File name to offer when saving: the display name when present,
    /// otherwise the last path segment of a remote URL, otherwise a
    /// generic placeholder.
    pub fn save_name(&self) -> String {
        if let Some(name) = &self.display_name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        if let Some(url) = self.locator.as_url() {
            let trimmed = url.split(['?', '#']).next().unwrap_or(url);
            if let Some(segment) = trimmed.rsplit('/').next() {
                if !segment.is_empty() {
                    return segment.to_string();
                }
            }
        }
        "download".to_string()
    }
}

/// Subtype of an office-style document with no inline renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentSubtype {
    /// Word-processing documents (doc, docx)
    Document,
    /// Spreadsheets (xls, xlsx)
    Spreadsheet,
    /// Presentations (ppt, pptx)
    Presentation,
}

/// Content-kind tag, known before any bytes exist.
///
/// `Text` is only ever produced by fetch-based resolution; the cheap
/// classifier reports text-family content as undecided so the payload
/// gets fetched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Image,
    Video,
    Pdf,
    DocumentBinary(DocumentSubtype),
    Text,
}

/// Classified content for one cache entry. Exactly one variant holds and
/// the decision is immutable for the lifetime of the entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassifiedContent {
    /// Raster or vector image, rendered from its locator.
    Image,
    /// Video, rendered from its locator.
    Video,
    /// PDF document, rendered from its locator.
    Pdf,
    /// Office-style binary with no inline renderer; degrades to download.
    DocumentBinary { subtype: DocumentSubtype },
    /// Decoded text payload.
    Text { payload: String },
}

impl ClassifiedContent {
    /// The tag for this content.
    pub fn kind(&self) -> ContentKind {
        match self {
            ClassifiedContent::Image => ContentKind::Image,
            ClassifiedContent::Video => ContentKind::Video,
            ClassifiedContent::Pdf => ContentKind::Pdf,
            ClassifiedContent::DocumentBinary { subtype } => ContentKind::DocumentBinary(*subtype),
            ClassifiedContent::Text { .. } => ContentKind::Text,
        }
    }
}

impl ContentKind {
    /// Build the payload-free classified content for a binary kind.
    ///
    /// Returns `None` for [`ContentKind::Text`], which always requires a
    /// fetched payload.
    pub fn into_content(self) -> Option<ClassifiedContent> {
        match self {
            ContentKind::Image => Some(ClassifiedContent::Image),
            ContentKind::Video => Some(ClassifiedContent::Video),
            ContentKind::Pdf => Some(ClassifiedContent::Pdf),
            ContentKind::DocumentBinary(subtype) => {
                Some(ClassifiedContent::DocumentBinary { subtype })
            }
            ContentKind::Text => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_distinguishes_remote_and_ephemeral() {
        let remote = Locator::remote("https://example.com/a");
        let ephemeral = Locator::Ephemeral(BlobHandle(1));
        assert_ne!(remote.cache_key(), ephemeral.cache_key());
        assert_eq!(remote.cache_key(), "remote:https://example.com/a");
    }

    #[test]
    fn test_save_name_prefers_display_name() {
        let req = PreviewRequest::new(
            Locator::remote("https://example.com/files/report.pdf?sig=abc"),
            Some("quarterly.pdf".to_string()),
        );
        assert_eq!(req.save_name(), "quarterly.pdf");
    }

    #[test]
    fn test_save_name_falls_back_to_url_segment() {
        let req = PreviewRequest::new(
            Locator::remote("https://example.com/files/report.pdf?sig=abc"),
            None,
        );
        assert_eq!(req.save_name(), "report.pdf");
    }

    #[test]
    fn test_save_name_placeholder_for_bare_handle() {
        let req = PreviewRequest::new(Locator::Ephemeral(BlobHandle(7)), None);
        assert_eq!(req.save_name(), "download");
    }

    #[test]
    fn test_text_kind_has_no_payload_free_content() {
        assert!(ContentKind::Text.into_content().is_none());
        assert_eq!(
            ContentKind::Pdf.into_content(),
            Some(ClassifiedContent::Pdf)
        );
    }
}
