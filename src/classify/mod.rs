//! Content-Kind Classifier
//!
//! Pure extension-based classification. Decides the content kind from
//! the display name (preferred) or the locator string without any I/O;
//! anything it cannot decide is left to fetch-based resolution.

use crate::core::types::{ContentKind, DocumentSubtype, Locator};

/// Classify a locator from its name/extension alone.
///
/// Returns `None` when no recognized extension is present; the caller
/// must then resolve through the [`crate::fetch::ContentFetcher`].
/// Text-family extensions (including `.csv`) are deliberately undecided
/// here: a text preview always needs the fetched payload, and the
/// text-vs-tabular distinction belongs to the renderer.
pub fn classify(locator: &Locator, display_name: Option<&str>) -> Option<ContentKind> {
    let ext = display_name
        .and_then(extension_of)
        .or_else(|| locator.as_url().and_then(extension_of))?;
    kind_for_extension(&ext)
}

/// Lowercased extension of a file name or URL, with any query string or
/// fragment stripped first.
pub fn extension_of(name: &str) -> Option<String> {
    let trimmed = name.split(['?', '#']).next().unwrap_or(name);
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Map a recognized binary-kind extension to its content kind.
fn kind_for_extension(ext: &str) -> Option<ContentKind> {
    match ext {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" => Some(ContentKind::Image),
        "mp4" | "webm" | "ogg" | "mov" | "avi" => Some(ContentKind::Video),
        "pdf" => Some(ContentKind::Pdf),
        "doc" | "docx" => Some(ContentKind::DocumentBinary(DocumentSubtype::Document)),
        "xls" | "xlsx" => Some(ContentKind::DocumentBinary(DocumentSubtype::Spreadsheet)),
        "ppt" | "pptx" => Some(ContentKind::DocumentBinary(DocumentSubtype::Presentation)),
        _ => None,
    }
}

/// Expected MIME type for an extension, used when resolving ephemeral
/// handles whose display name carries an extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        _ => return None,
    };
    Some(mime)
}

impl ContentKind {
    /// Determine the content kind from a resolved MIME type.
    ///
    /// Anything outside the recognized binary families is treated as
    /// text; the fetcher then decodes the payload (and surfaces a decode
    /// error if the bytes are not valid UTF-8).
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or(mime)
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("image/") {
            return ContentKind::Image;
        }
        if essence.starts_with("video/") {
            return ContentKind::Video;
        }
        match essence.as_str() {
            "application/pdf" => ContentKind::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                ContentKind::DocumentBinary(DocumentSubtype::Document)
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                ContentKind::DocumentBinary(DocumentSubtype::Spreadsheet)
            }
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                ContentKind::DocumentBinary(DocumentSubtype::Presentation)
            }
            _ => ContentKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BlobHandle;

    #[test]
    fn test_classify_image_from_display_name() {
        let locator = Locator::remote("https://example.com/storage/abc123");
        assert_eq!(
            classify(&locator, Some("photo.JPG")),
            Some(ContentKind::Image)
        );
    }

    #[test]
    fn test_classify_video_from_url() {
        let locator = Locator::remote("https://example.com/media/clip.mp4?token=xyz");
        assert_eq!(classify(&locator, None), Some(ContentKind::Video));
    }

    #[test]
    fn test_classify_office_subtypes() {
        let locator = Locator::remote("https://example.com/f");
        assert_eq!(
            classify(&locator, Some("budget.xlsx")),
            Some(ContentKind::DocumentBinary(DocumentSubtype::Spreadsheet))
        );
        assert_eq!(
            classify(&locator, Some("slides.ppt")),
            Some(ContentKind::DocumentBinary(DocumentSubtype::Presentation))
        );
        assert_eq!(
            classify(&locator, Some("memo.doc")),
            Some(ContentKind::DocumentBinary(DocumentSubtype::Document))
        );
    }

    #[test]
    fn test_display_name_wins_over_url_extension() {
        let locator = Locator::remote("https://example.com/export.pdf");
        assert_eq!(
            classify(&locator, Some("snapshot.png")),
            Some(ContentKind::Image)
        );
    }

    #[test]
    fn test_csv_and_unknown_are_undecided() {
        let locator = Locator::remote("https://example.com/data");
        assert_eq!(classify(&locator, Some("rows.csv")), None);
        assert_eq!(classify(&locator, Some("notes.txt")), None);
        assert_eq!(classify(&locator, Some("no-extension")), None);
        assert_eq!(classify(&locator, None), None);
    }

    #[test]
    fn test_ephemeral_locator_needs_display_name() {
        let locator = Locator::Ephemeral(BlobHandle(3));
        assert_eq!(classify(&locator, None), None);
        assert_eq!(
            classify(&locator, Some("scan.pdf")),
            Some(ContentKind::Pdf)
        );
    }

    #[test]
    fn test_extension_of_strips_query_and_fragment() {
        assert_eq!(
            extension_of("https://x.io/a/b/report.PDF?sig=1#page=2"),
            Some("pdf".to_string())
        );
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of(".gitignore"), None);
        assert_eq!(extension_of("plain"), None);
    }

    #[test]
    fn test_kind_from_mime_families() {
        assert_eq!(ContentKind::from_mime("image/png"), ContentKind::Image);
        assert_eq!(
            ContentKind::from_mime("video/webm; codecs=vp9"),
            ContentKind::Video
        );
        assert_eq!(
            ContentKind::from_mime("application/pdf"),
            ContentKind::Pdf
        );
        assert_eq!(
            ContentKind::from_mime(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            ),
            ContentKind::DocumentBinary(DocumentSubtype::Spreadsheet)
        );
        assert_eq!(
            ContentKind::from_mime("text/plain; charset=utf-8"),
            ContentKind::Text
        );
        assert_eq!(
            ContentKind::from_mime("application/octet-stream"),
            ContentKind::Text
        );
    }
}
