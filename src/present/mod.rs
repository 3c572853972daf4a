//! Resilient Media Presenter
//!
//! Terminal stage of the pipeline: turns classified content into a view,
//! retries failed image loads a bounded number of times through a
//! locally-owned blob locator, and guarantees a download affordance even
//! when preview fails. No fetch or decode failure propagates past this
//! layer.


use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blob::{BlobStore, OwnedBlob};
use crate::core::config::PreviewConfig;
use crate::core::types::{ClassifiedContent, DocumentSubtype, Locator, PreviewRequest};
use crate::fetch::{ContentFetcher, FetchError};
use crate::render::{RenderWindow, RenderedText, TextRenderer};

/// Image display state.
///
/// `Loading -> Displayed | Retrying -> Displayed | Failed`. `Failed` is
/// terminal; no further automatic retries occur.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImagePhase {
    Loading,
    Displayed,
    Retrying,
    Failed,
}

/// Image display driver with bounded retry.
///
/// On a load failure the presenter re-fetches the bytes and substitutes
/// a temporary blob locator it owns.
/// The temporary locator is revoked when the presenter is torn down or
/// its input locator changes; it never reaches the shared cache.
pub struct ImagePresenter {
    request: PreviewRequest,
    fetcher: Arc<ContentFetcher>,
    blobs: BlobStore,
    max_attempts: u32,
    attempts: u32,
    phase: ImagePhase,
    temp_blob: Option<OwnedBlob>,
    error_message: Option<String>,
}

impl ImagePresenter {
    /// Create a presenter for one image request.
    pub fn new(
        request: PreviewRequest,
        fetcher: Arc<ContentFetcher>,
        blobs: BlobStore,
        config: &PreviewConfig,
    ) -> Self {
        Self {
            request,
            fetcher,
            blobs,
            max_attempts: config.max_image_retries,
            attempts: 0,
            phase: ImagePhase::Loading,
            temp_blob: None,
            error_message: None,
        }
    }

    /// Current display phase.
    pub fn phase(&self) -> ImagePhase {
        self.phase
    }

    /// Retry attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Terminal error message, set once the phase is `Failed`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The locator to display from: the owned temporary blob when a
    /// retry substituted one, otherwise the original locator.
    pub fn display_locator(&self) -> Locator {
        self.temp_blob
            .as_ref()
            .map(|blob| blob.locator())
            .unwrap_or_else(|| self.request.locator.clone())
    }

    /// Record a successful load.
    pub fn mark_displayed(&mut self) {
        if self.phase != ImagePhase::Failed {
            self.phase = ImagePhase::Displayed;
        }
    }

    /// Record a load failure and decide the next step.
    ///
    /// While attempts remain, re-fetches the bytes and substitutes an
    /// owned temporary locator for the next display attempt. At the cap
    /// the presenter transitions to `Failed` and stays there.
    pub async fn on_load_failure(&mut self) -> ImagePhase {
        if self.phase == ImagePhase::Failed {
            return self.phase;
        }
        if self.attempts >= self.max_attempts {
            self.fail(format!(
                "image failed to load after {} retries",
                self.max_attempts
            ));
            return self.phase;
        }

        self.attempts += 1;
        tracing::debug!(
            locator = %self.request.locator,
            attempt = self.attempts,
            "image load failed, re-fetching as blob"
        );

        match self.fetcher.fetch_bytes(&self.request.locator).await {
            Ok(body) => {
                // Replacing the guard revokes the previous temporary blob.
                self.temp_blob = Some(self.blobs.create_owned(
                    body.bytes,
                    body.content_type,
                    self.request.display_name.clone(),
                ));
                self.phase = ImagePhase::Retrying;
            }
            Err(e) => {
                self.fail(format!("image re-fetch failed: {e}"));
            }
        }
        self.phase
    }

    /// Switch the presenter to a new request, releasing any temporary
    /// locator and resetting the retry budget.
    pub fn set_request(&mut self, request: PreviewRequest) {
        self.request = request;
        self.attempts = 0;
        self.phase = ImagePhase::Loading;
        self.temp_blob = None;
        self.error_message = None;
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(locator = %self.request.locator, %message, "image display failed");
        self.phase = ImagePhase::Failed;
        self.error_message = Some(message);
    }
}

/// The rendered preview surface handed to the embedding page.
///
/// There is always something to render: failures become an error panel
/// that still carries the download affordance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PreviewView {
    /// Image displayed from its locator.
    Image { source: Locator },
    /// Video displayed from its locator; failed loads get a manual
    /// retry plus the download fallback.
    Video { source: Locator },
    /// PDF displayed from its locator; same fallback policy as video.
    Pdf { source: Locator },
    /// Office-style binary with no inline renderer.
    DocumentFallback {
        subtype: DocumentSubtype,
        file_name: String,
    },
    /// Windowed text or table content.
    Text(RenderedText),
    /// Terminal error panel with the guaranteed download affordance.
    Error { message: String, file_name: String },
}

/// Build the view for classified content.
pub fn view_for(
    request: &PreviewRequest,
    content: &ClassifiedContent,
    renderer: &TextRenderer,
    window: &RenderWindow,
) -> PreviewView {
    match content {
        ClassifiedContent::Image => PreviewView::Image {
            source: request.locator.clone(),
        },
        ClassifiedContent::Video => PreviewView::Video {
            source: request.locator.clone(),
        },
        ClassifiedContent::Pdf => PreviewView::Pdf {
            source: request.locator.clone(),
        },
        ClassifiedContent::DocumentBinary { subtype } => PreviewView::DocumentFallback {
            subtype: *subtype,
            file_name: request.save_name(),
        },
        ClassifiedContent::Text { payload } => PreviewView::Text(renderer.render(
            payload,
            request.display_name.as_deref(),
            window,
        )),
    }
}

/// Build the error panel for a failed resolution.
pub fn error_view(request: &PreviewRequest, message: impl Into<String>) -> PreviewView {
    PreviewView::Error {
        message: message.into(),
        file_name: request.save_name(),
    }
}

/// Payload produced by the universal download action.
pub struct DownloadPayload {
    /// Name to save under, from the display name or the locator.
    pub file_name: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// The raw bytes.
    pub bytes: Vec<u8>,
}

/// Universal download fallback. Works regardless of whether preview
/// classification or rendering succeeded, as long as the locator is
/// still valid.
pub struct Downloader {
    fetcher: Arc<ContentFetcher>,
}

impl Downloader {
    /// Create a downloader over the shared fetcher.
    pub fn new(fetcher: Arc<ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the locator as binary and produce a save payload.
    pub async fn download(&self, request: &PreviewRequest) -> Result<DownloadPayload, FetchError> {
        let body = self.fetcher.fetch_bytes(&request.locator).await?;
        tracing::debug!(locator = %request.locator, bytes = body.bytes.len(), "download ready");
        Ok(DownloadPayload {
            file_name: request.save_name(),
            content_type: body.content_type,
            bytes: body.bytes,
        })
    }
}
