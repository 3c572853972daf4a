//! Content Fetcher
//!
//! Resolves the actual content for a locator when classification from
//! the name alone is not possible: reads ephemeral handles from the
//! session blob store, issues network reads for remote locators, and
//! branches on the resolved MIME family. Successful resolutions are
//! written to the cache unconditionally.


use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::blob::BlobStore;
use crate::cache::{CacheEntry, CacheKey, PreviewCache};
use crate::classify::{extension_of, mime_for_extension};
use crate::core::config::PreviewConfig;
use crate::core::types::{ClassifiedContent, ContentKind, Locator, PreviewRequest};

/// Fallback MIME type when neither response headers nor extension nor
/// blob metadata say anything.
const OCTET_STREAM: &str = "application/octet-stream";

/// Errors that can occur while fetching or decoding content
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Access forbidden: {url}")]
    Forbidden { url: String },

    #[error("Request failed with status {status}: {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Ephemeral handle has been revoked")]
    RevokedHandle,

    #[error("Decode failed: {reason}")]
    Decode { reason: String },
}

/// Body of a completed network read.
pub struct FetchedBody {
    /// Raw response bytes.
    pub bytes: Vec<u8>,
    /// Declared `Content-Type` header, if present.
    pub content_type: Option<String>,
}

/// Seam over the network read so resolution logic can be exercised with
/// recording/failing doubles in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for the given URL.
    async fn get(&self, url: &str) -> Result<FetchedBody, FetchError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport using the configured request timeout (none by
    /// default).
    pub fn new(config: &PreviewConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| FetchError::Network {
            reason: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound {
                    url: url.to_string(),
                })
            }
            StatusCode::FORBIDDEN => {
                return Err(FetchError::Forbidden {
                    url: url.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(FetchError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
            _ => {}
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?
            .to_vec();

        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }
}

/// A completed resolution: the classified content plus the MIME type it
/// settled on.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Shared classified content, identical to the cached instance.
    pub content: Arc<ClassifiedContent>,
    /// MIME type the resolution settled on.
    pub resolved_mime: String,
}

/// Fetch-based resolver. Reads blobs or the network, classifies from the
/// actual content type, and writes the shared cache.
pub struct ContentFetcher {
    transport: Arc<dyn Transport>,
    blobs: BlobStore,
    cache: PreviewCache,
}

impl ContentFetcher {
    /// Create a fetcher over the given transport, blob store and cache.
    pub fn new(transport: Arc<dyn Transport>, blobs: BlobStore, cache: PreviewCache) -> Self {
        Self {
            transport,
            blobs,
            cache,
        }
    }

    /// Resolve a request to classified content and cache the result.
    ///
    /// Failures are terminal for this request; there is no automatic
    /// retry here. Callers offer an explicit "try again" that invokes
    /// this from scratch.
    pub async fn resolve(&self, request: &PreviewRequest) -> Result<Resolved, FetchError> {
        let (bytes, mime) = self.read_content(request).await?;
        let content = Self::classify_bytes(bytes, &mime)?;

        let entry = CacheEntry::new(content, mime.clone());
        let resolved = Resolved {
            content: Arc::clone(&entry.content),
            resolved_mime: mime,
        };
        self.cache.put(CacheKey::for_request(request), entry);

        tracing::debug!(
            locator = %request.locator,
            mime = %resolved.resolved_mime,
            "resolved preview content"
        );
        Ok(resolved)
    }

    /// Fetch the raw bytes for a locator without classification, for
    /// downloads and image-retry re-fetches.
    pub async fn fetch_bytes(&self, locator: &Locator) -> Result<FetchedBody, FetchError> {
        match locator {
            Locator::Remote(url) => self.transport.get(url).await,
            Locator::Ephemeral(handle) => {
                let record = self.blobs.read(*handle).ok_or(FetchError::RevokedHandle)?;
                Ok(FetchedBody {
                    bytes: record.bytes.to_vec(),
                    content_type: record.content_type,
                })
            }
        }
    }

    /// Read bytes and settle the MIME type for a request.
    ///
    /// For ephemeral handles the display-name extension is authoritative
    /// when present, then the type declared at registration. For remote
    /// locators the response header wins over any extension guess.
    async fn read_content(
        &self,
        request: &PreviewRequest,
    ) -> Result<(Vec<u8>, String), FetchError> {
        let name_mime = request
            .display_name
            .as_deref()
            .and_then(extension_of)
            .and_then(|ext| mime_for_extension(&ext))
            .map(str::to_string);

        match &request.locator {
            Locator::Ephemeral(handle) => {
                let record = self.blobs.read(*handle).ok_or(FetchError::RevokedHandle)?;
                let mime = name_mime
                    .or(record.content_type.clone())
                    .unwrap_or_else(|| OCTET_STREAM.to_string());
                Ok((record.bytes.to_vec(), mime))
            }
            Locator::Remote(url) => {
                tracing::debug!(%url, "fetching remote content");
                let body = self.transport.get(url).await?;
                let url_mime = extension_of(url)
                    .and_then(|ext| mime_for_extension(&ext))
                    .map(str::to_string);
                let mime = body
                    .content_type
                    .or(name_mime)
                    .or(url_mime)
                    .unwrap_or_else(|| OCTET_STREAM.to_string());
                Ok((body.bytes, mime))
            }
        }
    }

    /// Branch on the resolved MIME family and build the classified
    /// content. Text payloads must be valid UTF-8.
    fn classify_bytes(bytes: Vec<u8>, mime: &str) -> Result<ClassifiedContent, FetchError> {
        match ContentKind::from_mime(mime) {
            ContentKind::Image => Ok(ClassifiedContent::Image),
            ContentKind::Video => Ok(ClassifiedContent::Video),
            ContentKind::Pdf => Ok(ClassifiedContent::Pdf),
            ContentKind::DocumentBinary(subtype) => {
                Ok(ClassifiedContent::DocumentBinary { subtype })
            }
            ContentKind::Text => {
                let payload = String::from_utf8(bytes).map_err(|e| FetchError::Decode {
                    reason: format!("content is not valid UTF-8 text: {e}"),
                })?;
                Ok(ClassifiedContent::Text { payload })
            }
        }
    }
}
