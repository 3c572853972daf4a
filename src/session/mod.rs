//! Preview session orchestration
//!
//! One `PreviewSession` drives the pipeline for a preview widget: cheap
//! classification first, then the shared cache, then fetch-based
//! resolution with a single-flight guard for duplicate requests and a
//! latest-request-wins check so a stale resolution never updates a view
//! that has moved on. Content changes are announced through explicitly
//! registered subscribers, not an ambient event bus.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::blob::BlobStore;
use crate::cache::{CacheEntry, CacheKey, PreviewCache};
use crate::classify::{classify, extension_of, mime_for_extension};
use crate::core::config::PreviewConfig;
use crate::core::types::PreviewRequest;
use crate::fetch::{ContentFetcher, FetchError, HttpTransport, Resolved, Transport};
use crate::present::{Downloader, ImagePresenter};

/// Callback invoked when a request's content becomes available.
type ContentSubscriber = Box<dyn Fn(&PreviewRequest, &Resolved) + Send + Sync>;

/// Outcome of a preview call.
#[derive(Debug, Clone)]
pub enum PreviewOutcome {
    /// Content is available and applies to the current view.
    Ready(Resolved),
    /// Dropped: an identical request is already in flight.
    Dropped,
    /// The resolution completed for a request that has since been
    /// superseded. The result is cached but was not applied.
    Superseded,
}

/// Pipeline owner for one preview surface.
pub struct PreviewSession {
    config: PreviewConfig,
    cache: PreviewCache,
    blobs: BlobStore,
    fetcher: Arc<ContentFetcher>,
    /// Key of the request the view currently wants.
    current: Mutex<Option<CacheKey>>,
    /// Key of the request a fetch is outstanding for.
    inflight: Mutex<Option<CacheKey>>,
    subscribers: Mutex<Vec<ContentSubscriber>>,
}

impl PreviewSession {
    /// Create a session with a real HTTP transport and its own cache
    /// and blob store.
    pub fn new(config: PreviewConfig) -> Result<Self, FetchError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_parts(
            config,
            transport,
            BlobStore::new(),
            None,
        ))
    }

    /// Create a session over an injected transport and blob store,
    /// optionally sharing an existing cache with other sessions.
    pub fn with_parts(
        config: PreviewConfig,
        transport: Arc<dyn Transport>,
        blobs: BlobStore,
        cache: Option<PreviewCache>,
    ) -> Self {
        let cache = cache.unwrap_or_else(|| PreviewCache::new(config.cache_ttl));
        let fetcher = Arc::new(ContentFetcher::new(
            transport,
            blobs.clone(),
            cache.clone(),
        ));
        Self {
            config,
            cache,
            blobs,
            fetcher,
            current: Mutex::new(None),
            inflight: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Resolve a request through classification, cache and fetch.
    ///
    /// The caller renders a loading indicator while this is pending.
    pub async fn preview(&self, request: &PreviewRequest) -> Result<PreviewOutcome, FetchError> {
        let key = CacheKey::for_request(request);
        *self.current.lock() = Some(key.clone());

        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(locator = %request.locator, "cache hit");
            let resolved = Resolved {
                content: entry.content,
                resolved_mime: entry.resolved_mime,
            };
            self.notify(request, &resolved);
            return Ok(PreviewOutcome::Ready(resolved));
        }

        // Cheap decision from the name alone; binary kinds need no
        // payload, so no I/O happens here.
        if let Some(kind) = classify(&request.locator, request.display_name.as_deref()) {
            if let Some(content) = kind.into_content() {
                let mime = request
                    .display_name
                    .as_deref()
                    .and_then(extension_of)
                    .or_else(|| request.locator.as_url().and_then(extension_of))
                    .and_then(|ext| mime_for_extension(&ext))
                    .unwrap_or("application/octet-stream")
                    .to_string();

                tracing::debug!(locator = %request.locator, %mime, "classified without fetch");
                let entry = CacheEntry::new(content, mime.clone());
                let resolved = Resolved {
                    content: Arc::clone(&entry.content),
                    resolved_mime: mime,
                };
                self.cache.put(key, entry);
                self.notify(request, &resolved);
                return Ok(PreviewOutcome::Ready(resolved));
            }
        }

        self.resolve_applying(request, key).await
    }

    /// Explicit "try again": restarts the resolve pipeline from scratch,
    /// bypassing both the cache and cheap classification.
    pub async fn retry(&self, request: &PreviewRequest) -> Result<PreviewOutcome, FetchError> {
        let key = CacheKey::for_request(request);
        *self.current.lock() = Some(key.clone());
        self.resolve_applying(request, key).await
    }

    /// Whether a fetch is outstanding for this session.
    pub fn is_loading(&self) -> bool {
        self.inflight.lock().is_some()
    }

    /// Register a content-changed subscriber. Subscribers run for every
    /// resolution that is applied to the view (never for superseded or
    /// dropped requests).
    pub fn subscribe(&self, f: impl Fn(&PreviewRequest, &Resolved) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(f));
    }

    /// The shared cache.
    pub fn cache(&self) -> &PreviewCache {
        &self.cache
    }

    /// The session blob store.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Session configuration.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Downloader over this session's fetcher.
    pub fn downloader(&self) -> Downloader {
        Downloader::new(Arc::clone(&self.fetcher))
    }

    /// Image presenter for a request, sharing this session's fetcher and
    /// blob store.
    pub fn image_presenter(&self, request: PreviewRequest) -> ImagePresenter {
        ImagePresenter::new(
            request,
            Arc::clone(&self.fetcher),
            self.blobs.clone(),
            &self.config,
        )
    }

    async fn resolve_applying(
        &self,
        request: &PreviewRequest,
        key: CacheKey,
    ) -> Result<PreviewOutcome, FetchError> {
        {
            let mut inflight = self.inflight.lock();
            if inflight.as_ref() == Some(&key) {
                tracing::debug!(locator = %request.locator, "duplicate request dropped");
                return Ok(PreviewOutcome::Dropped);
            }
            *inflight = Some(key.clone());
        }

        let result = self.fetcher.resolve(request).await;

        {
            let mut inflight = self.inflight.lock();
            if inflight.as_ref() == Some(&key) {
                *inflight = None;
            }
        }

        // Latest request wins: a resolution for a locator the view has
        // moved away from stays cached but is never applied.
        let superseded = self.current.lock().as_ref() != Some(&key);
        match result {
            Ok(resolved) => {
                if superseded {
                    tracing::debug!(locator = %request.locator, "stale resolution not applied");
                    return Ok(PreviewOutcome::Superseded);
                }
                self.notify(request, &resolved);
                Ok(PreviewOutcome::Ready(resolved))
            }
            Err(e) if superseded => {
                tracing::debug!(locator = %request.locator, error = %e, "stale failure ignored");
                Ok(PreviewOutcome::Superseded)
            }
            Err(e) => Err(e),
        }
    }

    fn notify(&self, request: &PreviewRequest, resolved: &Resolved) {
        for subscriber in self.subscribers.lock().iter() {
            subscriber(request, resolved);
        }
    }
}
