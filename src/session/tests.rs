//! Tests for session orchestration

use super::*;
use crate::core::types::{ClassifiedContent, ContentKind, Locator};
use crate::fetch::FetchedBody;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Transport double serving text bodies. Calls to URLs containing
/// "slow" block until [`GatedTransport::release`] is called.
struct GatedTransport {
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedTransport {
    fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get(&self, url: &str) -> Result<FetchedBody, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("slow") {
            let permit = self.gate.acquire().await.map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?;
            permit.forget();
        }
        Ok(FetchedBody {
            bytes: format!("payload for {url}").into_bytes(),
            content_type: Some("text/plain".to_string()),
        })
    }
}

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn get(&self, url: &str) -> Result<FetchedBody, FetchError> {
        Err(FetchError::NotFound {
            url: url.to_string(),
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session_with(transport: Arc<dyn Transport>, config: PreviewConfig) -> Arc<PreviewSession> {
    init_tracing();
    Arc::new(PreviewSession::with_parts(
        config,
        transport,
        BlobStore::new(),
        None,
    ))
}

fn request(url: &str, name: Option<&str>) -> PreviewRequest {
    PreviewRequest::new(Locator::remote(url), name.map(str::to_string))
}

fn payload_of(outcome: &PreviewOutcome) -> String {
    match outcome {
        PreviewOutcome::Ready(resolved) => match &*resolved.content {
            ClassifiedContent::Text { payload } => payload.clone(),
            other => panic!("expected text content, got {other:?}"),
        },
        _ => panic!("expected ready outcome"),
    }
}

#[tokio::test]
async fn test_recognized_extension_classifies_without_io() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());
    let req = request("https://example.com/storage/abc", Some("photo.jpg"));

    let outcome = session.preview(&req).await.unwrap();
    match outcome {
        PreviewOutcome::Ready(resolved) => {
            assert_eq!(resolved.content.kind(), ContentKind::Image);
            assert_eq!(resolved.resolved_mime, "image/jpeg");
        }
        _ => panic!("expected ready outcome"),
    }
    // The fetch spy recorded zero network reads.
    assert_eq!(transport.calls(), 0);
    assert_eq!(session.cache().len(), 1);
}

#[tokio::test]
async fn test_second_resolve_within_ttl_hits_cache() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());
    let req = request("https://example.com/notes.txt", Some("notes.txt"));

    let first = session.preview(&req).await.unwrap();
    let second = session.preview(&req).await.unwrap();

    let (a, b) = match (&first, &second) {
        (PreviewOutcome::Ready(a), PreviewOutcome::Ready(b)) => (a, b),
        _ => panic!("expected two ready outcomes"),
    };
    // The cached instance is shared, not re-decoded.
    assert!(Arc::ptr_eq(&a.content, &b.content));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_expired_entry_refetches_and_advances_timestamp() {
    let transport = Arc::new(GatedTransport::new());
    let config = PreviewConfig::with_cache_ttl(Duration::from_millis(40));
    let session = session_with(transport.clone(), config);
    let req = request("https://example.com/notes.txt", Some("notes.txt"));
    let key = CacheKey::for_request(&req);

    session.preview(&req).await.unwrap();
    let first_write = session.cache().get(&key).unwrap().stored_at;

    tokio::time::sleep(Duration::from_millis(60)).await;
    session.preview(&req).await.unwrap();
    let second_write = session.cache().get(&key).unwrap().stored_at;

    assert_eq!(transport.calls(), 2);
    assert!(second_write > first_write);
}

#[tokio::test]
async fn test_duplicate_inflight_request_is_dropped() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());
    let req = request("https://example.com/slow.txt", Some("slow.txt"));

    let background = {
        let session = Arc::clone(&session);
        let req = req.clone();
        tokio::spawn(async move { session.preview(&req).await })
    };

    // Wait for the fetch to become outstanding.
    while !session.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let duplicate = session.preview(&req).await.unwrap();
    assert!(matches!(duplicate, PreviewOutcome::Dropped));

    transport.release();
    let original = background.await.unwrap().unwrap();
    assert!(matches!(original, PreviewOutcome::Ready(_)));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_stale_resolution_does_not_overwrite_newer_view() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());
    let old_req = request("https://example.com/slow-old.txt", Some("old.txt"));
    let new_req = request("https://example.com/new.txt", Some("new.txt"));

    let background = {
        let session = Arc::clone(&session);
        let req = old_req.clone();
        tokio::spawn(async move { session.preview(&req).await })
    };
    while !session.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // The view moves on before the old fetch completes.
    let newer = session.preview(&new_req).await.unwrap();
    assert_eq!(payload_of(&newer), "payload for https://example.com/new.txt");

    transport.release();
    let stale = background.await.unwrap().unwrap();
    assert!(matches!(stale, PreviewOutcome::Superseded));

    // The stale result still landed in the cache, harmlessly.
    assert!(session
        .cache()
        .get(&CacheKey::for_request(&old_req))
        .is_some());
    assert!(session
        .cache()
        .get(&CacheKey::for_request(&new_req))
        .is_some());
}

#[tokio::test]
async fn test_subscribers_fire_only_for_applied_results() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());

    let seen = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
    {
        let seen = Arc::clone(&seen);
        session.subscribe(move |request, _resolved| {
            seen.lock().push(request.locator.to_string());
        });
    }

    let old_req = request("https://example.com/slow-stale.txt", None);
    let new_req = request("https://example.com/fresh.txt", None);

    let background = {
        let session = Arc::clone(&session);
        let req = old_req.clone();
        tokio::spawn(async move { session.preview(&req).await })
    };
    while !session.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    session.preview(&new_req).await.unwrap();
    transport.release();
    background.await.unwrap().unwrap();

    let seen = seen.lock();
    assert_eq!(seen.as_slice(), ["https://example.com/fresh.txt"]);
}

#[tokio::test]
async fn test_fetch_failure_surfaces_once() {
    let session = session_with(Arc::new(FailingTransport), PreviewConfig::default());
    let req = request("https://example.com/gone.txt", None);

    let err = session.preview(&req).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound { .. }));
    assert!(session.cache().is_empty());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_retry_bypasses_cache() {
    let transport = Arc::new(GatedTransport::new());
    let session = session_with(transport.clone(), PreviewConfig::default());
    let req = request("https://example.com/clip.mp4", Some("clip.mp4"));

    // First pass classifies from the extension with no I/O.
    session.preview(&req).await.unwrap();
    assert_eq!(transport.calls(), 0);

    // Manual retry re-runs the full pipeline, ignoring the cached entry.
    let outcome = session.retry(&req).await.unwrap();
    assert!(matches!(outcome, PreviewOutcome::Ready(_)));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_ephemeral_request_resolves_from_blob_store() {
    let transport = Arc::new(GatedTransport::new());
    let blobs = BlobStore::new();
    let session = Arc::new(PreviewSession::with_parts(
        PreviewConfig::default(),
        transport.clone(),
        blobs.clone(),
        None,
    ));

    let handle = blobs.create(b"local draft".to_vec(), Some("text/plain".to_string()), None);
    let req = PreviewRequest::new(Locator::Ephemeral(handle), Some("draft.txt".to_string()));

    let outcome = session.preview(&req).await.unwrap();
    assert_eq!(payload_of(&outcome), "local draft");
    assert_eq!(transport.calls(), 0);
}
