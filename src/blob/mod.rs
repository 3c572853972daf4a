//! Ephemeral blob store
//!
//! Session-scoped registry for not-yet-persisted local bytes. Handles
//! are the Rust rendition of revocable object URLs: reads fail after
//! revocation, and [`OwnedBlob`] ties revocation to scope exit so a
//! temporary locator cannot leak past the component that created it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::core::types::{BlobHandle, Locator};

/// Bytes and declared metadata for one registered blob.
#[derive(Clone)]
pub struct BlobRecord {
    /// The materialized bytes.
    pub bytes: Arc<Vec<u8>>,
    /// MIME type declared when the blob was registered, if any.
    pub content_type: Option<String>,
    /// Original file name, if any.
    pub name: Option<String>,
}

struct BlobStoreInner {
    blobs: DashMap<BlobHandle, BlobRecord>,
    next_id: AtomicU64,
}

/// Session-scoped store of ephemeral blobs. Cheap to clone; clones share
/// the same registry.
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<BlobStoreInner>,
}

impl BlobStore {
    /// Create an empty store for the current session.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BlobStoreInner {
                blobs: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register bytes and return a handle valid until revoked.
    pub fn create(
        &self,
        bytes: Vec<u8>,
        content_type: Option<String>,
        name: Option<String>,
    ) -> BlobHandle {
        let handle = BlobHandle(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.blobs.insert(
            handle,
            BlobRecord {
                bytes: Arc::new(bytes),
                content_type,
                name,
            },
        );
        tracing::debug!(%handle, "registered ephemeral blob");
        handle
    }

    /// Read a blob's record. Returns `None` once the handle is revoked.
    pub fn read(&self, handle: BlobHandle) -> Option<BlobRecord> {
        self.inner.blobs.get(&handle).map(|r| r.clone())
    }

    /// Revoke a handle, releasing its bytes. Returns whether the handle
    /// was still live.
    pub fn revoke(&self, handle: BlobHandle) -> bool {
        let removed = self.inner.blobs.remove(&handle).is_some();
        if removed {
            tracing::debug!(%handle, "revoked ephemeral blob");
        }
        removed
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.inner.blobs.len()
    }

    /// Whether the store holds no live handles.
    pub fn is_empty(&self) -> bool {
        self.inner.blobs.is_empty()
    }

    /// Register bytes behind an [`OwnedBlob`] guard that revokes the
    /// handle when dropped.
    pub fn create_owned(
        &self,
        bytes: Vec<u8>,
        content_type: Option<String>,
        name: Option<String>,
    ) -> OwnedBlob {
        let handle = self.create(bytes, content_type, name);
        OwnedBlob {
            store: self.clone(),
            handle,
        }
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard over an ephemeral blob: the handle is revoked on drop.
pub struct OwnedBlob {
    store: BlobStore,
    handle: BlobHandle,
}

impl OwnedBlob {
    /// The guarded handle.
    pub fn handle(&self) -> BlobHandle {
        self.handle
    }

    /// Locator form of the guarded handle.
    pub fn locator(&self) -> Locator {
        Locator::Ephemeral(self.handle)
    }
}

impl Drop for OwnedBlob {
    fn drop(&mut self) {
        self.store.revoke(self.handle);
    }
}
