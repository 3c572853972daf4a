//! Content Cache
//!
//! Process-wide TTL cache for classified preview content, keyed by the
//! (locator, display name) pair. Staleness is checked lazily on read;
//! writes are unconditional overwrites and entries are immutable once
//! stored.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::core::types::{ClassifiedContent, PreviewRequest};

/// Cache key: the locator's stable string form plus the display name.
///
/// Two requests for the same locator under different display names are
/// distinct entries, because the display name influences classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Stable string form of the locator.
    pub locator: String,
    /// Display name, when the request carried one.
    pub display_name: Option<String>,
}

impl CacheKey {
    /// Build the key for a request.
    pub fn for_request(request: &PreviewRequest) -> Self {
        Self {
            locator: request.locator.cache_key(),
            display_name: request.display_name.clone(),
        }
    }
}

/// One cached resolution. Never patched in place; a stale entry is
/// superseded by a full overwrite.
#[derive(Clone)]
pub struct CacheEntry {
    /// The classified content, shared with readers.
    pub content: Arc<ClassifiedContent>,
    /// MIME type the resolution settled on.
    pub resolved_mime: String,
    /// Write time; age is measured from here, not from last read.
    pub stored_at: Instant,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(content: ClassifiedContent, resolved_mime: String) -> Self {
        Self {
            content: Arc::new(content),
            resolved_mime,
            stored_at: Instant::now(),
        }
    }
}

struct CacheInner {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

/// Shared TTL cache for classified content. Cheap to clone; clones share
/// the same entries. One instance lives for the process (or for a test).
#[derive(Clone)]
pub struct PreviewCache {
    inner: Arc<CacheInner>,
}

impl PreviewCache {
    /// Create a cache with the given freshness window.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                ttl,
            }),
        }
    }

    /// Look up a fresh entry. A stale entry (age >= TTL) is treated
    /// identically to absence and left for the next write to overwrite.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.inner.entries.get(key)?;
        if entry.stored_at.elapsed() >= self.inner.ttl {
            tracing::debug!(locator = %key.locator, "cache entry stale");
            return None;
        }
        Some(entry.clone())
    }

    /// Store an entry, unconditionally replacing any prior one.
    pub fn put(&self, key: CacheKey, entry: CacheEntry) {
        tracing::debug!(locator = %key.locator, mime = %entry.resolved_mime, "cache write");
        self.inner.entries.insert(key, entry);
    }

    /// Number of entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    /// Point-in-time freshness counters.
    pub fn stats(&self) -> CacheStats {
        let mut fresh = 0;
        let mut stale = 0;
        for entry in self.inner.entries.iter() {
            if entry.stored_at.elapsed() >= self.inner.ttl {
                stale += 1;
            } else {
                fresh += 1;
            }
        }
        CacheStats {
            entries: fresh + stale,
            fresh,
            stale,
        }
    }
}

/// Snapshot of cache occupancy, split by freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Total stored entries, fresh or stale.
    pub entries: usize,
    /// Entries younger than the TTL.
    pub fresh: usize,
    /// Entries past the TTL, awaiting overwrite.
    pub stale: usize,
}
