//! Memoized full-collection source listing.
//!
//! The scan walks the whole collection, so its result is cached for the
//! process lifetime. The underlying collection can change, so the cache
//! exposes an explicit invalidation hook instead of being a silent
//! forever-cache.

use std::collections::BTreeSet;

use tokio::sync::RwLock;
use tracing::info;

use crate::errors::rag_query_error::RagQueryError;
use crate::providers::VectorStore;

/// Cache of the de-duplicated `source` values across the active collection.
pub struct SourceCache {
    inner: RwLock<Option<BTreeSet<String>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached source set, scanning the collection on first use.
    ///
    /// Only successful scans are cached; a failed scan is retried on the
    /// next call.
    pub async fn get_or_scan(
        &self,
        store: &dyn VectorStore,
    ) -> Result<BTreeSet<String>, RagQueryError> {
        if let Some(cached) = self.inner.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut guard = self.inner.write().await;
        // Another caller may have completed the scan while we waited.
        if let Some(cached) = guard.as_ref() {
            return Ok(cached.clone());
        }

        let scanned = store.scan_sources().await?;
        info!(
            target: "rag_query::sources",
            sources = scanned.len(),
            "source scan cached"
        );
        *guard = Some(scanned.clone());
        Ok(scanned)
    }

    /// Drops the cached set; the next lookup rescans the collection.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
        info!(target: "rag_query::sources", "source cache invalidated");
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}
