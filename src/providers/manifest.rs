//! Source manifest lookup with request-scoped memoization

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Manifest metadata for one source document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceManifestEntry {
    /// Document title
    pub title: Option<String>,
    /// Original filename
    pub filename: Option<String>,
    /// Canonical storage URI (e.g. a `gs://` object path)
    pub canonical_uri: Option<String>,
}

/// Trait for the manifest/source-metadata service
#[async_trait]
pub trait SourceManifest: Send + Sync {
    /// Look up manifest metadata for a source id, `None` when unknown
    async fn get_source(&self, source_id: &str) -> Result<Option<SourceManifestEntry>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Request-scoped memoizing wrapper around a manifest provider
///
/// Multiple retrieved items commonly share a source; each source id is looked
/// up at most once per request. Lookup failures are logged and treated as
/// not-found, never propagated.
pub struct ManifestCache {
    inner: Arc<dyn SourceManifest>,
    cache: DashMap<String, Option<SourceManifestEntry>>,
}

impl ManifestCache {
    /// Wrap a manifest provider for the duration of one request
    pub fn new(inner: Arc<dyn SourceManifest>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Memoized lookup
    pub async fn get(&self, source_id: &str) -> Option<SourceManifestEntry> {
        if let Some(cached) = self.cache.get(source_id) {
            return cached.clone();
        }
        let entry = match self.inner.get_source(source_id).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Manifest lookup failed for '{}': {}", source_id, e);
                None
            }
        };
        self.cache.insert(source_id.to_string(), entry.clone());
        entry
    }
}

/// Manifest provider that knows nothing, for deployments without a manifest
pub struct NullManifest;

#[async_trait]
impl SourceManifest for NullManifest {
    async fn get_source(&self, _source_id: &str) -> Result<Option<SourceManifestEntry>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingManifest {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SourceManifest for CountingManifest {
        async fn get_source(&self, source_id: &str) -> Result<Option<SourceManifestEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(SourceManifestEntry {
                title: Some(format!("Title of {}", source_id)),
                filename: None,
                canonical_uri: None,
            }))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_cache_memoizes_per_source_id() {
        let inner = Arc::new(CountingManifest {
            calls: AtomicUsize::new(0),
        });
        let cache = ManifestCache::new(inner.clone());

        let first = cache.get("doc1").await;
        let second = cache.get("doc1").await;
        let other = cache.get("doc2").await;

        assert_eq!(first.unwrap().title.as_deref(), Some("Title of doc1"));
        assert_eq!(second.unwrap().title.as_deref(), Some("Title of doc1"));
        assert_eq!(other.unwrap().title.as_deref(), Some("Title of doc2"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
