//! Source attribution: per-document page/timestamp aggregation and URLs

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::providers::{ManifestCache, SourceManifest, SourceManifestEntry};
use crate::types::{ExcerptItem, LocationAnchor, SourceRecord, SummaryItem, TimeSegment};

/// Builds the cited-source list for one request
///
/// Manifest lookups are memoized per request through [`ManifestCache`].
pub struct AttributionBuilder {
    manifest: ManifestCache,
    storage: StorageConfig,
}

impl AttributionBuilder {
    /// Create a builder for one request
    pub fn new(manifest: Arc<dyn SourceManifest>, storage: StorageConfig) -> Self {
        Self {
            manifest: ManifestCache::new(manifest),
            storage,
        }
    }

    /// Aggregate attribution across every item used in synthesis, then keep
    /// only sources referenced by at least one citation
    pub async fn build(
        &self,
        summaries: &[SummaryItem],
        excerpts: &[ExcerptItem],
        citations: &[String],
    ) -> Vec<SourceRecord> {
        let mut order: Vec<String> = Vec::new();
        let mut records: HashMap<String, SourceRecord> = HashMap::new();
        let mut position = 0usize;

        for summary in summaries {
            position += 1;
            self.accumulate(
                &mut order,
                &mut records,
                &summary.source_id,
                summary.title.as_deref(),
                summary.filename.as_deref(),
                None,
                position,
            )
            .await;
        }

        for excerpt in excerpts {
            position += 1;
            self.accumulate(
                &mut order,
                &mut records,
                &excerpt.source_id,
                excerpt.title.as_deref(),
                excerpt.filename.as_deref(),
                excerpt.anchor.as_ref(),
                position,
            )
            .await;
        }

        let mut sources: Vec<SourceRecord> = order
            .into_iter()
            .filter_map(|id| records.remove(&id))
            .map(finalize_record)
            .collect();

        sources.retain(|source| is_cited(source, citations));
        sources
    }

    /// Merge one item into the per-source record, creating it on first sight
    #[allow(clippy::too_many_arguments)]
    async fn accumulate(
        &self,
        order: &mut Vec<String>,
        records: &mut HashMap<String, SourceRecord>,
        source_id: &str,
        item_title: Option<&str>,
        item_filename: Option<&str>,
        anchor: Option<&LocationAnchor>,
        position: usize,
    ) {
        if !records.contains_key(source_id) {
            let entry = self.manifest.get(source_id).await;
            let filename = item_filename
                .map(|f| f.to_string())
                .or_else(|| entry.as_ref().and_then(|e| e.filename.clone()));
            let title = resolve_title(item_title, entry.as_ref(), filename.as_deref(), source_id, position);
            let url = self.resolve_url(entry.as_ref(), filename.as_deref());

            order.push(source_id.to_string());
            records.insert(
                source_id.to_string(),
                SourceRecord {
                    source_id: source_id.to_string(),
                    title,
                    filename,
                    url,
                    pages: Vec::new(),
                    time_ranges: Vec::new(),
                    page_range: String::new(),
                },
            );
        }

        let record = records.get_mut(source_id).expect("record just inserted");
        match anchor {
            Some(LocationAnchor::Page(page)) => record.pages.push(*page),
            Some(LocationAnchor::TimeRange {
                start_secs,
                end_secs,
            }) => record.time_ranges.push(TimeSegment {
                start_secs: *start_secs,
                end_secs: *end_secs,
            }),
            None => {}
        }
    }

    /// Resolve a browsable URL: manifest URI first, else the configured
    /// bucket/prefix/filename convention
    fn resolve_url(
        &self,
        entry: Option<&SourceManifestEntry>,
        filename: Option<&str>,
    ) -> Option<String> {
        if let Some(uri) = entry.and_then(|e| e.canonical_uri.as_deref()) {
            return Some(browsable_url(uri));
        }
        match (&self.storage.bucket, filename) {
            (Some(bucket), Some(filename)) => Some(browsable_url(&format!(
                "gs://{}/{}{}",
                bucket, self.storage.prefix, filename
            ))),
            _ => None,
        }
    }
}

/// Title preference: item title, manifest title, filename, source id,
/// positional fallback
fn resolve_title(
    item_title: Option<&str>,
    entry: Option<&SourceManifestEntry>,
    filename: Option<&str>,
    source_id: &str,
    position: usize,
) -> String {
    item_title
        .map(|t| t.to_string())
        .or_else(|| entry.and_then(|e| e.title.clone()))
        .or_else(|| filename.map(|f| f.to_string()))
        .or_else(|| {
            if source_id.is_empty() {
                None
            } else {
                Some(source_id.to_string())
            }
        })
        .unwrap_or_else(|| format!("Document {}", position))
}

/// Rewrite `gs://` URIs to the https storage browser; other URIs pass through
pub fn browsable_url(uri: &str) -> String {
    match uri.strip_prefix("gs://") {
        Some(path) => format!("https://storage.cloud.google.com/{}", path),
        None => uri.to_string(),
    }
}

/// Sort and dedup the page list, format the range string, order time ranges
fn finalize_record(mut record: SourceRecord) -> SourceRecord {
    record.pages.sort_unstable();
    record.pages.dedup();
    record.page_range = format_page_range(&record.pages);
    record
        .time_ranges
        .sort_by(|a, b| a.start_secs.partial_cmp(&b.start_secs).unwrap_or(std::cmp::Ordering::Equal));
    record
}

/// Collapse a sorted page list into a compact range string
///
/// Contiguous runs become `start-end`, isolated pages stand alone, joined by
/// ", ": `[1,2,3,5,6,10]` → `"1-3, 5-6, 10"`.
pub fn format_page_range(pages: &[u32]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0usize;

    while i < pages.len() {
        let start = pages[i];
        let mut end = start;
        while i + 1 < pages.len() && pages[i + 1] == end + 1 {
            i += 1;
            end = pages[i];
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
        i += 1;
    }

    parts.join(", ")
}

/// The source filter preserved from the original behavior: a source is kept
/// when its title (case-insensitive) or source id appears inside at least one
/// citation string. Heuristic by design; short generic titles can over-match.
fn is_cited(source: &SourceRecord, citations: &[String]) -> bool {
    let title_lower = source.title.to_lowercase();
    citations.iter().any(|citation| {
        citation.to_lowercase().contains(&title_lower) || citation.contains(&source.source_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::NullManifest;
    use async_trait::async_trait;
    use crate::error::Result;

    #[test]
    fn test_format_page_range() {
        assert_eq!(format_page_range(&[1, 2, 3, 5, 6, 10]), "1-3, 5-6, 10");
        assert_eq!(format_page_range(&[5]), "5");
        assert_eq!(format_page_range(&[1, 3, 5]), "1, 3, 5");
        assert_eq!(format_page_range(&[]), "");
        assert_eq!(format_page_range(&[7, 8]), "7-8");
    }

    #[test]
    fn test_browsable_url() {
        assert_eq!(
            browsable_url("gs://corpus/documents/handbook.pdf"),
            "https://storage.cloud.google.com/corpus/documents/handbook.pdf"
        );
        assert_eq!(
            browsable_url("https://example.com/doc.pdf"),
            "https://example.com/doc.pdf"
        );
    }

    fn storage() -> StorageConfig {
        StorageConfig {
            bucket: Some("corpus".to_string()),
            prefix: "documents/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pages_merged_across_items_of_same_source() {
        let builder = AttributionBuilder::new(Arc::new(NullManifest), storage());
        let excerpts = vec![
            ExcerptItem::new("doc1", "a", 0.9).with_title("AML Handbook").with_page(6),
            ExcerptItem::new("doc1", "b", 0.8).with_title("AML Handbook").with_page(2),
            ExcerptItem::new("doc1", "c", 0.7).with_title("AML Handbook").with_page(1),
            ExcerptItem::new("doc1", "d", 0.6).with_title("AML Handbook").with_page(5),
        ];
        let citations = vec!["AML Handbook, Page 2".to_string()];

        let sources = builder.build(&[], &excerpts, &citations).await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].pages, vec![1, 2, 5, 6]);
        assert_eq!(sources[0].page_range, "1-2, 5-6");
    }

    #[tokio::test]
    async fn test_uncited_sources_dropped() {
        let builder = AttributionBuilder::new(Arc::new(NullManifest), storage());
        let summaries = vec![
            SummaryItem::new("doc1", "s", 0.9).with_title("Cited Title"),
            SummaryItem::new("doc2", "s", 0.8).with_title("Unreferenced Title"),
        ];
        let citations = vec!["cited title, Page 1".to_string()];

        let sources = builder.build(&summaries, &[], &citations).await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "doc1");
    }

    #[tokio::test]
    async fn test_source_id_match_keeps_source() {
        let builder = AttributionBuilder::new(Arc::new(NullManifest), storage());
        let summaries = vec![SummaryItem::new("doc-42", "s", 0.9).with_title("Some Title")];
        let citations = vec!["see doc-42 for details".to_string()];

        let sources = builder.build(&summaries, &[], &citations).await;
        assert_eq!(sources.len(), 1);
    }

    #[tokio::test]
    async fn test_url_constructed_from_bucket_convention() {
        let builder = AttributionBuilder::new(Arc::new(NullManifest), storage());
        let summaries = vec![SummaryItem::new("doc1", "s", 0.9)
            .with_title("Handbook")
            .with_filename("handbook.pdf")];
        let citations = vec!["Handbook".to_string()];

        let sources = builder.build(&summaries, &[], &citations).await;
        assert_eq!(
            sources[0].url.as_deref(),
            Some("https://storage.cloud.google.com/corpus/documents/handbook.pdf")
        );
    }

    struct ManifestWithUri;

    #[async_trait]
    impl crate::providers::SourceManifest for ManifestWithUri {
        async fn get_source(&self, _source_id: &str) -> Result<Option<SourceManifestEntry>> {
            Ok(Some(SourceManifestEntry {
                title: Some("Manifest Title".to_string()),
                filename: Some("manifest.pdf".to_string()),
                canonical_uri: Some("gs://other-bucket/originals/manifest.pdf".to_string()),
            }))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_manifest_uri_preferred_and_rewritten() {
        let builder = AttributionBuilder::new(Arc::new(ManifestWithUri), storage());
        let summaries = vec![SummaryItem::new("doc1", "s", 0.9)];
        let citations = vec!["Manifest Title".to_string()];

        let sources = builder.build(&summaries, &[], &citations).await;
        assert_eq!(sources[0].title, "Manifest Title");
        assert_eq!(
            sources[0].url.as_deref(),
            Some("https://storage.cloud.google.com/other-bucket/originals/manifest.pdf")
        );
    }

    #[tokio::test]
    async fn test_time_ranges_sorted() {
        let builder = AttributionBuilder::new(Arc::new(NullManifest), storage());
        let excerpts = vec![
            ExcerptItem::new("vid1", "late", 0.9)
                .with_title("Town Hall")
                .with_time_range(600.0, 660.0),
            ExcerptItem::new("vid1", "early", 0.8)
                .with_title("Town Hall")
                .with_time_range(60.0, 120.0),
        ];
        let citations = vec!["Town Hall, 1:00 - 2:00".to_string()];

        let sources = builder.build(&[], &excerpts, &citations).await;
        assert_eq!(sources[0].time_ranges.len(), 2);
        assert!(sources[0].time_ranges[0].start_secs < sources[0].time_ranges[1].start_secs);
        assert!(sources[0].pages.is_empty());
        assert_eq!(sources[0].page_range, "");
    }
}
