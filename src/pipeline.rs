//! The end-to-end answer pipeline

use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::generation::{
    apply_budget, classify, extract_and_normalize, AnswerGenerator, AttributionBuilder,
    PromptAssembler,
};
use crate::providers::{GenerativeModel, SearchTier, SourceManifest};
use crate::retrieval::{
    adaptive_limits, dedup_items, fuse, QueryExpander, Reranker, TwoTierRetriever,
};
use crate::tracking::UsageTracker;
use crate::types::{AnswerRequest, AnswerResponse, ExcerptItem, RetrievedItem, SummaryItem};

/// Orchestrates retrieval, fusion, synthesis, and attribution for one request
///
/// After construction succeeds, `answer` does not fail on provider errors:
/// tier failures degrade to empty lists and model exhaustion degrades to the
/// canned fallback answer.
pub struct AnswerPipeline {
    config: PipelineConfig,
    retriever: TwoTierRetriever,
    expander: QueryExpander,
    reranker: Reranker,
    generator: AnswerGenerator,
    assembler: PromptAssembler,
    manifest: Arc<dyn SourceManifest>,
}

impl AnswerPipeline {
    /// Build a pipeline over the given providers, validating the configuration
    pub fn new(
        config: PipelineConfig,
        excerpt_tier: Arc<dyn SearchTier>,
        summary_tier: Arc<dyn SearchTier>,
        model: Arc<dyn GenerativeModel>,
        manifest: Arc<dyn SourceManifest>,
        tracker: Arc<UsageTracker>,
    ) -> Result<Self> {
        config.validate()?;

        let retriever = TwoTierRetriever::new(excerpt_tier, summary_tier);
        let expander = QueryExpander::new(
            Arc::clone(&model),
            config.generation.utility_model.clone(),
        );
        let reranker = Reranker::new(
            Arc::clone(&model),
            config.generation.utility_model.clone(),
        );
        let generator = AnswerGenerator::new(
            Arc::clone(&model),
            config.generation.candidates(),
            tracker,
        );
        let assembler = PromptAssembler::new(config.prompt.domain_context.clone());

        Ok(Self {
            config,
            retriever,
            expander,
            reranker,
            generator,
            assembler,
            manifest,
        })
    }

    /// Answer one question with inline citations and source attribution
    pub async fn answer(&self, request: AnswerRequest) -> Result<AnswerResponse> {
        let started = Instant::now();
        let question = request.question.as_str();
        let decision = classify(question);
        tracing::info!(
            "Answering question ({:?}/{:?}): \"{}\"",
            decision.format_type,
            decision.length,
            question
        );

        let variants = if request.expand {
            self.expander.expand(question).await
        } else {
            vec![question.to_string()]
        };

        let limits = adaptive_limits(question);
        let lists = self
            .retriever
            .retrieve(&variants, limits, request.filter.as_deref())
            .await;

        let excerpts = self.consolidate(lists.excerpts);
        let summaries = self.consolidate(lists.summaries);
        tracing::debug!(
            "Consolidated {} excerpt(s) and {} summary(ies) from {} variant(s)",
            excerpts.len(),
            summaries.len(),
            variants.len()
        );

        let (excerpts, summaries) = if request.rerank {
            let (excerpts, summaries) = tokio::join!(
                self.reranker
                    .rerank(question, excerpts, Some(limits.max_excerpts)),
                self.reranker
                    .rerank(question, summaries, Some(limits.max_summaries)),
            );
            (excerpts, summaries)
        } else {
            (
                truncated(excerpts, limits.max_excerpts),
                truncated(summaries, limits.max_summaries),
            )
        };

        let (summary_items, excerpt_items) = split_tiers(summaries, excerpts);
        let (summary_items, excerpt_items) =
            apply_budget(&self.config.budget, summary_items, excerpt_items);

        let prompt = self.assembler.assemble(
            question,
            &request.history,
            &decision,
            &summary_items,
            &excerpt_items,
        );
        let generated = self
            .generator
            .generate(&prompt, &decision, summary_items.len(), excerpt_items.len())
            .await;

        let (answer, citations) =
            extract_and_normalize(&generated.text, &summary_items, &excerpt_items);
        let sources =
            AttributionBuilder::new(Arc::clone(&self.manifest), self.config.storage.clone())
                .build(&summary_items, &excerpt_items, &citations)
                .await;

        Ok(AnswerResponse {
            answer,
            citations,
            sources,
            model_used: generated.model_used,
            summaries_used: summary_items.len(),
            excerpts_used: excerpt_items.len(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Collapse per-variant lists into one deduped ranking
    ///
    /// A single variant skips fusion entirely; its tier order stands.
    fn consolidate(&self, lists: Vec<Vec<RetrievedItem>>) -> Vec<RetrievedItem> {
        let merged = if lists.len() <= 1 {
            lists.into_iter().next().unwrap_or_default()
        } else {
            fuse(&lists, self.config.retrieval.rrf_k)
        };
        dedup_items(merged)
    }
}

fn truncated(mut items: Vec<RetrievedItem>, cap: usize) -> Vec<RetrievedItem> {
    items.truncate(cap);
    items
}

/// Split mixed tier results into the concrete item lists the prompt needs
fn split_tiers(
    summaries: Vec<RetrievedItem>,
    excerpts: Vec<RetrievedItem>,
) -> (Vec<SummaryItem>, Vec<ExcerptItem>) {
    let summary_items = summaries
        .into_iter()
        .filter_map(|item| match item {
            RetrievedItem::Summary(summary) => Some(summary),
            RetrievedItem::Excerpt(_) => None,
        })
        .collect();
    let excerpt_items = excerpts
        .into_iter()
        .filter_map(|item| match item {
            RetrievedItem::Excerpt(excerpt) => Some(excerpt),
            RetrievedItem::Summary(_) => None,
        })
        .collect();
    (summary_items, excerpt_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::generation::FALLBACK_MODEL_SENTINEL;
    use crate::providers::{Generation, ModelError, NullManifest, TokenUsage};

    /// Tier returning a fixed list per query string
    struct MapTier {
        name: &'static str,
        by_query: Vec<(String, Vec<RetrievedItem>)>,
    }

    #[async_trait]
    impl SearchTier for MapTier {
        async fn search(
            &self,
            query: &str,
            limit: usize,
            _filter: Option<&str>,
        ) -> Result<Vec<RetrievedItem>> {
            let mut items = self
                .by_query
                .iter()
                .find(|(q, _)| q == query)
                .map(|(_, items)| items.clone())
                .unwrap_or_default();
            items.truncate(limit);
            Ok(items)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    /// Model answering each call with the next scripted response
    struct ScriptedModel {
        script: Mutex<Vec<std::result::Result<String, ModelError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(script: Vec<std::result::Result<String, ModelError>>) -> Self {
            Self {
                script: Mutex::new(script),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(
            &self,
            _model: &str,
            prompt: &str,
            _temperature: f32,
            _max_output_tokens: u32,
        ) -> std::result::Result<Generation, ModelError> {
            self.prompts.lock().push(prompt.to_string());
            let mut script = self.script.lock();
            if script.is_empty() {
                return Err(ModelError::other("script exhausted"));
            }
            script.remove(0).map(|text| Generation {
                text,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn excerpt(source_id: &str, title: &str, page: u32) -> RetrievedItem {
        RetrievedItem::Excerpt(
            ExcerptItem::new(source_id, format!("content of {}", title), 0.9)
                .with_title(title)
                .with_page(page),
        )
    }

    fn summary(source_id: &str, title: &str) -> RetrievedItem {
        RetrievedItem::Summary(
            SummaryItem::new(source_id, format!("summary of {}", title), 0.8).with_title(title),
        )
    }

    fn pipeline(
        excerpt_tier: MapTier,
        summary_tier: MapTier,
        model: Arc<ScriptedModel>,
    ) -> AnswerPipeline {
        AnswerPipeline::new(
            PipelineConfig::default(),
            Arc::new(excerpt_tier),
            Arc::new(summary_tier),
            model,
            Arc::new(NullManifest),
            Arc::new(UsageTracker::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_answer_with_normalized_citation_and_attribution() {
        let excerpt_tier = MapTier {
            name: "excerpts",
            by_query: vec![(
                "What is AML?".to_string(),
                vec![excerpt("doc1", "AML Handbook", 3)],
            )],
        };
        let summary_tier = MapTier {
            name: "summaries",
            by_query: vec![(
                "What is AML?".to_string(),
                vec![summary("doc1", "AML Handbook")],
            )],
        };
        let model = Arc::new(ScriptedModel::new(vec![Ok(
            "AML means anti-money laundering [Chunk 1, Page 3].".to_string(),
        )]));

        let pipeline = pipeline(excerpt_tier, summary_tier, model);
        let request = AnswerRequest::new("What is AML?")
            .without_expansion()
            .without_rerank();

        let response = pipeline.answer(request).await.unwrap();
        assert_eq!(
            response.answer,
            "AML means anti-money laundering [AML Handbook, Page 3]."
        );
        assert_eq!(response.citations, vec!["AML Handbook, Page 3"]);
        assert_eq!(response.model_used, "gemini-2.5-pro");
        assert_eq!(response.summaries_used, 1);
        assert_eq!(response.excerpts_used, 1);

        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].source_id, "doc1");
        assert_eq!(response.sources[0].pages, vec![3]);
        assert_eq!(response.sources[0].page_range, "3");
    }

    #[tokio::test]
    async fn test_total_model_exhaustion_yields_fallback_answer() {
        let excerpt_tier = MapTier {
            name: "excerpts",
            by_query: vec![(
                "What is AML?".to_string(),
                vec![excerpt("doc1", "AML Handbook", 3)],
            )],
        };
        let summary_tier = MapTier {
            name: "summaries",
            by_query: vec![],
        };
        // Every scripted call fails, including all three chain candidates.
        let model = Arc::new(ScriptedModel::new(vec![
            Err(ModelError::rate_limited("429")),
            Err(ModelError::other("boom")),
            Err(ModelError::other("boom")),
        ]));

        let pipeline = pipeline(excerpt_tier, summary_tier, model);
        let request = AnswerRequest::new("What is AML?")
            .without_expansion()
            .without_rerank();

        let response = pipeline.answer(request).await.unwrap();
        assert_eq!(response.model_used, FALLBACK_MODEL_SENTINEL);
        assert!(response.answer.contains("1 excerpts"));
        assert!(response.citations.is_empty());
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_expansion_fuses_variant_lists() {
        let excerpt_tier = MapTier {
            name: "excerpts",
            by_query: vec![
                (
                    "What is AML?".to_string(),
                    vec![excerpt("doc-a", "Doc A", 1), excerpt("doc-b", "Doc B", 1)],
                ),
                (
                    "anti-money laundering meaning".to_string(),
                    vec![excerpt("doc-b", "Doc B", 1), excerpt("doc-c", "Doc C", 1)],
                ),
            ],
        };
        let summary_tier = MapTier {
            name: "summaries",
            by_query: vec![],
        };
        // First call answers expansion, second answers generation.
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("anti-money laundering meaning".to_string()),
            Ok("Grounded answer [Doc B, Page 1].".to_string()),
        ]));

        let pipeline = pipeline(excerpt_tier, summary_tier, model.clone());
        let request = AnswerRequest::new("What is AML?").without_rerank();

        let response = pipeline.answer(request).await.unwrap();
        assert_eq!(response.excerpts_used, 3);

        // Doc B appears in both variant lists, so fusion ranks it first and
        // it becomes Chunk 1 in the generation prompt.
        let prompts = model.prompts.lock();
        let generation_prompt = prompts.last().unwrap();
        assert!(generation_prompt.contains("[Chunk 1] Doc B (Page 1)"));

        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].source_id, "doc-b");
    }

    #[tokio::test]
    async fn test_duplicate_items_across_variants_deduped() {
        let same = excerpt("doc1", "Only Doc", 2);
        let excerpt_tier = MapTier {
            name: "excerpts",
            by_query: vec![
                ("q".to_string(), vec![same.clone()]),
                ("variant".to_string(), vec![same.clone()]),
            ],
        };
        let summary_tier = MapTier {
            name: "summaries",
            by_query: vec![],
        };
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("variant".to_string()),
            Ok("Answer [Only Doc, Page 2].".to_string()),
        ]));

        let pipeline = pipeline(excerpt_tier, summary_tier, model);
        let request = AnswerRequest::new("q").without_rerank();

        let response = pipeline.answer(request).await.unwrap();
        assert_eq!(response.excerpts_used, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let mut config = PipelineConfig::default();
        config.budget.reserved_overhead = config.budget.total_tokens;

        let result = AnswerPipeline::new(
            config,
            Arc::new(MapTier {
                name: "excerpts",
                by_query: vec![],
            }),
            Arc::new(MapTier {
                name: "summaries",
                by_query: vec![],
            }),
            Arc::new(ScriptedModel::new(vec![])),
            Arc::new(NullManifest),
            Arc::new(UsageTracker::new()),
        );
        assert!(result.is_err());
    }
}
