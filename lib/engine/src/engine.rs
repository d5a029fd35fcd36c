use crate::capability::{Embedder, IntentExtractor, PromptedIntentExtractor};
use crate::config::{EngineConfig, IntentFailurePolicy, ProviderConfig};
use crate::policy::CallPolicy;
use crate::providers::{ChatCompletionsGenerator, GeminiEmbedder};
use shortlist_core::{
    CandidateRetriever, CorpusStore, DiversityBalancer, Error, QueryIntent, Recommendation,
    Result, Vector,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Query-to-shortlist orchestrator.
///
/// Holds the read-only corpus and the two capabilities. Every call to
/// [`RetrievalEngine::retrieve`] is independent, so one engine is shared
/// across all request handlers behind an `Arc`.
pub struct RetrievalEngine {
    corpus: Arc<CorpusStore>,
    extractor: Arc<dyn IntentExtractor>,
    embedder: Arc<dyn Embedder>,
    retriever: CandidateRetriever,
    policy: CallPolicy,
    config: EngineConfig,
}

impl RetrievalEngine {
    pub fn new(
        corpus: Arc<CorpusStore>,
        extractor: Arc<dyn IntentExtractor>,
        embedder: Arc<dyn Embedder>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            corpus,
            extractor,
            embedder,
            retriever: CandidateRetriever::new(config.oversample),
            policy: CallPolicy {
                timeout: config.call_timeout(),
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay(),
            },
            config,
        })
    }

    /// Wires the engine to the hosted chat and embedding services.
    pub fn with_providers(
        corpus: Arc<CorpusStore>,
        providers: &ProviderConfig,
        config: EngineConfig,
    ) -> Result<Self> {
        let generator = ChatCompletionsGenerator::new(
            &providers.chat_api_key,
            &providers.chat_base_url,
            providers.chat_model.clone(),
            providers.chat_temperature,
            providers.http_timeout,
        )?;
        let embedder = GeminiEmbedder::new(
            &providers.embedding_api_key,
            &providers.embedding_base_url,
            &providers.embedding_model,
            providers.http_timeout,
        )?;
        Self::new(
            corpus,
            Arc::new(PromptedIntentExtractor::new(generator)),
            Arc::new(embedder),
            config,
        )
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.corpus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns at most `top_k` recommendations for `query`, ordered by the
    /// balancer (coverage picks first, then the remaining best matches).
    ///
    /// Intent extraction and embedding run concurrently. An embedding
    /// failure always fails the request; an intent failure is handled
    /// according to [`EngineConfig::intent_failure`].
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Recommendation>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("query must not be empty".into()));
        }
        if top_k == 0 {
            return Err(Error::InvalidQuery("top_k must be at least 1".into()));
        }
        let started = Instant::now();

        let (intent, embedding) = tokio::join!(
            self.policy.run("intent extraction", Error::QueryAnalysis, || {
                self.extractor.extract(query)
            }),
            self.policy.run("embedding", Error::Embedding, || {
                self.embedder.embed(query)
            }),
        );

        let embedding = embedding?;
        let intent = self.resolve_intent(intent)?;
        self.check_dimension(&embedding)?;

        let candidates = self.retriever.retrieve(&self.corpus, &embedding)?;
        let balancer = DiversityBalancer::new(top_k, self.config.min_per_type);
        let picked = balancer.balance(&candidates, &intent.required_test_types);

        info!(
            candidates = candidates.len(),
            returned = picked.len(),
            required = ?intent.required_test_types,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieval complete"
        );
        Ok(picked.iter().map(|c| c.to_recommendation()).collect())
    }

    fn resolve_intent(&self, intent: Result<QueryIntent>) -> Result<QueryIntent> {
        match intent {
            Ok(intent) => {
                debug!(
                    hard_skills = ?intent.hard_skills,
                    soft_skills = ?intent.soft_skills,
                    "intent extracted"
                );
                Ok(intent)
            }
            Err(err) => match self.config.intent_failure {
                IntentFailurePolicy::Degrade => {
                    warn!(error = %err, "intent extraction failed, ranking by relevance only");
                    Ok(QueryIntent::default())
                }
                IntentFailurePolicy::Fail => Err(err),
            },
        }
    }

    fn check_dimension(&self, embedding: &Vector) -> Result<()> {
        let expected = self.corpus.dim();
        if embedding.dim() != expected {
            return Err(Error::Embedding(format!(
                "embedding has dimension {}, corpus expects {}",
                embedding.dim(),
                expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shortlist_core::{AssessmentRecord, FlatIndex, TestType, TestTypes};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FixedIntent(std::result::Result<QueryIntent, String>);

    #[async_trait]
    impl IntentExtractor for FixedIntent {
        async fn extract(&self, _query: &str) -> Result<QueryIntent> {
            self.0.clone().map_err(Error::QueryAnalysis)
        }
    }

    struct SlowIntent;

    #[async_trait]
    impl IntentExtractor for SlowIntent {
        async fn extract(&self, _query: &str) -> Result<QueryIntent> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(QueryIntent::default())
        }
    }

    /// Fails the first `failures` calls, then returns `vector`.
    struct FlakyEmbedder {
        vector: Vec<f32>,
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyEmbedder {
        fn ok(vector: Vec<f32>) -> Self {
            Self::failing(vector, 0)
        }

        fn failing(vector: Vec<f32>, failures: u32) -> Self {
            Self {
                vector,
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vector> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(Error::Embedding("503 Service Unavailable".into()));
            }
            Ok(Vector::new(self.vector.clone()))
        }
    }

    /// Rows 0..4 are Knowledge tests nearest the origin, rows 4..6 are
    /// Personality tests further away.
    fn corpus() -> Arc<CorpusStore> {
        let mut records = Vec::new();
        let mut vectors = Vec::new();
        for i in 0..6u64 {
            let (kind, name) = if i < 4 {
                (TestType::Knowledge, format!("Knowledge {i}"))
            } else {
                (TestType::Personality, format!("Personality {i}"))
            };
            records.push(AssessmentRecord::new(
                i,
                name,
                format!("https://catalog.test/products/a{i}/"),
                TestTypes::from_iter([kind]),
            ));
            vectors.push(Vector::new(vec![i as f32, 0.0]));
        }
        let index = FlatIndex::from_vectors(2, vectors).unwrap();
        Arc::new(CorpusStore::new(records, index).unwrap())
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            call_timeout_ms: 1_000,
            retry_base_delay_ms: 1,
            ..EngineConfig::default()
        }
    }

    fn engine(
        intent: impl IntentExtractor + 'static,
        embedder: impl Embedder + 'static,
        config: EngineConfig,
    ) -> RetrievalEngine {
        RetrievalEngine::new(corpus(), Arc::new(intent), Arc::new(embedder), config).unwrap()
    }

    #[tokio::test]
    async fn test_required_type_pulled_ahead_of_closer_matches() {
        let intent = QueryIntent::with_required([TestType::Personality]);
        let engine = engine(
            FixedIntent(Ok(intent)),
            FlakyEmbedder::ok(vec![0.0, 0.0]),
            fast_config(),
        );

        let recs = engine.retrieve("java dev who works well in teams", 4).await.unwrap();
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Personality 4", "Personality 5", "Knowledge 0", "Knowledge 1"]
        );
    }

    #[tokio::test]
    async fn test_no_required_types_is_pure_relevance() {
        let engine = engine(
            FixedIntent(Ok(QueryIntent::default())),
            FlakyEmbedder::ok(vec![5.0, 0.0]),
            fast_config(),
        );

        let recs = engine.retrieve("personality", 3).await.unwrap();
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Personality 5", "Personality 4", "Knowledge 3"]);
    }

    #[tokio::test]
    async fn test_similarity_scores_are_reported() {
        let engine = engine(
            FixedIntent(Ok(QueryIntent::default())),
            FlakyEmbedder::ok(vec![0.0, 0.0]),
            fast_config(),
        );
        let recs = engine.retrieve("q", 2).await.unwrap();
        assert_eq!(recs[0].similarity_score, Some(1.0));
        // Row 1 sits at squared distance 1.
        assert_eq!(recs[1].similarity_score, Some(0.5));
    }

    #[tokio::test]
    async fn test_intent_failure_degrades_by_default() {
        let engine = engine(
            FixedIntent(Err("model returned prose".into())),
            FlakyEmbedder::ok(vec![0.0, 0.0]),
            fast_config(),
        );
        let recs = engine.retrieve("q", 3).await.unwrap();
        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Knowledge 0", "Knowledge 1", "Knowledge 2"]);
    }

    #[tokio::test]
    async fn test_intent_failure_can_fail_request() {
        let config = EngineConfig {
            intent_failure: IntentFailurePolicy::Fail,
            max_attempts: 1,
            ..fast_config()
        };
        let engine = engine(
            FixedIntent(Err("bad json".into())),
            FlakyEmbedder::ok(vec![0.0, 0.0]),
            config,
        );
        let err = engine.retrieve("q", 3).await.unwrap_err();
        assert!(matches!(err, Error::QueryAnalysis(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_intent_times_out_and_degrades() {
        let config = EngineConfig {
            max_attempts: 1,
            ..fast_config()
        };
        let engine = engine(SlowIntent, FlakyEmbedder::ok(vec![0.0, 0.0]), config);
        let recs = engine.retrieve("q", 2).await.unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_retried_then_succeeds() {
        let embedder = Arc::new(FlakyEmbedder::failing(vec![0.0, 0.0], 2));
        let engine = RetrievalEngine::new(
            corpus(),
            Arc::new(FixedIntent(Ok(QueryIntent::default()))),
            embedder.clone(),
            fast_config(),
        )
        .unwrap();

        let recs = engine.retrieve("q", 1).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_embedding_failure_fails_request() {
        let engine = engine(
            FixedIntent(Ok(QueryIntent::default())),
            FlakyEmbedder::failing(vec![0.0, 0.0], u32::MAX),
            fast_config(),
        );
        let err = engine.retrieve("q", 1).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_error() {
        let engine = engine(
            FixedIntent(Ok(QueryIntent::default())),
            FlakyEmbedder::ok(vec![0.0, 0.0, 0.0]),
            fast_config(),
        );
        let err = engine.retrieve("q", 1).await.unwrap_err();
        assert!(matches!(&err, Error::Embedding(msg) if msg.contains("dimension 3")));
    }

    #[tokio::test]
    async fn test_rejects_empty_query_and_zero_top_k() {
        let engine = engine(
            FixedIntent(Ok(QueryIntent::default())),
            FlakyEmbedder::ok(vec![0.0, 0.0]),
            fast_config(),
        );
        assert!(matches!(
            engine.retrieve("   ", 5).await,
            Err(Error::InvalidQuery(_))
        ));
        assert!(matches!(
            engine.retrieve("java", 0).await,
            Err(Error::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RetrievalEngine::new(
            corpus(),
            Arc::new(FixedIntent(Ok(QueryIntent::default()))),
            Arc::new(FlakyEmbedder::ok(vec![0.0, 0.0])),
            EngineConfig {
                oversample: 0,
                ..EngineConfig::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
