//! # Shortlist
//!
//! Maps a free-text hiring query to a ranked shortlist of catalogued
//! assessments.
//!
//! A query goes through four stages:
//!
//! 1. An LLM extracts the requested skills and test types (intent).
//! 2. The query is embedded into the corpus vector space.
//! 3. An exact L2 search fetches an oversampled candidate pool.
//! 4. A greedy balancer cuts the pool to `top_k`, giving each requested
//!    test type a best-effort floor before filling by relevance.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! export GROQ_API_KEY=... GEMINI_API_KEY=...
//! shortlist --data-dir ./data serve --http-port 8000
//! curl -X POST localhost:8000/recommend -H 'content-type: application/json' \
//!     -d '{"query": "Java developer who collaborates with business teams"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use shortlist::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let corpus = Arc::new(load_corpus_dir("./data")?);
//! let providers = ProviderConfig::new("groq-key", "gemini-key");
//! let engine = RetrievalEngine::with_providers(corpus, &providers, EngineConfig::default())?;
//!
//! for rec in engine.retrieve("Python data analyst, SQL", 10).await? {
//!     println!("{} {}", rec.name, rec.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`shortlist-core`](shortlist_core) - Records, intent parsing, flat index, retriever, balancer
//! - [`shortlist-storage`](shortlist_storage) - On-disk corpus format and loading
//! - [`shortlist-engine`](shortlist_engine) - Capability clients, retry policy, orchestrator, evaluation
//! - [`shortlist-api`](shortlist_api) - REST API

// Re-export core types
pub use shortlist_core::{
    AssessmentRecord, Candidate, CandidateRetriever, CorpusStore, DiversityBalancer, Error,
    FlatIndex, QueryIntent, Recommendation, Result, TestType, TestTypes, Vector, VectorIndex,
};

// Re-export storage
pub use shortlist_storage::{load_corpus, load_corpus_dir, write_corpus, CorpusPaths};

// Re-export engine
pub use shortlist_engine::{
    Embedder, EngineConfig, IntentExtractor, IntentFailurePolicy, ProviderConfig, RetrievalEngine,
};

// Re-export API
pub use shortlist_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AssessmentRecord, CorpusStore, Embedder, EngineConfig, Error, FlatIndex,
        IntentExtractor, IntentFailurePolicy, ProviderConfig, QueryIntent, Recommendation,
        Result, RetrievalEngine, TestType, TestTypes, Vector,
        load_corpus_dir,
        RestApi,
    };
}

/// SIMD-accelerated distance kernels
pub mod simd {
    pub use shortlist_core::simd::squared_l2;
}
