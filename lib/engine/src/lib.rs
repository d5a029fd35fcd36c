//! # Shortlist Engine
//!
//! Turns a free-text hiring query into a balanced shortlist of assessments.
//!
//! [`RetrievalEngine`] ties the read-only corpus from `shortlist-core` to two
//! external capabilities, an [`IntentExtractor`] and an [`Embedder`]. The
//! production implementations talk to an OpenAI-compatible chat endpoint and
//! to Gemini embeddings; tests plug in local doubles through the same traits.

pub mod capability;
pub mod config;
pub mod engine;
pub mod eval;
pub mod policy;
pub mod providers;

pub use capability::{Embedder, IntentExtractor, PromptedIntentExtractor, TextGenerator};
pub use config::{EngineConfig, IntentFailurePolicy, ProviderConfig};
pub use engine::RetrievalEngine;
pub use eval::{evaluate, load_dataset, recall_at_k, EvaluationReport, LabelledPair, QueryEvaluation};
pub use policy::CallPolicy;
pub use providers::{ChatCompletionsGenerator, GeminiEmbedder};
