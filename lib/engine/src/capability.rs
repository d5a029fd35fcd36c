//! Seams to the external capabilities the pipeline depends on.
//!
//! The orchestrator only sees these traits; HTTP clients live in
//! [`crate::providers`] and tests substitute deterministic doubles.

use async_trait::async_trait;
use shortlist_core::{intent_prompt, parse_intent_response, QueryIntent, Result, Vector};
use std::sync::Arc;

/// A text-generation model answering a single prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Turns a raw query into structured requirements
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    async fn extract(&self, query: &str) -> Result<QueryIntent>;
}

/// Turns a raw query into a dense vector in the corpus embedding space
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector>;
}

/// Intent extraction by prompting a [`TextGenerator`] with the fixed
/// instruction template and parsing its JSON answer.
///
/// Makes exactly one generation call per query; retrying is left to the
/// caller.
pub struct PromptedIntentExtractor<G> {
    generator: G,
}

impl<G: TextGenerator> PromptedIntentExtractor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> IntentExtractor for PromptedIntentExtractor<G> {
    async fn extract(&self, query: &str) -> Result<QueryIntent> {
        let response = self.generator.generate(&intent_prompt(query)).await?;
        parse_intent_response(&response)
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
