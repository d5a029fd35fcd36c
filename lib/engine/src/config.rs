use serde::{Deserialize, Serialize};
use shortlist_core::{Error, Result, DEFAULT_MIN_PER_TYPE, DEFAULT_OVERSAMPLE, DEFAULT_TARGET};
use std::time::Duration;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// What to do when the intent capability fails or answers with garbage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentFailurePolicy {
    /// Continue with an empty intent, i.e. pure relevance ranking
    #[default]
    Degrade,
    /// Fail the request with the extraction error
    Fail,
}

/// Tunables of the retrieval pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Candidates fetched from the index before balancing
    pub oversample: usize,
    /// Shortlist size used when the caller does not ask for one
    pub top_k: usize,
    /// Coverage floor per requested test type
    pub min_per_type: usize,
    /// Per-attempt timeout for each external call
    pub call_timeout_ms: u64,
    /// Attempts per external call, including the first
    pub max_attempts: u32,
    /// First retry delay; doubles on each further attempt
    pub retry_base_delay_ms: u64,
    pub intent_failure: IntentFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oversample: DEFAULT_OVERSAMPLE,
            top_k: DEFAULT_TARGET,
            min_per_type: DEFAULT_MIN_PER_TYPE,
            call_timeout_ms: 30_000,
            max_attempts: 3,
            retry_base_delay_ms: 500,
            intent_failure: IntentFailurePolicy::Degrade,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.oversample == 0 {
            return Err(Error::InvalidConfig("oversample must be at least 1".into()));
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".into()));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be at least 1".into()));
        }
        if self.call_timeout_ms == 0 {
            return Err(Error::InvalidConfig("call_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Endpoints and credentials for the two HTTP capabilities
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub chat_api_key: String,
    pub chat_base_url: String,
    pub chat_model: String,
    pub chat_temperature: f64,
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    /// Transport-level timeout on the HTTP clients
    pub http_timeout: Duration,
}

impl ProviderConfig {
    pub fn new(chat_api_key: impl Into<String>, embedding_api_key: impl Into<String>) -> Self {
        Self {
            chat_api_key: chat_api_key.into(),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_temperature: 0.1,
            embedding_api_key: embedding_api_key.into(),
            embedding_base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            http_timeout: Duration::from_secs(60),
        }
    }
}
