//! Gemini `embedContent` client.

use super::error_body;
use crate::capability::Embedder;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shortlist_core::{Error, Result, Vector};
use std::time::Duration;

#[derive(Clone)]
pub struct GeminiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::InvalidConfig("missing embedding API key".into()));
        }
        let model = model.trim().trim_start_matches("models/");
        if model.is_empty() {
            return Err(Error::InvalidConfig("missing embedding model name".into()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| Error::InvalidConfig("invalid embedding API key".into()))?;
        headers.insert("x-goog-api-key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:embedContent",
                base_url.trim_end_matches('/'),
                model
            ),
            model: format!("models/{model}"),
        })
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let request = EmbedRequest {
            model: &self.model,
            content: Content {
                parts: [Part { text }],
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            return Err(Error::Embedding(format!(
                "embedding request failed ({status}): {body}"
            )));
        }

        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("failed to parse embedding response: {e}")))?;
        let vector = Vector::new(parsed.embedding.values);
        if vector.is_empty() {
            return Err(Error::Embedding("embedding response was empty".into()));
        }
        if !vector.is_finite() {
            return Err(Error::Embedding("embedding contained non-finite values".into()));
        }
        Ok(vector)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}
