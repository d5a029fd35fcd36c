//! OpenAI-compatible chat completions client (Groq by default).

use super::error_body;
use crate::capability::TextGenerator;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shortlist_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
}

impl ChatCompletionsGenerator {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::InvalidConfig("missing chat completions API key".into()));
        }
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::InvalidConfig("invalid chat completions API key".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::QueryAnalysis(format!("chat request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            return Err(Error::QueryAnalysis(format!(
                "chat request failed ({status}): {body}"
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::QueryAnalysis(format!("failed to parse chat response: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::QueryAnalysis("chat response had no content".into()))?;

        debug!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn generator(server: &MockServer) -> ChatCompletionsGenerator {
        ChatCompletionsGenerator::new(
            "test-key",
            &server.base_url(),
            "llama-3.1-8b-instant",
            0.1,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body(json!({
                        "model": "llama-3.1-8b-instant",
                        "messages": [{"role": "user", "content": "prompt"}],
                        "temperature": 0.1
                    }));
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "{\"hard_skills\": []}"}}]
                }));
            })
            .await;

        let reply = generator(&server).generate("prompt").await.unwrap();
        assert_eq!(reply, "{\"hard_skills\": []}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_query_analysis_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let err = generator(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(&err, Error::QueryAnalysis(msg) if msg.contains("429") && msg.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let err = generator(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::QueryAnalysis(_)));
    }

    #[test]
    fn test_blank_key_rejected() {
        let result = ChatCompletionsGenerator::new(
            "  ",
            "http://localhost",
            "m",
            0.1,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
