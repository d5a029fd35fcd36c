//! HTTP clients for the hosted capabilities.

pub mod chat;
pub mod gemini;

pub use chat::ChatCompletionsGenerator;
pub use gemini::GeminiEmbedder;

use reqwest::Response;

/// Reads the body of a failed response for inclusion in an error message.
async fn error_body(resp: Response) -> String {
    resp.text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string())
}
