//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{GenerationError, TextGenerator};

/// Default API endpoint.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model name.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; an empty key disables the client
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Base URL
    pub endpoint: String,

    /// HTTP-level timeout
    pub request_timeout: std::time::Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            request_timeout: std::time::Duration::from_secs(120),
        }
    }
}

/// Gemini text generation client.
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client
    client: Client,

    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Whether an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        if !self.is_configured() {
            return Err(GenerationError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        debug!(model = %self.config.model, "Calling generateContent");

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.config.request_timeout)
                } else {
                    GenerationError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(
                body.char_indices()
                    .nth(MAX_ERROR_BODY)
                    .map_or(body.len(), |(i, _)| i),
            );
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        first_candidate_text(data).ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = GeminiClient::new(GeminiConfig {
            endpoint: "http://localhost:9000/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.url(),
            "http://localhost:9000/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_first_candidate_text() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[{\"day\":" }, { "text": " 1}]" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(first_candidate_text(response).unwrap(), "[{\"day\": 1}]");

        let empty: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(first_candidate_text(empty).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = GeminiClient::new(GeminiConfig::default());
        assert!(!client.is_configured());
        let err = client.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured(_)));
        assert!(!err.is_retryable());
    }
}
