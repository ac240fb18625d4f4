//! Narrative summaries from a hosted language model.
//!
//! The prompt is composed by `usage_core::narrative`; this module only ships
//! it to an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{config::SummarizerConfig, error::DashboardError};

#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, DashboardError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
}

impl OpenAiSummarizer {
    pub fn from_config(cfg: &SummarizerConfig) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| {
                DashboardError::Summarization(format!("failed to build HTTP client: {e}"))
            })?;

        if cfg.api_key.is_none() {
            tracing::warn!(
                env = %cfg.api_key_env,
                "summarizer API key not set; calling without credentials"
            );
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            max_tokens: cfg.max_tokens,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, DashboardError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::Summarization(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(DashboardError::Summarization(format!("HTTP {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::Summarization(format!("invalid response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DashboardError::Summarization("response contained no text".to_string()))
    }
}

#[async_trait::async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, DashboardError> {
        metrics::counter!("summarizer_requests_total").increment(1);

        let result = self.complete(prompt).await;
        if let Err(e) = &result {
            metrics::counter!("summarizer_failed_total").increment(1);
            tracing::warn!(error = %e, model = %self.model, "summarizer call failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config(base_url: String, api_key: Option<&str>) -> SummarizerConfig {
        SummarizerConfig {
            base_url,
            model: "test-model".to_string(),
            api_key_env: "SUMMARIZER_API_KEY".to_string(),
            timeout_secs: 5,
            max_tokens: Some(256),
            api_key: api_key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn returns_first_choice_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "max_tokens": 256,
                "messages": [{ "role": "user", "content": "prompt text" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "  Pemakaian stabil.  " } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let summarizer =
            OpenAiSummarizer::from_config(&config(format!("{}/v1/", server.url()), Some("secret")))
                .unwrap();
        let text = summarizer.summarize("prompt text").await.unwrap();

        assert_eq!(text, "Pemakaian stabil.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let summarizer = OpenAiSummarizer::from_config(&config(server.url(), None)).unwrap();
        let err = summarizer.summarize("p").await.unwrap_err();

        let msg = err.user_message();
        assert!(msg.starts_with("AI summary failed: HTTP 429"));
        assert!(msg.contains("rate limited"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let summarizer = OpenAiSummarizer::from_config(&config(server.url(), None)).unwrap();
        let err = summarizer.summarize("p").await.unwrap_err();
        assert!(matches!(err, DashboardError::Summarization(_)));
    }
}
