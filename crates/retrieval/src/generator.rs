//! Generation collaborator: prompt in, text out.

use crate::error::{Result, RetrievalError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Single-turn text generation
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Configuration for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    /// API key. Falls back to the `GROQ_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL. Default: `https://api.groq.com/openai/v1`.
    pub base_url: String,
    /// Model id. Default: `llama-3.2-90b-text-preview`.
    pub model: String,
    /// Request timeout in seconds. Default: 120.
    pub timeout_secs: u64,
}

impl Default for ChatCompletionsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.2-90b-text-preview".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ChatCompletionsConfig {
    fn api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
            .ok_or_else(|| {
                RetrievalError::generation(
                    "Generation API key not set. Set GROQ_API_KEY or configure api_key.",
                )
            })
    }
}

/// Sends each prompt as a single user message and returns the first choice.
pub struct ChatCompletionsGenerator {
    config: ChatCompletionsConfig,
    client: reqwest::Client,
}

impl ChatCompletionsGenerator {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RetrievalError::generation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ChatCompletionsConfig::default())
    }
}

#[async_trait]
impl Generator for ChatCompletionsGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.config.api_key()?;
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        log::debug!(
            "Requesting completion from {} ({} prompt bytes)",
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RetrievalError::generation(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(RetrievalError::generation(format!(
                "Completion API returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            RetrievalError::generation(format!("Failed to parse completion response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RetrievalError::generation("Completion response had no content"))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator_for(server: &mockito::Server) -> ChatCompletionsGenerator {
        ChatCompletionsGenerator::new(ChatCompletionsConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ChatCompletionsConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama-3.2-90b-text-preview");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"messages":[{"role":"user","content":"hello"}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#)
            .create_async()
            .await;

        let reply = generator_for(&server).complete("hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn test_complete_without_choices_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = generator_for(&server).complete("hello").await.unwrap_err();
        assert!(matches!(err, RetrievalError::GenerationError(_)));
    }

    #[tokio::test]
    async fn test_complete_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = generator_for(&server).complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
