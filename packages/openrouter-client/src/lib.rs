//! Pure OpenRouter REST API client
//!
//! A clean, minimal client for OpenRouter's OpenAI-compatible API with no
//! domain-specific logic. Supports chat completions, forced function
//! calling with multimodal content parts, and embeddings.
//!
//! # Example
//!
//! ```rust,ignore
//! use openrouter_client::{OpenRouterClient, ChatRequest, Message};
//!
//! let client = OpenRouterClient::from_env()?;
//!
//! let outcome = client.chat_completion(&ChatRequest::new("openai/gpt-4o-mini")
//!     .message(Message::user("Hello!"))).await?;
//! ```
//!
//! # Forced function calling
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use openrouter_client::StructuredTool;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Report {
//!     title: String,
//!     tags: Vec<String>,
//! }
//!
//! let tool = Report::tool_definition("report", "Report the analysis result");
//! let outcome = client
//!     .chat_completion(&ChatRequest::new("openai/gpt-4o-mini")
//!         .message(Message::user(prompt))
//!         .forced_tool(tool))
//!     .await?;
//! ```

pub mod error;
pub mod retry;
pub mod schema;
pub mod types;

pub use error::{ClientError, Result};
pub use retry::{with_retry, BACKOFF_SCHEDULE};
pub use schema::StructuredTool;
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Pure OpenRouter API client.
#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    backoff: Vec<Duration>,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENROUTER_API_URL.to_string(),
            backoff: retry::BACKOFF_SCHEDULE.to_vec(),
        }
    }

    /// Create from environment variable `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ClientError::Config("OPENROUTER_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or OpenAI-compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the retry backoff schedule.
    pub fn with_backoff(mut self, schedule: impl Into<Vec<Duration>>) -> Self {
        self.backoff = schedule.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion with retry.
    ///
    /// HTTP 429 and network-level failures retry per the backoff schedule;
    /// any other failure surfaces immediately.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatOutcome> {
        retry::with_retry(&self.backoff, || self.send_chat(request)).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatOutcome> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenRouter request failed");
                ClientError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "OpenRouter API error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Parse("response contained no choices".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            tool_calls = choice.message.tool_calls.len(),
            "OpenRouter chat completion"
        );

        Ok(ChatOutcome {
            content: choice.message.content,
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(|c| ToolInvocation {
                    name: c.function.name,
                    arguments: c.function.arguments,
                })
                .collect(),
            usage: raw.usage,
        })
    }

    /// Create an embedding for text.
    ///
    /// Single attempt, no retry: callers of this endpoint validate the
    /// result and surface failures rather than masking them with repeats.
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let response = self
            .http_client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "embedding request failed");
                ClientError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "embedding API error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let embed_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ClientError::Parse("no embedding in response".into()))
    }
}
