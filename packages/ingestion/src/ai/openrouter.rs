//! OpenRouter-backed implementation of the [`Analyzer`] trait.
//!
//! Transport, retries, and the forced tool call live in the client crate;
//! this layer builds the multimodal request and maps provider errors to
//! the pipeline's boundary codes.

use async_trait::async_trait;
use base64::Engine;
use secrecy::ExposeSecret;
use tracing::debug;

use openrouter_client::{
    ChatRequest, ClientError, ContentPart, Message, OpenRouterClient, StructuredTool,
};

use crate::ai::payload::AiPayload;
use crate::ai::{AnalysisPrompt, Analyzer, Attachment};
use crate::error::{ApiError, Result};
use crate::types::analysis::AnalysisResult;
use crate::types::config::IngestionConfig;

/// Name of the forced analysis tool.
const ANALYSIS_TOOL: &str = "record_analysis";

/// Analyzer backed by OpenRouter's chat-completions API.
#[derive(Clone)]
pub struct OpenRouterAnalyzer {
    client: OpenRouterClient,
    model: String,
    embedding_model: String,
}

impl OpenRouterAnalyzer {
    /// Build from pipeline configuration.
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            client: OpenRouterClient::new(config.api_key.expose_secret()),
            model: config.analysis_model.clone(),
            embedding_model: config.embedding_model.clone(),
        }
    }

    /// Build around an existing client (custom base URL, backoff).
    pub fn with_client(
        client: OpenRouterClient,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    fn build_request(&self, prompt: &AnalysisPrompt) -> ChatRequest {
        let mut parts = vec![ContentPart::text(prompt.user.clone())];

        match &prompt.attachment {
            Some(Attachment::Image { url }) => {
                parts.push(ContentPart::image(url.clone()));
            }
            Some(Attachment::Document {
                filename,
                media_type,
                data,
            }) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(data);
                let data_url = format!("data:{};base64,{}", media_type, encoded);
                parts.push(ContentPart::file(filename.clone(), data_url));
            }
            None => {}
        }

        ChatRequest::new(self.model.clone())
            .message(Message::system(prompt.system.clone()))
            .message(Message::user_parts(parts))
            .temperature(0.2)
            .forced_tool(AnalysisResult::tool_definition(
                ANALYSIS_TOOL,
                "Record structured metadata for the analyzed content",
            ))
    }
}

/// Map client errors to boundary codes: 429 and 402 propagate as quota
/// conditions, provider 5xx becomes `ai_error`, everything else is
/// internal.
fn map_client_error(err: ClientError) -> ApiError {
    match err.api_status() {
        Some(429) => ApiError::rate_limited("AI provider rate limit exceeded"),
        Some(402) => ApiError::credits_exhausted("AI provider credits exhausted"),
        Some(status) if status >= 500 => {
            ApiError::ai_error(format!("AI provider error (HTTP {})", status))
        }
        _ => ApiError::internal(err.to_string()),
    }
}

#[async_trait]
impl Analyzer for OpenRouterAnalyzer {
    async fn analyze(&self, prompt: &AnalysisPrompt) -> Result<AiPayload> {
        let request = self.build_request(prompt);

        let outcome = self
            .client
            .chat_completion(&request)
            .await
            .map_err(map_client_error)?;

        debug!(
            model = %self.model,
            tool_calls = outcome.tool_calls.len(),
            has_content = outcome.content.is_some(),
            "analysis call completed"
        );

        Ok(AiPayload::from_response(
            outcome
                .tool_calls
                .first()
                .map(|call| call.arguments.as_str()),
            outcome.content.as_deref(),
        ))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .create_embedding(text, &self.embedding_model)
            .await
            .map_err(map_client_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_error_mapping() {
        let rate = map_client_error(ClientError::Api {
            status: 429,
            body: "slow down".into(),
        });
        assert_eq!(rate.code, ErrorCode::RateLimited);

        let credits = map_client_error(ClientError::Api {
            status: 402,
            body: "empty wallet".into(),
        });
        assert_eq!(credits.code, ErrorCode::CreditsExhausted);

        let provider = map_client_error(ClientError::Api {
            status: 503,
            body: "overloaded".into(),
        });
        assert_eq!(provider.code, ErrorCode::AiError);
        assert_eq!(provider.status(), 502);

        let network = map_client_error(ClientError::Network("reset".into()));
        assert_eq!(network.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_request_carries_forced_tool_and_attachment() {
        let config = IngestionConfig::new("sk-or-test");
        let analyzer = OpenRouterAnalyzer::new(&config);

        let prompt = AnalysisPrompt::text("system", "user").with_attachment(
            Attachment::Document {
                filename: "scan.pdf".into(),
                media_type: "application/pdf".into(),
                data: vec![1, 2, 3],
            },
        );

        let request = analyzer.build_request(&prompt);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["tool_choice"]["function"]["name"], ANALYSIS_TOOL);
        let parts = json["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "file");
        assert!(parts[1]["file"]["file_data"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,"));
    }
}
