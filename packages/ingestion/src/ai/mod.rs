//! AI analysis abstraction.
//!
//! The [`Analyzer`] trait is the seam between the pipeline and the model
//! provider: implementations handle transport, retries, and provider
//! error mapping, and hand back the raw payload shape for the normalizer.

pub mod normalize;
pub mod openrouter;
pub mod payload;
pub mod prompts;

pub use normalize::{normalize, Normalized};
pub use openrouter::OpenRouterAnalyzer;
pub use payload::AiPayload;

use async_trait::async_trait;

use crate::error::Result;

/// A prompt for one analysis call: text plus an optional visual or
/// inline-document attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
    pub attachment: Option<Attachment>,
}

impl AnalysisPrompt {
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Non-text input submitted alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Image by URL; the model fetches and reads it
    Image { url: String },

    /// Raw document bytes, inlined as a data URL (multimodal fallback)
    Document {
        filename: String,
        media_type: String,
        data: Vec<u8>,
    },
}

/// Model-provider seam used by the pipeline.
///
/// `analyze` performs one structured analysis call (with the provider's
/// retry policy applied inside) and returns the raw payload; `embed`
/// performs a single embedding call with no retry.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, prompt: &AnalysisPrompt) -> Result<AiPayload>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
