//! Pipeline configuration.
//!
//! Constructed once at process start and passed by parameter into each
//! component; no ambient environment lookups inside the pipeline.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{ApiError, Result};

/// Character/size/timeout budgets for the pipeline.
///
/// The numeric values mirror the original service's tuning; they are
/// configuration rather than hard-coded constants so deployments can
/// adjust them.
#[derive(Debug, Clone)]
pub struct Budgets {
    /// Hard cap on locally extracted text, in characters.
    pub max_extract_chars: usize,

    /// Budget for sampled text sent to the model.
    pub ai_input_chars: usize,

    /// Documents at or under the sampling threshold are sent in full,
    /// truncated to this many characters.
    pub full_text_cutoff: usize,

    /// Above this many characters, head/middle/tail sampling kicks in.
    pub sample_threshold: usize,

    /// Extracted document text under this length counts as "no usable
    /// text" and triggers the multimodal fallback for PDFs.
    pub min_document_text: usize,

    /// Maximum PDF pages walked.
    pub max_pdf_pages: usize,

    /// Maximum slides read from a presentation.
    pub max_slides: usize,

    /// Sample rows taken from a spreadsheet after the header row.
    pub max_sample_rows: usize,

    /// Bullet-point caps for presentations.
    pub max_bullets: usize,
    pub bullets_per_slide: usize,
    pub min_bullet_chars: usize,

    /// Expected embedding vector length; anything else is rejected.
    pub embedding_dim: usize,

    /// Extracted-text contribution to the embedding composition.
    pub embed_content_chars: usize,

    /// Response body cap for fetches.
    pub max_body_bytes: usize,

    /// Timeout for page and file fetches.
    pub fetch_timeout: Duration,

    /// Timeout for oEmbed lookups.
    pub oembed_timeout: Duration,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_extract_chars: 50_000,
            ai_input_chars: 3_000,
            full_text_cutoff: 2_500,
            sample_threshold: 15_000,
            min_document_text: 40,
            max_pdf_pages: 50,
            max_slides: 20,
            max_sample_rows: 5,
            max_bullets: 15,
            bullets_per_slide: 5,
            min_bullet_chars: 6,
            embedding_dim: 1536,
            embed_content_chars: 500,
            max_body_bytes: 10 * 1024 * 1024,
            fetch_timeout: Duration::from_secs(10),
            oembed_timeout: Duration::from_secs(5),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// OpenRouter API key.
    pub api_key: SecretString,

    /// Scrape-fallback service API key, if the fallback is enabled.
    pub scrape_api_key: Option<SecretString>,

    /// Chat model used for analysis.
    pub analysis_model: String,

    /// Embedding model.
    pub embedding_model: String,

    /// Budgets and timeouts.
    pub budgets: Budgets,
}

impl IngestionConfig {
    /// Create a config with default models and budgets.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            scrape_api_key: None,
            analysis_model: "openai/gpt-4o-mini".to_string(),
            embedding_model: "openai/text-embedding-3-small".to_string(),
            budgets: Budgets::default(),
        }
    }

    /// Read configuration from the environment (`OPENROUTER_API_KEY`,
    /// optionally `FIRECRAWL_API_KEY`, `ANALYSIS_MODEL`, `EMBEDDING_MODEL`).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ApiError::internal("OPENROUTER_API_KEY not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(key) = std::env::var("FIRECRAWL_API_KEY") {
            config.scrape_api_key = Some(SecretString::from(key));
        }
        if let Ok(model) = std::env::var("ANALYSIS_MODEL") {
            config.analysis_model = model;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        Ok(config)
    }

    /// Set the analysis model.
    pub fn with_analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = model.into();
        self
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the scrape-fallback API key.
    pub fn with_scrape_api_key(mut self, key: impl Into<String>) -> Self {
        self.scrape_api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Override budgets.
    pub fn with_budgets(mut self, budgets: Budgets) -> Self {
        self.budgets = budgets;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets_preserve_tuning() {
        let budgets = Budgets::default();
        assert_eq!(budgets.ai_input_chars, 3_000);
        assert_eq!(budgets.full_text_cutoff, 2_500);
        assert_eq!(budgets.sample_threshold, 15_000);
        assert_eq!(budgets.min_document_text, 40);
        assert_eq!(budgets.embedding_dim, 1536);
        assert_eq!(budgets.oembed_timeout, Duration::from_secs(5));
        assert_eq!(budgets.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder() {
        let config = IngestionConfig::new("sk-or-test")
            .with_analysis_model("openai/gpt-4o")
            .with_scrape_api_key("fc-test");

        assert_eq!(config.analysis_model, "openai/gpt-4o");
        assert!(config.scrape_api_key.is_some());
    }
}
