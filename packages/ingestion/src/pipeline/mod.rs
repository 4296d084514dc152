//! Request orchestration.
//!
//! Routes a validated request through the matching extractor, builds the
//! prompt, runs analysis, normalizes, and assembles the final envelope.
//! Extraction failures degrade to filename-/URL-derived metadata; AI
//! quota errors are the one category that propagates to the caller.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::ai::normalize::clean_tags;
use crate::ai::prompts::{
    document_prompt, file_prompt, image_prompt, system_prompt, url_prompt,
};
use crate::ai::{normalize, AiPayload, AnalysisPrompt, Analyzer, Attachment, OpenRouterAnalyzer};
use crate::embedding::{self, EmbeddingOutcome, EmbeddingParts};
use crate::error::{ApiError, Result};
use crate::extract::{classify, clean_filename, extract_bytes, sample_text, text, MediaKind};
use crate::fetcher::{ContentFetcher, GuardedFetcher};
use crate::security::UrlGuard;
use crate::types::analysis::{AnalysisEnvelope, AnalysisResult, Category};
use crate::types::config::{Budgets, IngestionConfig};
use crate::types::content::ExtractedContent;
use crate::types::request::{AnalyzeInput, AnalyzeRequest};
use crate::web::{FirecrawlScraper, ScrapeFallback, WebExtractor};

/// The ingestion pipeline: stateless per request, shared components.
pub struct Pipeline {
    fetcher: Arc<dyn ContentFetcher>,
    analyzer: Arc<dyn Analyzer>,
    scraper: Option<Arc<dyn ScrapeFallback>>,
    guard: UrlGuard,
    budgets: Budgets,
}

impl Pipeline {
    /// Assemble a pipeline from explicit components (the form tests use).
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        analyzer: Arc<dyn Analyzer>,
        budgets: Budgets,
    ) -> Self {
        Self {
            fetcher,
            analyzer,
            scraper: None,
            guard: UrlGuard::new(),
            budgets,
        }
    }

    /// Assemble the production pipeline from configuration.
    pub fn from_config(config: &IngestionConfig) -> Self {
        let guard = UrlGuard::new();
        let fetcher = GuardedFetcher::new(guard.clone(), config.budgets.max_body_bytes);
        let analyzer = OpenRouterAnalyzer::new(config);
        let scraper: Option<Arc<dyn ScrapeFallback>> = config
            .scrape_api_key
            .clone()
            .map(|key| Arc::new(FirecrawlScraper::new(key)) as Arc<dyn ScrapeFallback>);

        Self {
            fetcher: Arc::new(fetcher),
            analyzer: Arc::new(analyzer),
            scraper,
            guard,
            budgets: config.budgets.clone(),
        }
    }

    /// Attach a scrape-service fallback for failed page fetches.
    pub fn with_scrape_fallback(mut self, scraper: Arc<dyn ScrapeFallback>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Replace the SSRF guard (tests use the allow-list escape hatch).
    pub fn with_guard(mut self, guard: UrlGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Analyze a request and return the metadata envelope.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisEnvelope> {
        match request.validate()? {
            AnalyzeInput::Url(url) => self.analyze_url(&url).await,
            AnalyzeInput::File { url, mime, name } => {
                self.analyze_file(&url, &mime, &name).await
            }
        }
    }

    /// Generate an embedding for already-stored analysis fields.
    pub async fn embed(&self, parts: &EmbeddingParts<'_>) -> Result<EmbeddingOutcome> {
        embedding::generate_embedding(self.analyzer.as_ref(), parts, &self.budgets).await
    }

    async fn analyze_url(&self, url: &str) -> Result<AnalysisEnvelope> {
        self.guard.validate(url)?;

        let extractor = WebExtractor::new(self.fetcher.as_ref(), &self.budgets);
        let extraction = match &self.scraper {
            Some(scraper) => {
                extractor
                    .with_scrape_fallback(scraper.as_ref())
                    .extract(url)
                    .await
            }
            None => extractor.extract(url).await,
        };

        info!(
            url = %url,
            platform = ?extraction.platform,
            degraded = extraction.degraded,
            "web extraction finished"
        );

        let category = if extraction.is_video_platform {
            Category::Video
        } else if extraction
            .metadata
            .page_type
            .as_deref()
            .map(|t| t.starts_with("article"))
            .unwrap_or(false)
        {
            Category::Article
        } else {
            Category::Other
        };

        let mut fallback = AnalysisResult::fallback(
            extraction
                .metadata
                .title
                .clone()
                .unwrap_or_else(|| url.to_string()),
            category,
        );
        if let Some(description) = &extraction.metadata.description {
            fallback.description = description.clone();
        }
        let metadata_tags = clean_tags(Some(&json!(extraction.metadata.tags)));
        if !metadata_tags.is_empty() {
            fallback.tags = metadata_tags;
        }
        fallback.preview_image_url = extraction.metadata.image.clone();

        let result = if extraction.degraded {
            // Nothing retrievable to analyze.
            normalize(&AiPayload::None, &fallback).result
        } else {
            let prompt = AnalysisPrompt::text(system_prompt(), url_prompt(&extraction));
            self.run_analysis(prompt, &fallback).await?
        };

        let mut envelope = AnalysisEnvelope::from_result(result);
        envelope.platform = extraction.platform.map(str::to_string);
        envelope.content_type = if extraction.is_video_platform {
            Some("video".to_string())
        } else {
            extraction.metadata.page_type.clone()
        };
        envelope.site_name = extraction.metadata.site_name.clone();
        envelope.author = extraction.metadata.author.clone();
        envelope.published_time = extraction.metadata.published_time.clone();
        if envelope.preview_image_url.is_none() {
            envelope.preview_image_url = extraction.metadata.image.clone();
        }
        if envelope.extracted_text.is_none() && !extraction.content.is_empty() {
            envelope.extracted_text = Some(extraction.content.clone());
        }

        Ok(envelope)
    }

    async fn analyze_file(&self, file_url: &str, mime: &str, name: &str) -> Result<AnalysisEnvelope> {
        self.guard.validate(file_url)?;

        let kind = classify(mime, name);
        let cleaned = clean_filename(name);
        debug!(mime = %mime, name = %name, kind = ?kind, "file request classified");

        match kind {
            MediaKind::Video | MediaKind::Audio => {
                // Not processable here; the filename is all we have.
                let category = if kind == MediaKind::Video {
                    Category::Video
                } else {
                    Category::Audio
                };
                let result =
                    normalize(&AiPayload::None, &AnalysisResult::fallback(cleaned, category))
                        .result;
                let mut envelope = AnalysisEnvelope::from_result(result);
                envelope.content_type = Some(content_type_for(kind).to_string());
                Ok(envelope)
            }
            MediaKind::Image => {
                let fallback = AnalysisResult::fallback(cleaned, Category::Image);
                let prompt = AnalysisPrompt::text(system_prompt(), image_prompt(name))
                    .with_attachment(Attachment::Image {
                        url: file_url.to_string(),
                    });
                let result = self.run_analysis(prompt, &fallback).await?;
                let mut envelope = AnalysisEnvelope::from_result(result);
                envelope.content_type = Some("image".to_string());
                Ok(envelope)
            }
            _ => self.analyze_document(file_url, mime, name, kind, cleaned).await,
        }
    }

    async fn analyze_document(
        &self,
        file_url: &str,
        mime: &str,
        name: &str,
        kind: MediaKind,
        cleaned: String,
    ) -> Result<AnalysisEnvelope> {
        let bytes = match self
            .fetcher
            .fetch_bytes(file_url, self.budgets.fetch_timeout)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %file_url, error = %e, "file fetch failed, degrading to filename");
                let result = normalize(
                    &AiPayload::None,
                    &AnalysisResult::fallback(cleaned, category_for(kind)),
                )
                .result;
                let mut envelope = AnalysisEnvelope::from_result(result);
                envelope.content_type = Some(content_type_for(kind).to_string());
                return Ok(envelope);
            }
        };

        let content = extract_bytes(kind, &bytes, &self.budgets);

        if kind == MediaKind::Pdf && self.needs_multimodal(&content) {
            return self.analyze_pdf_multimodal(name, &cleaned, bytes, &content, mime).await;
        }

        let title = title_candidate(&content, &cleaned);
        let fallback = AnalysisResult::fallback(title, category_for(kind));

        let prompt = AnalysisPrompt::text(system_prompt(), file_prompt(name, &content));
        let result = self.run_analysis(prompt, &fallback).await?;

        let mut envelope = AnalysisEnvelope::from_result(result);
        envelope.content_type = Some(content_type_for(kind).to_string());
        envelope.author = content.properties().and_then(|p| p.author.clone());
        if envelope.extracted_text.is_none() {
            envelope.extracted_text = content
                .body_text()
                .map(|t| sample_text(t, &self.budgets))
                .filter(|t| !t.is_empty());
        }
        Ok(envelope)
    }

    /// Whether PDF extraction yielded too little text to be useful.
    fn needs_multimodal(&self, content: &ExtractedContent) -> bool {
        content
            .body_text()
            .map(|t| t.trim().chars().count())
            .unwrap_or(0)
            < self.budgets.min_document_text
    }

    /// Send the raw PDF bytes to the model as an inline attachment.
    async fn analyze_pdf_multimodal(
        &self,
        name: &str,
        cleaned: &str,
        bytes: Vec<u8>,
        content: &ExtractedContent,
        mime: &str,
    ) -> Result<AnalysisEnvelope> {
        info!(name = %name, "PDF text below threshold, escalating to multimodal");

        let title = content
            .properties()
            .and_then(|p| p.usable_title(4))
            .map(str::to_string)
            .unwrap_or_else(|| cleaned.to_string());
        let fallback = AnalysisResult::fallback(title, Category::Document);

        let prompt = AnalysisPrompt::text(system_prompt(), document_prompt(name))
            .with_attachment(Attachment::Document {
                filename: name.to_string(),
                media_type: if mime.trim().is_empty() {
                    "application/pdf".to_string()
                } else {
                    mime.to_string()
                },
                data: bytes,
            });

        let result = self.run_analysis(prompt, &fallback).await?;
        let mut envelope = AnalysisEnvelope::from_result(result);
        envelope.content_type = Some("document".to_string());
        envelope.author = content.properties().and_then(|p| p.author.clone());
        Ok(envelope)
    }

    /// Run one analysis call against the fallback floor.
    ///
    /// Quota conditions propagate unmodified; any other analyzer failure
    /// degrades to the normalized fallback.
    async fn run_analysis(
        &self,
        prompt: AnalysisPrompt,
        fallback: &AnalysisResult,
    ) -> Result<AnalysisResult> {
        match self.analyzer.analyze(&prompt).await {
            Ok(payload) => {
                let normalized = normalize(&payload, fallback);
                if normalized.used_fallback {
                    debug!("model returned nothing usable, keeping extractor metadata");
                }
                Ok(normalized.result)
            }
            Err(err) if err.is_quota() => Err(err),
            Err(err) => {
                warn!(error = %err, "analysis failed, degrading to extractor metadata");
                Ok(normalize(&AiPayload::None, fallback).result)
            }
        }
    }
}

fn category_for(kind: MediaKind) -> Category {
    match kind {
        MediaKind::Sheet => Category::Spreadsheet,
        MediaKind::Slides => Category::Presentation,
        MediaKind::Image => Category::Image,
        MediaKind::Video => Category::Video,
        MediaKind::Audio => Category::Audio,
        _ => Category::Document,
    }
}

fn content_type_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Pdf | MediaKind::Docx => "document",
        MediaKind::Sheet => "spreadsheet",
        MediaKind::Slides => "presentation",
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Audio => "audio",
        MediaKind::Text | MediaKind::Unknown => "text",
    }
}

fn title_candidate(content: &ExtractedContent, cleaned: &str) -> String {
    if let Some(title) = content.properties().and_then(|p| p.usable_title(4)) {
        return title.to_string();
    }
    if let ExtractedContent::Text { sample, .. } = content {
        if let Some(title) = text::markdown_title(sample) {
            return title;
        }
    }
    cleaned.to_string()
}
