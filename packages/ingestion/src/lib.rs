//! Content Ingestion & Metadata Enrichment Library
//!
//! Turns user-submitted content (a URL or an uploaded file) into a
//! structured metadata envelope (title, summary, tags, category, extracted
//! text, optional key points and preview image) suitable for storage and
//! semantic search. Deterministic format-specific extraction is combined
//! with AI enrichment under strict latency/size guardrails.
//!
//! # Design
//!
//! - Best-effort, never partial: a request yields either a complete
//!   envelope (degrading to filename-/URL-derived metadata when extraction
//!   and AI both fail) or a typed error the caller can act on.
//! - AI quota conditions (`rate_limited`, `credits_exhausted`) are the one
//!   failure class that propagates; everything else recovers locally.
//! - Every outbound fetch passes the SSRF guard first.
//! - Stateless per request: no shared mutable state, no caching.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ingestion::{AnalyzeRequest, IngestionConfig, Pipeline};
//!
//! let config = IngestionConfig::from_env()?;
//! let pipeline = Pipeline::from_config(&config);
//!
//! let envelope = pipeline
//!     .analyze(&AnalyzeRequest::for_url("https://example.com/article"))
//!     .await?;
//!
//! // Embedding generation is a separate, later call.
//! let outcome = pipeline.embed(&EmbeddingParts {
//!     title: &envelope.title,
//!     summary: envelope.summary.as_deref(),
//!     tags: &envelope.tags,
//!     content: envelope.extracted_text.as_deref(),
//! }).await?;
//! ```
//!
//! # Modules
//!
//! - [`security`] - SSRF guard run before every outbound fetch
//! - [`fetcher`] - guarded HTTP fetching with timeouts and cancellation
//! - [`extract`] - format-specific extractors (PDF, DOCX, XLSX/CSV, PPTX, text)
//! - [`web`] - platform detection, oEmbed, layered HTML metadata, readability
//! - [`ai`] - analyzer trait, prompt building, payload normalization
//! - [`embedding`] - embedding composition and dimension validation
//! - [`pipeline`] - request orchestration and envelope assembly
//! - [`testing`] - mock fetcher/analyzer for tests

pub mod ai;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod types;
pub mod web;

// Re-export core types at crate root
pub use error::{ApiError, ErrorCode, FetchError, SecurityError};
pub use types::{
    analysis::{AnalysisEnvelope, AnalysisResult, Category},
    config::{Budgets, IngestionConfig},
    content::{DocProperties, ExtractedContent},
    request::{AnalyzeInput, AnalyzeRequest},
    web::WebMetadata,
};

// Re-export the pipeline entry point
pub use pipeline::Pipeline;

// Re-export the seams
pub use ai::{AiPayload, AnalysisPrompt, Analyzer, Attachment, OpenRouterAnalyzer};
pub use embedding::{compose_embedding_text, EmbeddingOutcome, EmbeddingParts};
pub use fetcher::{ContentFetcher, GuardedFetcher};
pub use security::UrlGuard;
pub use web::{FirecrawlScraper, ScrapeFallback, ScrapedPage, WebExtraction, WebExtractor};

// Re-export testing utilities
pub use testing::{MockAnalyzer, MockFetcher};
