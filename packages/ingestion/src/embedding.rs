//! Embedding text composition and dimension validation.
//!
//! Called separately from analysis, once the envelope is stored. The
//! composed string carries labeled sections in priority order; a vector
//! of any length other than the configured dimension is rejected rather
//! than passed downstream, where it would corrupt similarity search.

use tracing::{debug, warn};

use crate::ai::Analyzer;
use crate::error::{ApiError, Result};
use crate::extract::sample::truncate_chars;
use crate::types::config::Budgets;

/// Inputs for embedding composition, from the stored analysis.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingParts<'a> {
    pub title: &'a str,
    pub summary: Option<&'a str>,
    pub tags: &'a [String],
    pub content: Option<&'a str>,
}

/// Result of an embedding attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingOutcome {
    /// A validated vector of the configured dimension
    Embedded(Vec<f32>),

    /// Nothing to embed; no service call was made
    NoContent,
}

/// Compose the labeled embedding text: Tags, Title, Summary, then a
/// bounded slice of content. Returns `None` when every section is empty.
pub fn compose_embedding_text(parts: &EmbeddingParts<'_>, content_cap: usize) -> Option<String> {
    let mut sections = Vec::new();

    if !parts.tags.is_empty() {
        sections.push(format!("Tags: {}", parts.tags.join(", ")));
    }
    if !parts.title.trim().is_empty() {
        sections.push(format!("Title: {}", parts.title.trim()));
    }
    if let Some(summary) = parts.summary.map(str::trim).filter(|s| !s.is_empty()) {
        sections.push(format!("Summary: {}", summary));
    }
    if let Some(content) = parts.content.map(str::trim).filter(|s| !s.is_empty()) {
        sections.push(format!("Content: {}", truncate_chars(content, content_cap)));
    }

    (!sections.is_empty()).then(|| sections.join("\n"))
}

/// Generate and validate an embedding for stored analysis fields.
///
/// One service call, no retry. A dimension mismatch is a hard error: the
/// vector is discarded, never returned.
pub async fn generate_embedding(
    analyzer: &dyn Analyzer,
    parts: &EmbeddingParts<'_>,
    budgets: &Budgets,
) -> Result<EmbeddingOutcome> {
    let Some(text) = compose_embedding_text(parts, budgets.embed_content_chars) else {
        debug!("nothing to embed, skipping service call");
        return Ok(EmbeddingOutcome::NoContent);
    };

    let vector = analyzer.embed(&text).await?;

    if vector.len() != budgets.embedding_dim {
        warn!(
            got = vector.len(),
            expected = budgets.embedding_dim,
            "embedding dimension mismatch, rejecting vector"
        );
        return Err(ApiError::internal(format!(
            "embedding dimension mismatch: got {}, expected {}",
            vector.len(),
            budgets.embedding_dim
        )));
    }

    Ok(EmbeddingOutcome::Embedded(vector))
}
