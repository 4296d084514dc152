//! Analysis result and output envelope types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content category assigned by analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Article,
    Video,
    Audio,
    Image,
    Document,
    Spreadsheet,
    Presentation,
    Code,
    Reference,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl Category {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Article => "article",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Image => "image",
            Category::Document => "document",
            Category::Spreadsheet => "spreadsheet",
            Category::Presentation => "presentation",
            Category::Code => "code",
            Category::Reference => "reference",
            Category::Other => "other",
        }
    }

    /// Lenient parse of a model-supplied category string; anything
    /// unrecognized falls back to `Other`.
    pub fn from_loose(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "article" | "blog" | "post" | "news" => Category::Article,
            "video" => Category::Video,
            "audio" | "podcast" | "music" => Category::Audio,
            "image" | "photo" | "screenshot" => Category::Image,
            "document" | "pdf" | "paper" | "report" => Category::Document,
            "spreadsheet" | "sheet" | "data" => Category::Spreadsheet,
            "presentation" | "slides" | "deck" => Category::Presentation,
            "code" | "repository" | "repo" => Category::Code,
            "reference" | "documentation" | "docs" | "wiki" => Category::Reference,
            _ => Category::Other,
        }
    }
}

/// Structured analysis produced by the model and normalized by the
/// pipeline.
///
/// Invariants after normalization: `title` is non-empty; `tags` holds 1–6
/// unique, lowercase, hyphen-normalized entries; `category` is always set
/// (falling back to `other`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Concise human title for the content
    pub title: String,

    /// One- or two-sentence description
    pub description: String,

    /// 1-6 short topical tags, lowercase
    pub tags: Vec<String>,

    /// Best-fit category
    pub category: Category,

    /// Longer prose summary, when the content supports one
    pub summary: Option<String>,

    /// Notable takeaways, when the content supports them
    pub key_points: Option<Vec<String>>,

    /// Text read out of the content (used by image OCR)
    pub extracted_text: Option<String>,

    /// Representative image URL, if one exists
    pub preview_image_url: Option<String>,

    /// Model confidence in the classification, 0.0-1.0
    pub confidence: Option<f32>,
}

impl AnalysisResult {
    /// A minimal fallback result carrying only what extraction derived.
    pub fn fallback(title: impl Into<String>, category: Category) -> Self {
        let title = title.into();
        Self {
            title,
            description: String::new(),
            tags: vec![category.as_str().to_string()],
            category,
            summary: None,
            key_points: None,
            extracted_text: None,
            preview_image_url: None,
            confidence: None,
        }
    }
}

/// Final output envelope returned to the caller; a superset of
/// [`AnalysisResult`] with source attribution fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEnvelope {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Category,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisEnvelope {
    /// Build an envelope from a normalized result, with attribution fields
    /// unset.
    pub fn from_result(result: AnalysisResult) -> Self {
        Self {
            title: result.title,
            description: result.description,
            tags: result.tags,
            category: result.category,
            summary: result.summary,
            key_points: result.key_points,
            extracted_text: result.extracted_text,
            preview_image_url: result.preview_image_url,
            author: None,
            platform: None,
            content_type: None,
            site_name: None,
            published_time: None,
            confidence: result.confidence,
            analyzed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        let json = serde_json::to_value(Category::Spreadsheet).unwrap();
        assert_eq!(json, "spreadsheet");
        let back: Category = serde_json::from_value(json).unwrap();
        assert_eq!(back, Category::Spreadsheet);
    }

    #[test]
    fn test_category_loose_parse() {
        assert_eq!(Category::from_loose("Article"), Category::Article);
        assert_eq!(Category::from_loose(" PDF "), Category::Document);
        assert_eq!(Category::from_loose("llm-generated-nonsense"), Category::Other);
    }

    #[test]
    fn test_fallback_result_has_tag() {
        let result = AnalysisResult::fallback("Quarterly Report", Category::Document);
        assert_eq!(result.tags, vec!["document"]);
        assert!(result.summary.is_none());
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let mut envelope =
            AnalysisEnvelope::from_result(AnalysisResult::fallback("T", Category::Video));
        envelope.preview_image_url = Some("https://i.ytimg.com/vi/x/maxresdefault.jpg".into());
        envelope.content_type = Some("video".into());

        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("previewImageUrl").is_some());
        assert!(json.get("contentType").is_some());
        assert!(json.get("summary").is_none(), "None fields are omitted");
    }

    #[test]
    fn test_tool_schema_exposes_camel_case_fields() {
        use openrouter_client::StructuredTool;

        let tool = AnalysisResult::tool_definition("record_analysis", "Record the analysis");
        let props = tool.function.parameters["properties"].as_object().unwrap();
        assert!(props.contains_key("keyPoints"));
        assert!(props.contains_key("previewImageUrl"));
        assert!(props.contains_key("category"));
    }
}
