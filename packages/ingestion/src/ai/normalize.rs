//! Defensive normalization of model output.
//!
//! The model's payload is merged over extractor-derived fallback values
//! and cleaned. Parse failures and junk shapes are never errors here:
//! the fallback object is the floor the result can't sink below.

use serde_json::{Map, Value};

use crate::ai::payload::{find_json_object, AiPayload};
use crate::types::analysis::{AnalysisResult, Category};

/// Maximum tags kept after cleaning.
pub const MAX_TAGS: usize = 6;

/// A normalized result, flagged when the model contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: AnalysisResult,
    pub used_fallback: bool,
}

/// Normalize a payload against extractor-derived fallback values.
pub fn normalize(payload: &AiPayload, fallback: &AnalysisResult) -> Normalized {
    let parsed: Option<Map<String, Value>> = match payload {
        AiPayload::ToolCall(value) | AiPayload::ContentJson(value) => {
            value.as_object().cloned()
        }
        AiPayload::ContentText(text) => {
            find_json_object(text).and_then(|v| v.as_object().cloned())
        }
        AiPayload::None => None,
    };

    match parsed {
        Some(object) => Normalized {
            result: clean(merge(fallback, object), fallback),
            used_fallback: false,
        },
        None => Normalized {
            result: clean(base_map(fallback), fallback),
            used_fallback: true,
        },
    }
}

/// Shallow merge: parsed values win over fallback values, nulls don't.
fn merge(fallback: &AnalysisResult, parsed: Map<String, Value>) -> Map<String, Value> {
    let mut merged = base_map(fallback);
    for (key, value) in parsed {
        if !value.is_null() {
            merged.insert(key, value);
        }
    }
    merged
}

fn base_map(fallback: &AnalysisResult) -> Map<String, Value> {
    match serde_json::to_value(fallback) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Cleaning pass: trim text fields, enforce tag invariants, parse the
/// category leniently, and backfill the title from the fallback.
fn clean(map: Map<String, Value>, fallback: &AnalysisResult) -> AnalysisResult {
    let category = map
        .get("category")
        .and_then(Value::as_str)
        .map(Category::from_loose)
        .unwrap_or(fallback.category);

    let mut tags = clean_tags(map.get("tags"));
    if tags.is_empty() {
        tags = clean_tags(Some(&Value::Array(
            fallback.tags.iter().cloned().map(Value::String).collect(),
        )));
    }
    if tags.is_empty() {
        tags = vec![category.as_str().to_string()];
    }

    let title = trimmed(&map, "title")
        .unwrap_or_else(|| fallback.title.clone());

    AnalysisResult {
        title,
        description: trimmed(&map, "description").unwrap_or_default(),
        tags,
        category,
        summary: trimmed(&map, "summary"),
        key_points: clean_key_points(map.get("keyPoints")),
        extracted_text: trimmed(&map, "extractedText"),
        preview_image_url: trimmed(&map, "previewImageUrl"),
        confidence: map
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c.clamp(0.0, 1.0) as f32),
    }
}

fn trimmed(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Tag cleaning: lowercase, whitespace runs become hyphens, empties drop,
/// duplicates drop, capped at [`MAX_TAGS`].
pub fn clean_tags(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    let mut tags = Vec::new();

    for tag in raw {
        let normalized = tag
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        tags.push(normalized);
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    tags
}

fn clean_key_points(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    let points: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!points.is_empty()).then_some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> AnalysisResult {
        AnalysisResult::fallback("Fallback Title", Category::Document)
    }

    #[test]
    fn test_tool_call_wins_over_fallback() {
        let payload = AiPayload::ToolCall(json!({
            "title": "Model Title",
            "description": "Model description",
            "tags": ["Rust", "Systems Programming"],
            "category": "article",
        }));

        let normalized = normalize(&payload, &fallback());
        assert!(!normalized.used_fallback);
        assert_eq!(normalized.result.title, "Model Title");
        assert_eq!(normalized.result.category, Category::Article);
        assert_eq!(normalized.result.tags, vec!["rust", "systems-programming"]);
    }

    #[test]
    fn test_none_payload_uses_fallback() {
        let normalized = normalize(&AiPayload::None, &fallback());
        assert!(normalized.used_fallback);
        assert_eq!(normalized.result.title, "Fallback Title");
        assert_eq!(normalized.result.category, Category::Document);
        assert_eq!(normalized.result.tags, vec!["document"]);
    }

    #[test]
    fn test_unparseable_text_uses_fallback() {
        let payload = AiPayload::ContentText("sorry, I can't help with that".into());
        let normalized = normalize(&payload, &fallback());
        assert!(normalized.used_fallback);
        assert_eq!(normalized.result.title, "Fallback Title");
    }

    #[test]
    fn test_text_with_embedded_json_parses() {
        let payload =
            AiPayload::ContentText(r#"Sure! {"title": "Embedded", "tags": ["ok"]}"#.into());
        let normalized = normalize(&payload, &fallback());
        assert!(!normalized.used_fallback);
        assert_eq!(normalized.result.title, "Embedded");
    }

    #[test]
    fn test_null_fields_keep_fallback_values() {
        let payload = AiPayload::ToolCall(json!({
            "title": null,
            "description": "only a description",
        }));
        let normalized = normalize(&payload, &fallback());
        assert_eq!(normalized.result.title, "Fallback Title");
        assert_eq!(normalized.result.description, "only a description");
    }

    #[test]
    fn test_blank_title_backfilled_from_fallback() {
        let payload = AiPayload::ToolCall(json!({"title": "   "}));
        let normalized = normalize(&payload, &fallback());
        assert_eq!(normalized.result.title, "Fallback Title");
    }

    #[test]
    fn test_tag_invariants() {
        let tags = clean_tags(Some(&json!([
            "Machine Learning",
            "machine learning",
            "  ",
            "AI",
            "ai",
            "rust",
            "wasm",
            "cli",
            "seventh-tag",
            "eighth-tag"
        ])));

        assert!(tags.len() <= MAX_TAGS);
        assert_eq!(tags, vec!["machine-learning", "ai", "rust", "wasm", "cli", "seventh-tag"]);
        for tag in &tags {
            assert_eq!(tag, &tag.to_lowercase());
            assert!(!tag.contains(' '));
        }
    }

    #[test]
    fn test_tags_from_comma_string() {
        let tags = clean_tags(Some(&json!("Alpha, Beta Gamma,")));
        assert_eq!(tags, vec!["alpha", "beta-gamma"]);
    }

    #[test]
    fn test_key_points_trimmed_uncapped() {
        let payload = AiPayload::ToolCall(json!({
            "keyPoints": [" first ", "", "second", "third", "fourth", "fifth", "sixth", "seventh"],
        }));
        let normalized = normalize(&payload, &fallback());
        let points = normalized.result.key_points.unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0], "first");
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let payload = AiPayload::ToolCall(json!({"category": "something-weird"}));
        let normalized = normalize(&payload, &fallback());
        // Lenient parse maps unknowns to Other, not to the fallback category.
        assert_eq!(normalized.result.category, Category::Other);
    }

    #[test]
    fn test_confidence_clamped() {
        let payload = AiPayload::ToolCall(json!({"confidence": 1.7}));
        let normalized = normalize(&payload, &fallback());
        assert_eq!(normalized.result.confidence, Some(1.0));
    }
}
