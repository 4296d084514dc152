//! Raw model output, as a tagged union.
//!
//! The normalizer's three-tier extraction (tool call → embedded JSON →
//! free text) becomes an exhaustive match instead of optional chaining.

/// What the model actually returned, in extraction-priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum AiPayload {
    /// Arguments of a structured tool call
    ToolCall(serde_json::Value),

    /// A JSON object found inside free-text content
    ContentJson(serde_json::Value),

    /// Free text with no parseable JSON
    ContentText(String),

    /// Nothing usable
    None,
}

impl AiPayload {
    /// Classify a response from its tool-call arguments and/or text
    /// content, in priority order.
    pub fn from_response(tool_arguments: Option<&str>, content: Option<&str>) -> Self {
        if let Some(args) = tool_arguments {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(args) {
                if value.is_object() {
                    return AiPayload::ToolCall(value);
                }
            }
        }

        if let Some(text) = content {
            if let Some(value) = find_json_object(text) {
                return AiPayload::ContentJson(value);
            }
            if !text.trim().is_empty() {
                return AiPayload::ContentText(text.to_string());
            }
        }

        AiPayload::None
    }
}

/// Locate a JSON object inside free text: the whole body (after stripping
/// markdown code fences), or the outermost `{...}` span.
pub fn find_json_object(text: &str) -> Option<serde_json::Value> {
    let stripped = strip_code_fences(text);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(stripped) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<serde_json::Value>(&stripped[start..=end])
        .ok()
        .filter(|v| v.is_object())
}

/// Strip markdown code fences from a response.
fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_takes_priority() {
        let payload = AiPayload::from_response(
            Some(r#"{"title": "From Tool"}"#),
            Some(r#"{"title": "From Content"}"#),
        );
        match payload {
            AiPayload::ToolCall(v) => assert_eq!(v["title"], "From Tool"),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_tool_args_fall_through_to_content() {
        let payload =
            AiPayload::from_response(Some("not json"), Some(r#"{"title": "Recovered"}"#));
        match payload {
            AiPayload::ContentJson(v) => assert_eq!(v["title"], "Recovered"),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_fenced_json_in_content() {
        let payload = AiPayload::from_response(
            None,
            Some("```json\n{\"title\": \"Fenced\"}\n```"),
        );
        assert!(matches!(payload, AiPayload::ContentJson(_)));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let payload = AiPayload::from_response(
            None,
            Some(r#"Here is the analysis: {"title": "Inline"} hope that helps!"#),
        );
        match payload {
            AiPayload::ContentJson(v) => assert_eq!(v["title"], "Inline"),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_kept_as_text() {
        let payload = AiPayload::from_response(None, Some("just words, no structure"));
        assert_eq!(
            payload,
            AiPayload::ContentText("just words, no structure".to_string())
        );
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(AiPayload::from_response(None, None), AiPayload::None);
        assert_eq!(AiPayload::from_response(None, Some("   ")), AiPayload::None);
    }

    #[test]
    fn test_non_object_tool_args_rejected() {
        let payload = AiPayload::from_response(Some(r#"[1, 2, 3]"#), None);
        assert_eq!(payload, AiPayload::None);
    }
}
