//! Plain-text and markdown extraction.

use crate::extract::sample::sample_text;
use crate::types::config::Budgets;
use crate::types::content::ExtractedContent;

/// Build a representative sample of a text body.
pub fn extract_text_content(body: &str, budgets: &Budgets) -> ExtractedContent {
    ExtractedContent::Text {
        sample: sample_text(body, budgets),
        total_chars: body.chars().count(),
    }
}

/// First markdown H1 heading, as a title candidate.
pub fn markdown_title(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_kept_whole() {
        let content = extract_text_content("a note", &Budgets::default());
        match content {
            ExtractedContent::Text {
                sample,
                total_chars,
            } => {
                assert_eq!(sample, "a note");
                assert_eq!(total_chars, 6);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_markdown_title() {
        assert_eq!(
            markdown_title("intro\n# Release Notes\nbody"),
            Some("Release Notes".to_string())
        );
        assert_eq!(markdown_title("## not a top-level heading"), None);
        assert_eq!(markdown_title("no headings here"), None);
    }
}
