//! Text sampling for AI submission.
//!
//! Long documents are not truncated to a prefix: the sample takes the
//! head, a window centered on the midpoint, and the tail, so the model
//! sees representative content from throughout the document.

use crate::types::config::Budgets;

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the AI input sample for a text body.
///
/// At or under the sampling threshold the text is sent in full, truncated
/// to the full-text cutoff. Above it, the AI budget is split into three
/// equal chunks (head, a window centered on the midpoint, and tail)
/// joined with elision markers.
pub fn sample_text(text: &str, budgets: &Budgets) -> String {
    let total = text.chars().count();

    if total <= budgets.sample_threshold {
        return truncate_chars(text, budgets.full_text_cutoff).to_string();
    }

    let chunk = (budgets.ai_input_chars / 3).max(1);
    let chars: Vec<char> = text.chars().collect();

    let head: String = chars[..chunk].iter().collect();

    let mid_start = (total / 2).saturating_sub(chunk / 2);
    let mid_end = (mid_start + chunk).min(total);
    let middle: String = chars[mid_start..mid_end].iter().collect();

    let tail_start = total - chunk;
    let tail: String = chars[tail_start..].iter().collect();

    format!("{}\n[...]\n{}\n[...]\n{}", head.trim(), middle.trim(), tail.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        let t = truncate_chars(s, 4);
        assert_eq!(t, "héll");
    }

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_short_text_sent_in_full() {
        let budgets = Budgets::default();
        let text = "short document body";
        assert_eq!(sample_text(text, &budgets), text);
    }

    #[test]
    fn test_medium_text_truncated_to_cutoff() {
        let budgets = Budgets::default();
        let text = "x".repeat(10_000);
        let sample = sample_text(&text, &budgets);
        assert_eq!(sample.chars().count(), budgets.full_text_cutoff);
        assert!(!sample.contains("[...]"));
    }

    #[test]
    fn test_long_text_sampled_in_thirds() {
        let budgets = Budgets::default();
        // Distinct regions so we can verify all three show up.
        let text = format!(
            "{}{}{}",
            "A".repeat(8_000),
            "B".repeat(8_000),
            "C".repeat(8_000)
        );

        let sample = sample_text(&text, &budgets);
        assert!(sample.contains('A'));
        assert!(sample.contains('B'));
        assert!(sample.contains('C'));
        assert_eq!(sample.matches("[...]").count(), 2);
        // Three chunks plus markers stay within the AI budget.
        assert!(sample.chars().count() <= budgets.ai_input_chars + 16);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\t c"), "a b c");
    }
}
