//! Main-content extraction from HTML.
//!
//! A deterministic, "good enough" readability pass: parse the DOM, score
//! candidate containers by text volume minus link density, skip obvious
//! boilerplate, and take the winner. Falls back to crude tag stripping
//! when no candidate clears the bar.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extract::sample::collapse_whitespace;

/// Containers under this many characters never win.
const MIN_CANDIDATE_CHARS: usize = 200;

/// Extract the page's main textual content.
pub fn extract_main_content(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let candidates = Selector::parse("article, main, section, div").ok()?;
    let anchors = Selector::parse("a").ok()?;

    let mut best: Option<(f64, String)> = None;

    for element in doc.select(&candidates) {
        if is_boilerplate(&element) {
            continue;
        }

        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        let text_chars = text.chars().count();
        if text_chars < MIN_CANDIDATE_CHARS {
            continue;
        }

        let link_chars: usize = element
            .select(&anchors)
            .map(|a| a.text().collect::<String>().chars().count())
            .sum();

        let link_density = link_chars as f64 / text_chars as f64;
        let score = text_chars as f64 * (1.0 - link_density);

        if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
            best = Some((score, text));
        }
    }

    best.map(|(_, text)| text)
}

fn is_boilerplate(element: &ElementRef) -> bool {
    let tag = element.value().name();
    if matches!(tag, "nav" | "header" | "footer" | "aside") {
        return true;
    }

    let class_and_id = format!(
        "{} {}",
        element.value().attr("class").unwrap_or(""),
        element.value().attr("id").unwrap_or("")
    )
    .to_lowercase();

    ["nav", "menu", "footer", "sidebar", "comment", "promo", "banner", "cookie"]
        .iter()
        .any(|marker| class_and_id.contains(marker))
}

/// Crude fallback: strip scripts, styles, and tags; decode common
/// entities; collapse whitespace.
pub fn strip_tags(html: &str) -> String {
    let script_re = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let style_re = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    let tag_re = Regex::new(r"<[^>]+>").unwrap();

    let text = script_re.replace_all(html, " ");
    let text = style_re.replace_all(&text, " ");
    let text = tag_re.replace_all(&text, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    collapse_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_html() -> String {
        let body = "The borrow checker enforces aliasing rules at compile time. ".repeat(10);
        format!(
            r#"<html><body>
<nav><a href="/">Home</a><a href="/about">About</a></nav>
<div class="sidebar">{}</div>
<article><p>{}</p></article>
<footer>Copyright</footer>
</body></html>"#,
            "Related link ".repeat(40),
            body
        )
    }

    #[test]
    fn test_picks_article_over_boilerplate() {
        let content = extract_main_content(&article_html()).unwrap();
        assert!(content.contains("borrow checker"));
        assert!(!content.contains("Copyright"));
        assert!(!content.contains("Related link"));
    }

    #[test]
    fn test_short_pages_yield_none() {
        let html = "<html><body><div>tiny</div></body></html>";
        assert!(extract_main_content(html).is_none());
    }

    #[test]
    fn test_link_farms_lose_to_prose() {
        let prose = "Plain prose sentence with no links at all. ".repeat(10);
        let links: String = (0..60)
            .map(|i| format!("<a href=\"/{i}\">link text number {i}</a> "))
            .collect();
        let html = format!(
            "<html><body><div class=\"links\">{links}</div><div class=\"story\">{prose}</div></body></html>"
        );

        let content = extract_main_content(&html).unwrap();
        assert!(content.contains("Plain prose"));
    }

    #[test]
    fn test_strip_tags() {
        let html = "<html><script>var x = 1;</script><p>Hello &amp; welcome</p></html>";
        assert_eq!(strip_tags(html), "Hello & welcome");
    }
}
