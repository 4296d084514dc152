//! Layered HTML metadata extraction.
//!
//! Four layers, merged with fixed priority: Open Graph > Twitter Card >
//! JSON-LD > plain HTML `<meta>`/`<title>`. First non-empty value per
//! field wins.

use regex::Regex;

use crate::types::web::WebMetadata;

/// Extract and merge all metadata layers from a page.
///
/// Relative image URLs are resolved against `base_url`.
pub fn extract_metadata(html: &str, base_url: &str) -> WebMetadata {
    let mut merged = WebMetadata::merge(vec![
        open_graph_layer(html),
        twitter_layer(html),
        json_ld_layer(html),
        html_meta_layer(html),
    ]);

    if let Some(image) = merged.image.take() {
        merged.image = resolve_url(base_url, &image);
    }

    merged
}

/// Open Graph layer: `og:*` and `article:*` properties.
pub fn open_graph_layer(html: &str) -> WebMetadata {
    WebMetadata {
        title: meta_content(html, "property", "og:title"),
        description: meta_content(html, "property", "og:description"),
        image: meta_content(html, "property", "og:image"),
        author: meta_content(html, "property", "article:author"),
        site_name: meta_content(html, "property", "og:site_name"),
        page_type: meta_content(html, "property", "og:type"),
        published_time: meta_content(html, "property", "article:published_time"),
        modified_time: meta_content(html, "property", "article:modified_time"),
        tags: meta_contents(html, "property", "article:tag"),
    }
}

/// Twitter Card layer: `twitter:*` names.
pub fn twitter_layer(html: &str) -> WebMetadata {
    WebMetadata {
        title: meta_content(html, "name", "twitter:title"),
        description: meta_content(html, "name", "twitter:description"),
        image: meta_content(html, "name", "twitter:image"),
        author: meta_content(html, "name", "twitter:creator"),
        site_name: meta_content(html, "name", "twitter:site"),
        page_type: None,
        published_time: None,
        modified_time: None,
        tags: Vec::new(),
    }
}

/// JSON-LD layer: the first node carrying a headline or name.
pub fn json_ld_layer(html: &str) -> WebMetadata {
    let script_re = Regex::new(
        r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#,
    )
    .unwrap();

    for cap in script_re.captures_iter(html) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(cap[1].trim()) else {
            continue;
        };
        for node in ld_nodes(&value) {
            if let Some(metadata) = ld_metadata(node) {
                return metadata;
            }
        }
    }

    WebMetadata::default()
}

/// Plain HTML layer: `<title>` plus classic `<meta name>` tags.
pub fn html_meta_layer(html: &str) -> WebMetadata {
    WebMetadata {
        title: title_tag(html),
        description: meta_content(html, "name", "description"),
        image: None,
        author: meta_content(html, "name", "author"),
        site_name: None,
        page_type: None,
        published_time: None,
        modified_time: None,
        tags: meta_content(html, "name", "keywords")
            .map(|k| {
                k.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Content of a `<meta>` tag, trying both attribute orders.
fn meta_content(html: &str, attr: &str, key: &str) -> Option<String> {
    let forward = Regex::new(&format!(
        r#"<meta[^>]*{}\s*=\s*["']{}["'][^>]*content\s*=\s*["']([^"']*)["']"#,
        attr,
        regex::escape(key)
    ))
    .ok()?;

    if let Some(cap) = forward.captures(html) {
        return non_empty(decode_entities(&cap[1]));
    }

    let reversed = Regex::new(&format!(
        r#"<meta[^>]*content\s*=\s*["']([^"']*)["'][^>]*{}\s*=\s*["']{}["']"#,
        attr,
        regex::escape(key)
    ))
    .ok()?;

    reversed
        .captures(html)
        .and_then(|cap| non_empty(decode_entities(&cap[1])))
}

/// All values of a repeatable `<meta>` tag (e.g. `article:tag`).
fn meta_contents(html: &str, attr: &str, key: &str) -> Vec<String> {
    let Ok(re) = Regex::new(&format!(
        r#"<meta[^>]*{}\s*=\s*["']{}["'][^>]*content\s*=\s*["']([^"']*)["']"#,
        attr,
        regex::escape(key)
    )) else {
        return Vec::new();
    };

    re.captures_iter(html)
        .filter_map(|cap| non_empty(decode_entities(&cap[1])))
        .collect()
}

fn title_tag(html: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
    re.captures(html)
        .and_then(|cap| non_empty(decode_entities(cap[1].trim())))
}

/// Flatten a JSON-LD document into candidate nodes: top-level object,
/// top-level array, or an `@graph` array.
fn ld_nodes(value: &serde_json::Value) -> Vec<&serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(map) => match map.get("@graph") {
            Some(serde_json::Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        _ => Vec::new(),
    }
}

fn ld_metadata(node: &serde_json::Value) -> Option<WebMetadata> {
    let title = node
        .get("headline")
        .or_else(|| node.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string)?;

    Some(WebMetadata {
        title: Some(title),
        description: node
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        image: ld_image(node.get("image")),
        author: ld_author(node.get("author")),
        site_name: None,
        page_type: node
            .get("@type")
            .and_then(|v| v.as_str())
            .map(|t| t.to_lowercase()),
        published_time: node
            .get("datePublished")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        modified_time: node
            .get("dateModified")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        tags: ld_keywords(node.get("keywords")),
    })
}

fn ld_image(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        serde_json::Value::Array(items) => items.first().and_then(|v| ld_image(Some(v))),
        _ => None,
    }
}

fn ld_author(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        serde_json::Value::Array(items) => items.first().and_then(|v| ld_author(Some(v))),
        _ => None,
    }
}

fn ld_keywords(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Resolve a possibly-relative URL against the page URL.
fn resolve_url(base: &str, candidate: &str) -> Option<String> {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Some(candidate.to_string());
    }
    if let Some(rest) = candidate.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    url::Url::parse(base)
        .ok()?
        .join(candidate)
        .ok()
        .map(|u| u.to_string())
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
<title>Plain Title | Site</title>
<meta name="description" content="Plain description">
<meta name="keywords" content="rust, parsing">
<meta property="og:title" content="OG Title">
<meta property="og:image" content="/images/cover.png">
<meta property="og:type" content="article">
<meta property="article:tag" content="systems">
<meta property="article:tag" content="performance">
<meta content="Twitter Title" name="twitter:title">
<meta name="twitter:description" content="Twitter description">
<script type="application/ld+json">
{"@type": "Article", "headline": "LD Headline", "datePublished": "2024-05-01T10:00:00Z",
 "author": {"name": "Ada Lovelace"}, "keywords": ["computing", "history"]}
</script>
</head><body></body></html>"#;

    #[test]
    fn test_layer_priority() {
        let meta = extract_metadata(PAGE, "https://example.com/post");
        // OG wins over Twitter, JSON-LD, and <title>.
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
        // OG has no description; Twitter's fills in before the plain meta.
        assert_eq!(meta.description.as_deref(), Some("Twitter description"));
        // Only JSON-LD carries author and publish date here.
        assert_eq!(meta.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(meta.published_time.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_relative_image_resolved() {
        let meta = extract_metadata(PAGE, "https://example.com/post");
        assert_eq!(
            meta.image.as_deref(),
            Some("https://example.com/images/cover.png")
        );
    }

    #[test]
    fn test_og_tags_collected() {
        let meta = open_graph_layer(PAGE);
        assert_eq!(meta.tags, vec!["systems", "performance"]);
        assert_eq!(meta.page_type.as_deref(), Some("article"));
    }

    #[test]
    fn test_reversed_attribute_order() {
        let meta = twitter_layer(PAGE);
        assert_eq!(meta.title.as_deref(), Some("Twitter Title"));
    }

    #[test]
    fn test_html_meta_fallback_only() {
        let html = r#"<title>Just A Title</title><meta name="keywords" content="a, b">"#;
        let meta = extract_metadata(html, "https://example.com");
        assert_eq!(meta.title.as_deref(), Some("Just A Title"));
        assert_eq!(meta.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_json_ld_graph_and_arrays() {
        let html = r#"<script type="application/ld+json">
            {"@graph": [{"@type": "WebSite"}, {"@type": "Article", "headline": "Graph Headline",
             "image": ["https://example.com/a.png"], "author": [{"name": "First Author"}]}]}
        </script>"#;
        let meta = json_ld_layer(html);
        assert_eq!(meta.title.as_deref(), Some("Graph Headline"));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(meta.author.as_deref(), Some("First Author"));
    }

    #[test]
    fn test_malformed_json_ld_skipped() {
        let html = r#"<script type="application/ld+json">{not json}</script>"#;
        assert!(json_ld_layer(html).is_empty());
    }

    #[test]
    fn test_entities_decoded() {
        let html = r#"<meta property="og:title" content="Q&amp;A session">"#;
        assert_eq!(
            open_graph_layer(html).title.as_deref(),
            Some("Q&A session")
        );
    }

    #[test]
    fn test_protocol_relative_image() {
        let html = r#"<meta property="og:image" content="//cdn.example.com/x.png">"#;
        let meta = extract_metadata(html, "https://example.com");
        assert_eq!(meta.image.as_deref(), Some("https://cdn.example.com/x.png"));
    }
}
