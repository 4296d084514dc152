//! oEmbed lookups for known platforms.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::fetcher::ContentFetcher;
use crate::types::config::Budgets;
use crate::web::platform::Platform;

/// Fields we take from an oEmbed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OEmbedData {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub provider_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Fetch a platform's oEmbed document for a target URL.
///
/// Failures are soft: the caller falls through to HTML extraction.
pub async fn fetch_oembed(
    fetcher: &dyn ContentFetcher,
    platform: &Platform,
    target: &str,
    budgets: &Budgets,
) -> Option<OEmbedData> {
    let lookup = platform.oembed_url(target);

    match fetcher.fetch_json(&lookup, budgets.oembed_timeout).await {
        Ok(value) => match serde_json::from_value::<OEmbedData>(value) {
            Ok(data) => {
                debug!(platform = platform.name, has_title = data.title.is_some(), "oEmbed hit");
                Some(data)
            }
            Err(e) => {
                warn!(platform = platform.name, error = %e, "oEmbed response malformed");
                None
            }
        },
        Err(e) => {
            warn!(platform = platform.name, error = %e, "oEmbed lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oembed_parse_ignores_extra_fields() {
        let data: OEmbedData = serde_json::from_value(serde_json::json!({
            "title": "Never Gonna Give You Up",
            "author_name": "Rick Astley",
            "provider_name": "YouTube",
            "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
            "html": "<iframe></iframe>",
            "width": 200,
        }))
        .unwrap();

        assert_eq!(data.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(data.author_name.as_deref(), Some("Rick Astley"));
    }
}
