//! External scrape-service fallback.
//!
//! When the primary HTML fetch fails, one attempt goes to a rendering
//! scrape service (Firecrawl) before the pipeline degrades to URL-derived
//! metadata.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{FetchError, FetchResult};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// A page returned by the scrape fallback.
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    pub markdown: String,
    pub title: Option<String>,
}

/// Fallback scraping abstraction, mockable in tests.
#[async_trait]
pub trait ScrapeFallback: Send + Sync {
    async fn scrape(&self, url: &str) -> FetchResult<ScrapedPage>;
}

#[derive(Serialize)]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
struct ScrapeMetadata {
    title: Option<String>,
}

/// Firecrawl-backed scrape fallback.
///
/// Uses the one-shot `/scrape` endpoint with markdown output; rendering
/// JavaScript-heavy pages is the whole point of escalating here.
pub struct FirecrawlScraper {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl FirecrawlScraper {
    /// Create a scraper with the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
            api_key,
            base_url: FIRECRAWL_API_URL.to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ScrapeFallback for FirecrawlScraper {
    async fn scrape(&self, url: &str) -> FetchResult<ScrapedPage> {
        info!(url = %url, "escalating to scrape service");

        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string()],
        };

        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "scrape service request failed");
                FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: ScrapeResponse = response.json().await.map_err(|e| FetchError::BadBody {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let data = parsed
            .data
            .filter(|_| parsed.success)
            .ok_or_else(|| FetchError::BadBody {
                url: url.to_string(),
                message: "scrape service returned no data".to_string(),
            })?;

        let markdown = data.markdown.unwrap_or_default();
        if markdown.trim().is_empty() {
            return Err(FetchError::BadBody {
                url: url.to_string(),
                message: "scrape service returned empty content".to_string(),
            });
        }

        Ok(ScrapedPage {
            markdown,
            title: data.metadata.and_then(|m| m.title),
        })
    }
}
