//! Web metadata extraction for URL-mode requests.
//!
//! Flow: platform detection → oEmbed (video platforms stop here on
//! success) → HTML fetch with layered metadata merge and readability
//! content → scrape-service fallback → URL-derived degradation. This
//! stage never hard-fails; quota and security errors are the pipeline's
//! concern, not this one's.

pub mod metadata;
pub mod oembed;
pub mod platform;
pub mod readability;
pub mod scrape_service;

pub use platform::{Platform, PlatformKind};
pub use scrape_service::{FirecrawlScraper, ScrapeFallback, ScrapedPage};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::extract::sample::sample_text;
use crate::fetcher::{ContentFetcher, FetchedText};
use crate::types::config::Budgets;
use crate::types::web::WebMetadata;

/// Everything the URL path learned about a page.
#[derive(Debug, Clone)]
pub struct WebExtraction {
    pub url: String,
    pub metadata: WebMetadata,
    /// Text sample for the AI prompt
    pub content: String,
    pub platform: Option<&'static str>,
    pub is_video_platform: bool,
    /// True when both the HTML fetch and the scrape fallback failed
    pub degraded: bool,
    pub fetched_at: DateTime<Utc>,
}

/// URL-mode extractor.
pub struct WebExtractor<'a> {
    fetcher: &'a dyn ContentFetcher,
    scraper: Option<&'a dyn ScrapeFallback>,
    budgets: &'a Budgets,
}

impl<'a> WebExtractor<'a> {
    pub fn new(fetcher: &'a dyn ContentFetcher, budgets: &'a Budgets) -> Self {
        Self {
            fetcher,
            scraper: None,
            budgets,
        }
    }

    /// Attach the scrape-service fallback.
    pub fn with_scrape_fallback(mut self, scraper: &'a dyn ScrapeFallback) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Extract metadata and a content sample for a URL. Never fails.
    pub async fn extract(&self, url: &str) -> WebExtraction {
        let detected = platform::detect(url);
        let mut oembed_metadata = WebMetadata::default();

        if let Some(p) = detected {
            debug!(url = %url, platform = p.name, "known platform detected");

            if let Some(data) = oembed::fetch_oembed(self.fetcher, p, url, self.budgets).await {
                oembed_metadata.title = data.title;
                oembed_metadata.author = data.author_name;
                oembed_metadata.site_name = data.provider_name;
                oembed_metadata.image = data
                    .thumbnail_url
                    .map(|t| platform::upgrade_thumbnail(p, url, &t));

                if p.is_video() {
                    // oEmbed is sufficient for video platforms; no HTML pass.
                    let content = oembed_summary(&oembed_metadata);
                    return WebExtraction {
                        url: url.to_string(),
                        metadata: oembed_metadata,
                        content,
                        platform: Some(p.name),
                        is_video_platform: true,
                        degraded: false,
                        fetched_at: Utc::now(),
                    };
                }
            }
        }

        match self.fetch_page(url).await {
            Ok(fetched) => {
                let layered = metadata::extract_metadata(&fetched.body, &fetched.final_url);
                let merged = WebMetadata::merge(vec![oembed_metadata, layered]);

                let main = readability::extract_main_content(&fetched.body)
                    .unwrap_or_else(|| readability::strip_tags(&fetched.body));
                let content = sample_text(&main, self.budgets);

                WebExtraction {
                    url: url.to_string(),
                    metadata: merged,
                    content,
                    platform: detected.map(|p| p.name),
                    is_video_platform: false,
                    degraded: false,
                    fetched_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "primary HTML fetch failed");
                self.scrape_or_degrade(url, detected, oembed_metadata).await
            }
        }
    }

    /// Fetch the page, retrying once on failure.
    async fn fetch_page(&self, url: &str) -> crate::error::FetchResult<FetchedText> {
        match self.fetcher.fetch_text(url, self.budgets.fetch_timeout).await {
            Ok(fetched) => Ok(fetched),
            Err(first) => {
                debug!(url = %url, error = %first, "retrying page fetch");
                self.fetcher.fetch_text(url, self.budgets.fetch_timeout).await
            }
        }
    }

    async fn scrape_or_degrade(
        &self,
        url: &str,
        detected: Option<&'static Platform>,
        mut metadata: WebMetadata,
    ) -> WebExtraction {
        if let Some(scraper) = self.scraper {
            match scraper.scrape(url).await {
                Ok(page) => {
                    info!(url = %url, "scrape fallback recovered the page");
                    if metadata.title.is_none() {
                        metadata.title = page.title;
                    }
                    let content = sample_text(&page.markdown, self.budgets);
                    return WebExtraction {
                        url: url.to_string(),
                        metadata,
                        content,
                        platform: detected.map(|p| p.name),
                        is_video_platform: false,
                        degraded: false,
                        fetched_at: Utc::now(),
                    };
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "scrape fallback failed");
                }
            }
        }

        // Last resort: URL-derived metadata, never a hard failure.
        metadata.title.get_or_insert_with(|| url.to_string());
        metadata
            .description
            .get_or_insert_with(|| "The page content could not be retrieved.".to_string());

        WebExtraction {
            url: url.to_string(),
            metadata,
            content: String::new(),
            platform: detected.map(|p| p.name),
            is_video_platform: false,
            degraded: true,
            fetched_at: Utc::now(),
        }
    }
}

/// One-line text stand-in for video pages, built from oEmbed fields.
fn oembed_summary(metadata: &WebMetadata) -> String {
    let mut parts = Vec::new();
    if let Some(title) = &metadata.title {
        parts.push(title.clone());
    }
    if let Some(author) = &metadata.author {
        parts.push(format!("by {}", author));
    }
    if let Some(site) = &metadata.site_name {
        parts.push(format!("on {}", site));
    }
    parts.join(" ")
}
