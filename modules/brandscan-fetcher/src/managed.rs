use std::time::Duration;

use async_trait::async_trait;
use browserless_client::BrowserlessClient;
use tracing::info;

use crate::error::Result;
use crate::fetch::{FetchOutcome, PageFetcher};

/// First-stage fetch strategy: a managed, JS-rendering scraping service
/// (anti-bot, residential proxy, auto-scroll all handled server-side).
/// Screenshot, if requested, is captured in a second call against the same
/// service once the page has rendered.
pub struct ManagedScraperFetcher {
    client: BrowserlessClient,
    country: String,
}

impl ManagedScraperFetcher {
    pub fn new(base_url: &str, token: Option<&str>, country: &str) -> Self {
        Self {
            client: BrowserlessClient::new(base_url, token),
            country: country.to_string(),
        }
    }

    const HARD_TIMEOUT: Duration = Duration::from_secs(180);
}

#[async_trait]
impl PageFetcher for ManagedScraperFetcher {
    async fn fetch(&self, url: &str, want_screenshot: bool) -> Result<FetchOutcome> {
        info!(url, country = %self.country, want_screenshot, "fetching via managed scraper");

        let html = tokio::time::timeout(Self::HARD_TIMEOUT, self.client.content(url))
            .await
            .map_err(|_| crate::error::FetchError::Timeout(Self::HARD_TIMEOUT))??;

        let screenshot = if want_screenshot && FetchOutcome::looks_like_html(&html) {
            match self.client.screenshot(url, Some(70)).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(url, error = %e, "managed scraper screenshot failed, continuing without it");
                    None
                }
            }
        } else {
            None
        };

        Ok(FetchOutcome { html, screenshot })
    }

    fn name(&self) -> &str {
        "managed_scraper"
    }
}
