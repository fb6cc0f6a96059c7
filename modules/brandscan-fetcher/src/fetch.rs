use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Result of a successful fetch: rendered HTML, plus an optional full-page
/// screenshot when one was requested and the strategy produced one.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub html: String,
    pub screenshot: Option<Vec<u8>>,
}

impl FetchOutcome {
    /// Per C1's contract: a body only counts as HTML when it begins with a
    /// tag character. Anything else (JSON error page, empty body, plain
    /// text) is treated as no content at all.
    pub fn looks_like_html(body: &str) -> bool {
        body.trim_start().starts_with('<')
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, want_screenshot: bool) -> Result<FetchOutcome>;
    fn name(&self) -> &str;
}

/// Tries `primary`, falls back to `secondary` on any error or on content
/// that doesn't pass [`FetchOutcome::looks_like_html`].
pub struct FallbackFetcher {
    primary: Box<dyn PageFetcher>,
    secondary: Box<dyn PageFetcher>,
}

impl FallbackFetcher {
    pub fn new(primary: Box<dyn PageFetcher>, secondary: Box<dyn PageFetcher>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl PageFetcher for FallbackFetcher {
    async fn fetch(&self, url: &str, want_screenshot: bool) -> Result<FetchOutcome> {
        match self.primary.fetch(url, want_screenshot).await {
            Ok(outcome) if FetchOutcome::looks_like_html(&outcome.html) => Ok(outcome),
            Ok(_) => {
                warn!(
                    url,
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    "primary fetcher returned non-HTML content, falling back"
                );
                self.secondary.fetch(url, want_screenshot).await
            }
            Err(e) => {
                warn!(
                    url,
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %e,
                    "primary fetcher failed, falling back"
                );
                self.secondary.fetch(url, want_screenshot).await
            }
        }
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_detection_ignores_leading_whitespace() {
        assert!(FetchOutcome::looks_like_html("  \n<html><body></body></html>"));
        assert!(!FetchOutcome::looks_like_html("{\"error\":\"blocked\"}"));
        assert!(!FetchOutcome::looks_like_html(""));
    }
}
