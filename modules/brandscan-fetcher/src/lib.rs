//! Two-stage page fetcher: a managed, JS-rendering scraper service first,
//! a locally-driven headless browser second. Both stages produce the same
//! [`fetch::FetchOutcome`] shape so the rest of the pipeline never has to
//! know which strategy actually served a given URL.

pub mod error;
pub mod fetch;
pub mod headless;
pub mod managed;

pub use error::{FetchError, Result};
pub use fetch::{FallbackFetcher, FetchOutcome, PageFetcher};
pub use headless::HeadlessBrowserFetcher;
pub use managed::ManagedScraperFetcher;

use brandscan_common::Config;

/// Build the standard two-stage cascade (managed scraper, then headless
/// browser) from process configuration.
pub fn default_fetcher(config: &Config) -> FallbackFetcher {
    let managed = ManagedScraperFetcher::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
        &config.fetcher_country,
    );
    FallbackFetcher::new(Box::new(managed), Box::new(HeadlessBrowserFetcher::new()))
}
