use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use rand::Rng;
use tracing::{info, warn};

use crate::error::{FetchError, Result};
use crate::fetch::{FetchOutcome, PageFetcher};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

const CONSENT_LABELS: &[&str] = &[
    "Accept",
    "I agree",
    "Alle akzeptieren",
    "Zustimmen",
    "Allow all",
    "Accept all",
];

fn random_user_agent() -> &'static str {
    let idx = rand::rng().random_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Second-stage fetch strategy: drives a real chromium-compatible engine
/// end to end (navigate, dismiss consent banners, scroll to trigger lazy
/// content, wait for visual readiness) when the managed scraper fails or
/// returns non-HTML content.
pub struct HeadlessBrowserFetcher {
    nav_timeout: Duration,
}

impl HeadlessBrowserFetcher {
    pub fn new() -> Self {
        Self {
            nav_timeout: Duration::from_secs(90),
        }
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
        let config = BrowserConfig::builder()
            .arg(format!("--user-agent={}", random_user_agent()))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .window_size(1920, 1080)
            .build()
            .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch browser: {e}")))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "headless browser handler error");
                }
            }
        });

        Ok((browser, handle))
    }

    async fn dismiss_consent_banner(&self, page: &Page) {
        for label in CONSENT_LABELS {
            let script = format!(
                r#"(() => {{
                    const re = new RegExp({label:?}, 'i');
                    const candidates = Array.from(document.querySelectorAll('button, [role="button"], a'));
                    const hit = candidates.find(el => re.test((el.innerText || el.textContent || '').trim()));
                    if (hit) {{ hit.click(); return true; }}
                    return false;
                }})()"#,
                label = label
            );
            match page.evaluate(script).await {
                Ok(result) if result.value().and_then(|v| v.as_bool()).unwrap_or(false) => {
                    info!(label, "consent banner dismissed");
                    return;
                }
                _ => continue,
            }
        }
        info!("no common consent banner found to click");
    }

    async fn scroll_page(&self, page: &Page) {
        let script = r#"(async () => {
            const step = 800;
            let y = 0;
            const sleep = ms => new Promise(r => setTimeout(r, ms));
            const maxScrolls = 50;
            let scrollCount = 0;
            while (y < document.body.scrollHeight && scrollCount < maxScrolls) {
                window.scrollBy(0, step);
                y += step;
                scrollCount++;
                await sleep(120);
            }
            window.scrollTo(0, 0);
        })()"#;
        if let Err(e) = page.evaluate(script).await {
            warn!(error = %e, "scroll simulation failed");
        }
    }

    async fn wait_for_visual_readiness(&self, page: &Page) {
        let readiness_check = r#"(() => {
            const imagesReady = Array.from(document.images).every(img => img.complete && img.naturalWidth > 0);
            const fontsReady = !('fonts' in document) || document.fonts.status === 'loaded';
            const noSkeletons = !document.querySelector('[class*=skeleton],[data-skeleton],[aria-busy="true"]');
            return imagesReady && fontsReady && noSkeletons;
        })()"#;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
        loop {
            match page.evaluate(readiness_check).await {
                Ok(result) if result.value().and_then(|v| v.as_bool()).unwrap_or(false) => {
                    info!("page is visually ready");
                    return;
                }
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                warn!("strict visual readiness check timed out, proceeding anyway");
                return;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn fetch_once(&self, url: &str, want_screenshot: bool) -> Result<FetchOutcome> {
        let (browser, handler) = self.launch().await?;

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| FetchError::Browser(format!("navigation failed: {e}")))?;

        tokio::time::timeout(self.nav_timeout, page.wait_for_navigation())
            .await
            .map_err(|_| FetchError::Timeout(self.nav_timeout))?
            .map_err(|e| FetchError::Browser(format!("navigation wait failed: {e}")))?;

        self.dismiss_consent_banner(&page).await;
        self.scroll_page(&page).await;
        self.wait_for_visual_readiness(&page).await;

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("failed reading page content: {e}")))?;

        let screenshot = if want_screenshot {
            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Jpeg)
                .build();
            match page.screenshot(params).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(url, error = %e, "headless screenshot failed, continuing without it");
                    None
                }
            }
        } else {
            None
        };

        drop(page);
        let _ = browser.close().await;
        handler.abort();

        Ok(FetchOutcome { html, screenshot })
    }
}

impl Default for HeadlessBrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HeadlessBrowserFetcher {
    async fn fetch(&self, url: &str, want_screenshot: bool) -> Result<FetchOutcome> {
        info!(url, want_screenshot, "fetching via headless browser");
        match self.fetch_once(url, want_screenshot).await {
            Ok(outcome) => Ok(outcome),
            Err(FetchError::Browser(msg)) if msg.to_lowercase().contains("crashed") => {
                warn!(url, "headless browser crashed, retrying once");
                self.fetch_once(url, want_screenshot).await
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "headless_browser"
    }
}
