//! The `Scan` struct: one instance per in-flight scan, driving the five
//! phases to completion and streaming a `ScanEvent` over its channel as it
//! goes. `run` is meant to be `tokio::spawn`ed by the Gateway; its
//! `Result<ScanOutcome, ScanError>` return is the structured final value,
//! kept separate from the event stream itself.

use std::collections::HashMap;
use std::sync::Arc;

use brandscan_analyze::summarizer::{quantitative_summary, summarize_diagnosis, summarize_discovery};
use brandscan_analyze::{run_discovery_textual_keys, run_memorability_keys, synthesize_brand_summary, Services};
use brandscan_common::model::{
    AnalysisKey, AnalysisResult, Corpus, Page, ScanMode, ScanRequest, Screenshot, ScreenshotMime,
};
use brandscan_common::{Config, ScanEvent, ScanPhase, ScreenshotCache};
use brandscan_discovery::selection::{select_pages, shingle_set, Candidate, SelectionParams};
use brandscan_discovery::{discover_links_from_html, discover_links_from_sitemap, find_portal_pivot, score_link};
use brandscan_distill::{distill_page, harvest_social_text};
use brandscan_fetcher::{default_fetcher, FallbackFetcher, FetchOutcome, PageFetcher};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::ScanError;

/// How many discovered links, ranked by score, get a lightweight fetch +
/// distill pass purely to compute shingles for novelty selection.
const CANDIDATE_POOL_CAP: usize = 40;
/// Bounded worker pool for bulk page fetches, per the concurrency model.
const FETCH_CONCURRENCY: usize = 4;
/// Screenshots beyond the homepage's own, captured from the top-scored
/// selected pages, up to the Vision Analyzer's five-screenshot cap.
const EXTRA_SCREENSHOT_PAGES: usize = 4;

/// The structured final value of a completed scan, returned by `run`
/// separately from the event stream.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub mode: ScanMode,
    pub pages_analyzed: usize,
    pub keys_completed: usize,
}

pub struct Scan {
    request: ScanRequest,
    config: Arc<Config>,
    services: Arc<Services>,
    fetcher: Arc<FallbackFetcher>,
    http: reqwest::Client,
    screenshots: Arc<ScreenshotCache>,
    events: mpsc::Sender<ScanEvent>,
}

impl Scan {
    pub fn new(
        request: ScanRequest,
        config: Arc<Config>,
        services: Arc<Services>,
        screenshots: Arc<ScreenshotCache>,
        events: mpsc::Sender<ScanEvent>,
    ) -> Self {
        let fetcher = Arc::new(default_fetcher(&config));
        Self { request, config, services, fetcher, http: reqwest::Client::new(), screenshots, events }
    }

    async fn emit(&self, event: ScanEvent) {
        let _ = self.events.send(event).await;
    }

    async fn status(&self, phase: ScanPhase, progress: u8, message: &str) {
        self.emit(ScanEvent::Status { message: message.to_string(), phase, progress }).await;
    }

    async fn activity(&self, message: &str) {
        self.emit(ScanEvent::Activity { message: message.to_string(), timestamp: chrono::Utc::now() }).await;
    }

    async fn cache_screenshot(&self, bytes: Vec<u8>) -> Screenshot {
        let cache_id = Uuid::new_v4().to_string();
        let screenshot = Screenshot { cache_id, bytes, mime: ScreenshotMime::Jpeg };
        self.screenshots.put(&screenshot);
        screenshot
    }

    /// Drives all five phases to completion. Any fatal pre-analysis
    /// failure ends the stream with an `error` event and returns `Err`;
    /// per-key analysis failures are reported but do not abort the scan.
    pub async fn run(self) -> Result<ScanOutcome, ScanError> {
        match self.run_inner().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.emit(ScanEvent::Error { message: e.to_string() }).await;
                Err(e)
            }
        }
    }

    async fn run_inner(&self) -> Result<ScanOutcome, ScanError> {
        self.emit(ScanEvent::ScanStarted {
            scan_id: self.request.scan_id,
            mode: format!("{:?}", self.request.mode).to_lowercase(),
            url: self.request.seed_url.clone(),
        })
        .await;

        let (homepage, selected, corpus, extra_screenshots) = self.phase_discovery_and_extraction().await?;

        self.status(ScanPhase::BrandSynthesis, 65, "synthesizing brand overview").await;
        let brand_summary = synthesize_brand_summary(&self.services.synthesis_client, &corpus.text).await;
        self.activity("brand overview synthesized").await;
        self.status(ScanPhase::BrandSynthesis, 75, "brand overview ready").await;

        self.status(ScanPhase::Analysis, 75, "analyzing").await;
        let results = self.phase_analysis(&homepage, &selected, &corpus, brand_summary, &extra_screenshots).await;
        self.status(ScanPhase::Analysis, 90, "analysis complete").await;

        self.status(ScanPhase::Summary, 90, "summarizing").await;
        let keys_completed = results.len();
        match self.request.mode {
            ScanMode::Discovery => {
                let text = summarize_discovery(&results);
                self.emit(ScanEvent::Summary { text }).await;
            }
            ScanMode::Diagnosis => {
                let text = summarize_diagnosis(&self.services.synthesis_client, &results).await;
                let q = quantitative_summary(&results);
                self.emit(ScanEvent::QuantitativeSummary {
                    keys_analyzed: q.keys_analyzed,
                    strong_keys: q.strong_keys,
                    weak_keys: q.weak_keys,
                })
                .await;
                self.emit(ScanEvent::Summary { text }).await;
            }
        }

        self.emit(ScanEvent::Complete { message: "scan complete".to_string(), timestamp: chrono::Utc::now() }).await;

        Ok(ScanOutcome {
            scan_id: self.request.scan_id,
            mode: self.request.mode,
            pages_analyzed: selected.len() + 1,
            keys_completed,
        })
    }

    /// Phases 1 and 2 are handled together: link selection (`select_pages`)
    /// needs each candidate's distilled text to compute its shingle set, so
    /// the bulk page fetch that Content Extraction owns conceptually
    /// already has to happen during Discovery. Pages fetched once here are
    /// carried forward rather than fetched again.
    async fn phase_discovery_and_extraction(
        &self,
    ) -> Result<(Page, Vec<Page>, Corpus, Vec<Screenshot>), ScanError> {
        self.status(ScanPhase::Discovery, 10, "validating seed url").await;
        brandscan_common::ssrf::check(&self.request.seed_url)?;

        self.activity("fetching homepage").await;
        let homepage_outcome = self.fetcher.fetch(&self.request.seed_url, true).await?;
        if !FetchOutcome::looks_like_html(&homepage_outcome.html) {
            return Err(ScanError::Other(anyhow::anyhow!("homepage did not return usable HTML")));
        }

        let mut homepage_screenshot = None;
        if let Some(bytes) = homepage_outcome.screenshot.clone() {
            let shot = self.cache_screenshot(bytes).await;
            self.emit(ScanEvent::ScreenshotReady { id: shot.cache_id.clone(), url: self.request.seed_url.clone() })
                .await;
            homepage_screenshot = Some(shot);
        }

        let homepage_distilled = distill_page(&homepage_outcome.html, &self.request.seed_url);
        let homepage = Page {
            url: self.request.seed_url.clone(),
            html: Some(homepage_outcome.html.clone()),
            distilled: homepage_distilled.clone(),
            screenshot: homepage_screenshot,
        };

        self.status(ScanPhase::Discovery, 18, "discovering links").await;
        let mut links = discover_links_from_html(&homepage_outcome.html, &self.request.seed_url);
        if let Some(sitemap_links) = discover_links_from_sitemap(&self.http, &self.request.seed_url).await {
            links.extend(sitemap_links);
        }

        let mut by_url: HashMap<String, brandscan_common::model::DiscoveredLink> = HashMap::new();
        for link in links {
            by_url.entry(link.url.clone()).or_insert(link);
        }
        self.activity(&format!("discovered {} candidate links", by_url.len())).await;

        let mut ranked: Vec<brandscan_common::model::ScoredLink> = by_url
            .into_values()
            .map(|link| {
                let score = score_link(&link.url, &link.anchor_text);
                brandscan_common::model::ScoredLink { url: link.url, anchor_text: link.anchor_text, origin: link.origin, score }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        if let Some(portal) = find_portal_pivot(&self.request.seed_url, &ranked).cloned() {
            self.activity(&format!("pivoting into high-value portal {}", portal.url)).await;
            if let Ok(outcome) = self.fetcher.fetch(&portal.url, false).await {
                if FetchOutcome::looks_like_html(&outcome.html) {
                    let mut seen: std::collections::HashSet<String> =
                        ranked.iter().map(|l| l.url.clone()).collect();
                    for link in discover_links_from_html(&outcome.html, &portal.url) {
                        if seen.insert(link.url.clone()) {
                            let score = score_link(&link.url, &link.anchor_text);
                            ranked.push(brandscan_common::model::ScoredLink {
                                url: link.url,
                                anchor_text: link.anchor_text,
                                origin: link.origin,
                                score,
                            });
                        }
                    }
                    ranked.sort_by(|a, b| b.score.cmp(&a.score));
                }
            }
        }

        ranked.truncate(CANDIDATE_POOL_CAP);

        self.status(ScanPhase::Discovery, 25, "fetching candidate pages").await;
        let fetched: Vec<(brandscan_common::model::ScoredLink, Option<FetchOutcome>)> = stream::iter(ranked.into_iter())
            .map(|link| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let outcome = fetcher.fetch(&link.url, false).await.ok();
                    (link, outcome)
                }
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut distilled_by_url: HashMap<String, String> = HashMap::new();
        let mut candidates = Vec::new();
        for (link, outcome) in fetched {
            let Some(outcome) = outcome else { continue };
            if !FetchOutcome::looks_like_html(&outcome.html) {
                continue;
            }
            let Some(distilled) = distill_page(&outcome.html, &link.url) else { continue };
            let shingles = shingle_set(&distilled);
            distilled_by_url.insert(link.url.clone(), distilled);
            candidates.push(Candidate { link, shingles });
        }

        let selection_params = SelectionParams {
            max_pages: self.config.max_pages.saturating_sub(1),
            seed_high_signal_pages: self.config.seed_high_signal_pages,
            novelty_threshold: self.config.novelty_threshold,
        };
        let selected_links = select_pages(candidates, &selection_params);
        if selected_links.is_empty() && homepage_distilled.is_none() {
            return Err(ScanError::NoPagesSelected);
        }
        self.activity(&format!("selected {} pages for analysis", selected_links.len())).await;
        self.status(ScanPhase::Discovery, 35, "discovery complete").await;

        self.status(ScanPhase::ContentExtraction, 35, "extracting page content").await;
        let mut selected_pages: Vec<Page> = Vec::with_capacity(selected_links.len());
        for link in &selected_links {
            selected_pages.push(Page {
                url: link.url.clone(),
                html: None,
                distilled: distilled_by_url.get(&link.url).cloned(),
                screenshot: None,
            });
        }

        let mut extra_screenshots = Vec::new();
        let screenshot_targets: Vec<String> =
            selected_links.iter().take(EXTRA_SCREENSHOT_PAGES).map(|l| l.url.clone()).collect();
        for url in screenshot_targets {
            if let Ok(outcome) = self.fetcher.fetch(&url, true).await {
                if let Some(bytes) = outcome.screenshot {
                    let shot = self.cache_screenshot(bytes).await;
                    self.emit(ScanEvent::ScreenshotReady { id: shot.cache_id.clone(), url: url.clone() }).await;
                    if let Some(page) = selected_pages.iter_mut().find(|p| p.url == url) {
                        page.screenshot = Some(shot.clone());
                    }
                    extra_screenshots.push(shot);
                }
            }
        }

        self.activity("harvesting social media profiles").await;
        let social_text = harvest_social_text(&self.http, &homepage_outcome.html, &self.request.seed_url).await;

        let distillates: Vec<&str> = std::iter::once(homepage_distilled.as_deref())
            .chain(selected_pages.iter().map(|p| p.distilled.as_deref()))
            .flatten()
            .collect();
        let corpus = assemble_corpus(&distillates, &social_text, self.config.corpus_max_chars);
        if corpus.text.trim().is_empty() {
            return Err(ScanError::EmptyCorpus);
        }

        self.activity(&format!("assembled corpus from {} pages, {} chars", corpus.page_count, corpus.text.len())).await;
        self.status(ScanPhase::ContentExtraction, 65, "content extraction complete").await;

        Ok((homepage, selected_pages, corpus, extra_screenshots))
    }

    async fn phase_analysis(
        &self,
        homepage: &Page,
        _selected: &[Page],
        corpus: &Corpus,
        brand_summary: Option<String>,
        extra_screenshots: &[Screenshot],
    ) -> Vec<AnalysisResult> {
        let mut results = Vec::new();
        let corpus_arc = Arc::new(corpus.text.clone());

        match self.request.mode {
            ScanMode::Discovery => {
                let (tx, mut rx) = mpsc::unbounded_channel();
                let services = Arc::clone(&self.services);
                let worker = tokio::spawn(run_discovery_textual_keys(services, Arc::clone(&corpus_arc), tx));

                while let Some(result) = rx.recv().await {
                    self.emit(ScanEvent::DiscoveryResult {
                        key: result.key,
                        analysis: result.payload.clone(),
                        metrics: result.metrics.clone(),
                    })
                    .await;
                    results.push(result);
                }
                let _ = worker.await;

                let mut screenshots: Vec<Screenshot> = homepage.screenshot.iter().cloned().collect();
                screenshots.extend(extra_screenshots.iter().cloned());

                if let Some(brand_elements) =
                    brandscan_analyze::vision::analyze_brand_elements(&self.services.synthesis_client, &screenshots, &corpus.text)
                        .await
                {
                    self.emit(ScanEvent::DiscoveryResult {
                        key: brand_elements.key,
                        analysis: brand_elements.payload.clone(),
                        metrics: brand_elements.metrics.clone(),
                    })
                    .await;

                    if let Some(themes) = results.iter().find(|r| r.key == AnalysisKey::PositioningThemes) {
                        let top_themes = serde_json::to_string(&themes.payload).unwrap_or_default();
                        let brand_elements_summary = serde_json::to_string(&brand_elements.payload).unwrap_or_default();
                        let alignment = brandscan_analyze::vision::analyze_visual_text_alignment(
                            &self.services.synthesis_client,
                            &top_themes,
                            &brand_elements_summary,
                        )
                        .await;
                        self.emit(ScanEvent::DiscoveryResult {
                            key: alignment.key,
                            analysis: alignment.payload.clone(),
                            metrics: alignment.metrics.clone(),
                        })
                        .await;
                        results.push(alignment);
                    }
                    results.push(brand_elements);
                }
            }
            ScanMode::Diagnosis => {
                let (tx, mut rx) = mpsc::unbounded_channel();
                let services = Arc::clone(&self.services);
                let brand_summary_arc = Arc::new(brand_summary);
                let worker =
                    tokio::spawn(run_memorability_keys(services, Arc::clone(&corpus_arc), brand_summary_arc, tx));

                while let Some(result) = rx.recv().await {
                    let score = result.payload.get("score").and_then(|v| v.as_i64()).unwrap_or(0).clamp(0, 5) as u8;
                    let confidence =
                        result.payload.get("confidence").and_then(|v| v.as_i64()).unwrap_or(0).clamp(0, 100) as u8;
                    let analysis = result.payload.get("analysis").and_then(|v| v.as_str()).unwrap_or("").to_string();
                    let evidence = result.payload.get("evidence").and_then(|v| v.as_str()).unwrap_or("").to_string();
                    let recommendation =
                        result.payload.get("recommendation").and_then(|v| v.as_str()).unwrap_or("").to_string();

                    self.emit(ScanEvent::KeyResult { key: result.key, score, analysis, evidence, confidence, recommendation })
                        .await;
                    results.push(result);
                }
                let _ = worker.await;
            }
        }

        results
    }
}

/// Concatenates each page's distillate in order, appends a social-media
/// block when one was harvested, and truncates to `max_chars` when the
/// whole would overrun it. Truncation drops whole blocks from the end
/// first — the social block, then the last page's distillate, then the
/// next-to-last, and so on — rather than cutting the concatenated string
/// at a raw byte offset, which could land mid-codepoint and panic on
/// non-ASCII text. Pure, so the char-budget and page-count bookkeeping
/// can be tested without a network-backed `Scan`.
fn assemble_corpus(distillates: &[&str], social_text: &str, max_chars: usize) -> Corpus {
    let mut blocks: Vec<String> = distillates.iter().map(|d| format!("{d}\n\n")).collect();
    let page_count = blocks.len();
    if !social_text.is_empty() {
        blocks.push(format!("=== SOCIAL MEDIA ===\n{social_text}"));
    }

    let mut text = String::new();
    for block in &blocks {
        if text.len() + block.len() > max_chars {
            let remaining = max_chars - text.len();
            text.push_str(truncate_at_char_boundary(block, remaining));
            break;
        }
        text.push_str(block);
    }

    Corpus { text, page_count }
}

/// The largest prefix of `s` that is no longer than `max_bytes` and ends on
/// a UTF-8 char boundary.
fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_pages_in_order_with_social_block_appended() {
        let corpus = assemble_corpus(&["=== PAGE A ===\ntext a", "=== PAGE B ===\ntext b"], "@brand on socials", 10_000);
        assert_eq!(corpus.page_count, 2);
        assert!(corpus.text.starts_with("=== PAGE A ==="));
        assert!(corpus.text.contains("=== SOCIAL MEDIA ===\n@brand on socials"));
    }

    #[test]
    fn truncates_to_max_chars() {
        let corpus = assemble_corpus(&["a".repeat(500).leak()], "", 100);
        assert_eq!(corpus.text.len(), 100);
    }

    #[test]
    fn empty_input_produces_empty_corpus() {
        let corpus = assemble_corpus(&[], "", 1000);
        assert_eq!(corpus.page_count, 0);
        assert!(corpus.text.is_empty());
    }

    #[test]
    fn drops_social_block_first_when_it_alone_overruns_the_budget() {
        let corpus = assemble_corpus(&["page one text"], "social media filler far past the limit", 15);
        assert_eq!(corpus.page_count, 1);
        assert!(!corpus.text.contains("SOCIAL MEDIA"));
    }

    #[test]
    fn truncation_never_splits_a_multibyte_char() {
        let distillate = "intro ".repeat(20) + "café";
        let corpus = assemble_corpus(&[distillate.leak()], "", distillate.len() - 1);
        assert!(corpus.text.is_char_boundary(corpus.text.len()));
        assert!(std::str::from_utf8(corpus.text.as_bytes()).is_ok());
    }
}
