use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use brandscan_common::model::{DiscoveredLink, LinkOrigin};

const PRIORITY_KEYWORDS: &[&str] = &["page", "post", "company", "about", "article"];

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("sitemap fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("sitemap XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// `<loc>` entries under either a `<urlset>` (plain sitemap) or a
/// `<sitemapindex>` (pointer to further sitemaps) root.
enum ParsedSitemap {
    UrlSet(Vec<String>),
    Index(Vec<String>),
}

fn parse_loc_entries(xml: &str) -> Result<ParsedSitemap, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut is_index = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name == b"sitemapindex" {
                    is_index = true;
                } else if name == b"loc" {
                    in_loc = true;
                }
            }
            Event::Text(e) if in_loc => {
                locs.push(e.unescape()?.into_owned());
            }
            Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(if is_index {
        ParsedSitemap::Index(locs)
    } else {
        ParsedSitemap::UrlSet(locs)
    })
}

/// Choose the sub-sitemap whose URL contains the highest-priority keyword
/// (`page|post|company|about|article`, checked in that order); fall back
/// to the first listed sub-sitemap.
fn pick_priority_sitemap(sub_sitemaps: &[String]) -> Option<&str> {
    for keyword in PRIORITY_KEYWORDS {
        if let Some(url) = sub_sitemaps.iter().find(|u| u.contains(keyword)) {
            return Some(url);
        }
    }
    sub_sitemaps.first().map(String::as_str)
}

fn anchor_text_from_url(url: &str) -> String {
    url.rsplit('/')
        .next()
        .unwrap_or(url)
        .replace('-', " ")
}

/// Attempt to discover links via `/sitemap.xml` relative to `homepage_url`.
/// Returns `None` when no sitemap exists or it fails to parse — the caller
/// should fall back to HTML link discovery, not treat this as fatal.
pub async fn discover_links_from_sitemap(
    client: &reqwest::Client,
    homepage_url: &str,
) -> Option<Vec<DiscoveredLink>> {
    let base = Url::parse(homepage_url).ok()?;
    let sitemap_url = base.join("/sitemap.xml").ok()?;

    let body = fetch_sitemap(client, sitemap_url.as_str()).await?;
    let parsed = match parse_loc_entries(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "sitemap XML failed to parse");
            return None;
        }
    };

    let urls = match parsed {
        ParsedSitemap::UrlSet(urls) => urls,
        ParsedSitemap::Index(sub_sitemaps) => {
            info!(count = sub_sitemaps.len(), "sitemap index found, selecting a priority sub-sitemap");
            let chosen = pick_priority_sitemap(&sub_sitemaps)?.to_string();
            let sub_body = fetch_sitemap(client, &chosen).await?;
            match parse_loc_entries(&sub_body) {
                Ok(ParsedSitemap::UrlSet(urls)) => urls,
                Ok(ParsedSitemap::Index(_)) | Err(_) => return None,
            }
        }
    };

    if urls.is_empty() {
        return None;
    }

    info!(count = urls.len(), "discovered links from sitemap");
    Some(
        urls.into_iter()
            .map(|url| {
                let anchor_text = anchor_text_from_url(&url);
                DiscoveredLink {
                    url,
                    anchor_text,
                    origin: LinkOrigin::Sitemap,
                }
            })
            .collect(),
    )
}

async fn fetch_sitemap(client: &reqwest::Client, url: &str) -> Option<String> {
    let resp = client.get(url).send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.text().await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_urlset() {
        let xml = r#"<?xml version="1.0"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>https://example.com/about</loc></url>
                <url><loc>https://example.com/contact</loc></url>
            </urlset>"#;
        match parse_loc_entries(xml).unwrap() {
            ParsedSitemap::UrlSet(urls) => {
                assert_eq!(urls, vec!["https://example.com/about", "https://example.com/contact"]);
            }
            ParsedSitemap::Index(_) => panic!("expected urlset"),
        }
    }

    #[test]
    fn parses_sitemap_index() {
        let xml = r#"<sitemapindex>
                <sitemap><loc>https://example.com/sitemap-products.xml</loc></sitemap>
                <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
            </sitemapindex>"#;
        match parse_loc_entries(xml).unwrap() {
            ParsedSitemap::Index(urls) => assert_eq!(urls.len(), 2),
            ParsedSitemap::UrlSet(_) => panic!("expected index"),
        }
    }

    #[test]
    fn priority_keyword_selection_prefers_page_over_later_keywords() {
        let subs = vec![
            "https://example.com/sitemap-products.xml".to_string(),
            "https://example.com/sitemap-pages.xml".to_string(),
            "https://example.com/sitemap-about.xml".to_string(),
        ];
        assert_eq!(pick_priority_sitemap(&subs), Some("https://example.com/sitemap-pages.xml"));
    }

    #[test]
    fn falls_back_to_first_when_no_keyword_matches() {
        let subs = vec!["https://example.com/sitemap-1.xml".to_string()];
        assert_eq!(pick_priority_sitemap(&subs), Some("https://example.com/sitemap-1.xml"));
    }

    #[test]
    fn anchor_text_derived_from_last_path_segment() {
        assert_eq!(anchor_text_from_url("https://example.com/our-story"), "our story");
    }
}
