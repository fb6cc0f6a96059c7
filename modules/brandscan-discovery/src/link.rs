use std::collections::HashMap;

use brandscan_common::model::{DiscoveredLink, LinkOrigin};
use scraper::{Html, Selector};
use url::Url;

use crate::url_norm::{is_same_root_word_domain, normalize_url};

const MAX_LINKS_PER_PAGE: usize = 2_000;

/// Extract same-root-word-domain links from a page's HTML, resolved and
/// normalized against `base_url`. Non-navigable hrefs (anchors,
/// `javascript:`/`mailto:`/`tel:`/`data:`/`blob:` schemes) and self-links
/// are dropped; anchor text is taken from visible text, falling back to a
/// child image's `alt` attribute.
pub fn discover_links_from_html(html: &str, base_url: &str) -> Vec<DiscoveredLink> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let normalized_base = normalize_url(base_url).unwrap_or_else(|_| base_url.to_string());

    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").expect("static selector is valid");
    let img_selector = Selector::parse("img[alt]").expect("static selector is valid");

    let mut best: HashMap<String, DiscoveredLink> = HashMap::new();

    for element in document.select(&anchor_selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
            || href.starts_with("blob:")
        {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        if !is_same_root_word_domain(resolved.as_str(), &normalized_base) {
            continue;
        }

        let target_url = normalize_url(resolved.as_str()).unwrap_or_else(|_| resolved.to_string());
        if target_url == normalized_base {
            continue;
        }

        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let anchor_text = if text.trim().is_empty() {
            element
                .select(&img_selector)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .unwrap_or_default()
                .trim()
                .to_string()
        } else {
            text.trim().to_string()
        };

        best.entry(target_url.clone()).or_insert(DiscoveredLink {
            url: target_url,
            anchor_text,
            origin: LinkOrigin::Html,
        });
    }

    let mut links: Vec<DiscoveredLink> = best.into_values().collect();
    links.truncate(MAX_LINKS_PER_PAGE);
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_same_root_word_links_only() {
        let html = r#"
            <html><body>
                <a href="/about">About</a>
                <a href="https://omv.at/careers">Careers</a>
                <a href="https://shell.com/other">Other brand</a>
                <a href="mailto:hi@omv.com">Email</a>
            </body></html>
        "#;
        let links = discover_links_from_html(html, "https://omv.com/");
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert!(urls.contains(&"https://omv.com/about"));
        assert!(urls.contains(&"https://omv.at/careers"));
        assert!(!urls.iter().any(|u| u.contains("shell.com")));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn falls_back_to_image_alt_text() {
        let html = r#"<html><body><a href="/logo"><img src="logo.png" alt="Company Logo"></a></body></html>"#;
        let links = discover_links_from_html(html, "https://example.com/");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor_text, "Company Logo");
    }

    #[test]
    fn skips_self_links_and_empty_html() {
        let html = r#"<html><body><a href="https://example.com/">Home</a></body></html>"#;
        assert!(discover_links_from_html(html, "https://example.com/").is_empty());
        assert!(discover_links_from_html("", "https://example.com/").is_empty());
    }
}
