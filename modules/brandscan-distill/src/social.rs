use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const MAX_CHARS_PER_PLATFORM: usize = 2_000;
const REMOVED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

struct Platform {
    name: &'static str,
    domain: &'static Regex,
    id_patterns: &'static [&'static Regex],
}

static TWITTER_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(twitter|x)\.com").unwrap());
static TWITTER_ID: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)twitter").unwrap(),
        Regex::new(r"(?i)tweet").unwrap(),
        Regex::new(r"(?i)fa-x-twitter").unwrap(),
        Regex::new(r"(?i)fa-twitter").unwrap(),
    ]
});
static LINKEDIN_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)linkedin\.com").unwrap());
static LINKEDIN_ID: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [Regex::new(r"(?i)linkedin").unwrap(), Regex::new(r"(?i)fa-linkedin").unwrap()]);
static FACEBOOK_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)facebook\.com").unwrap());
static FACEBOOK_ID: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [Regex::new(r"(?i)facebook").unwrap(), Regex::new(r"(?i)fa-facebook").unwrap()]);
static INSTAGRAM_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)instagram\.com").unwrap());
static INSTAGRAM_ID: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [Regex::new(r"(?i)instagram").unwrap(), Regex::new(r"(?i)fa-instagram").unwrap()]);
static YOUTUBE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)youtube\.com").unwrap());
static YOUTUBE_ID: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [Regex::new(r"(?i)youtube").unwrap(), Regex::new(r"(?i)fa-youtube").unwrap()]);

fn platforms() -> Vec<Platform> {
    vec![
        Platform { name: "Twitter", domain: &TWITTER_DOMAIN, id_patterns: TWITTER_ID.as_slice() },
        Platform { name: "LinkedIn", domain: &LINKEDIN_DOMAIN, id_patterns: LINKEDIN_ID.as_slice() },
        Platform { name: "Facebook", domain: &FACEBOOK_DOMAIN, id_patterns: FACEBOOK_ID.as_slice() },
        Platform { name: "Instagram", domain: &INSTAGRAM_DOMAIN, id_patterns: INSTAGRAM_ID.as_slice() },
        Platform { name: "YouTube", domain: &YOUTUBE_DOMAIN, id_patterns: YOUTUBE_ID.as_slice() },
    ]
}

static CONTAINER_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(social|footer|header|contact|follow|icons|menu)").unwrap());

fn has_matching_class(el: &ElementRef, re: &Regex) -> bool {
    el.value().attr("class").is_some_and(|c| re.is_match(c))
}

fn is_relevant_link(element: &ElementRef, href: &str, platform: &Platform) -> bool {
    if platform.domain.is_match(href) {
        return true;
    }

    let aria_label = element.value().attr("aria-label").unwrap_or("").to_lowercase();
    let title = element.value().attr("title").unwrap_or("").to_lowercase();
    let text = element.text().collect::<Vec<_>>().join(" ").to_lowercase();
    let classes = element.value().attr("class").unwrap_or("").to_lowercase();

    let matches_any = |haystack: &str| platform.id_patterns.iter().any(|p| p.is_match(haystack));
    if matches_any(&aria_label) || matches_any(&title) || matches_any(&text) || matches_any(&classes) {
        return true;
    }

    for child_sel in ["i", "img", "svg"] {
        if let Ok(sel) = Selector::parse(child_sel) {
            if let Some(child) = element.select(&sel).next() {
                let child_classes = child.value().attr("class").unwrap_or("").to_lowercase();
                let child_alt = child.value().attr("alt").unwrap_or("").to_lowercase();
                if matches_any(&child_classes) || matches_any(&child_alt) {
                    return true;
                }
            }
        }
    }

    false
}

fn find_platform_link(document: &Html, base_url: &Url, platform: &Platform) -> Option<Url> {
    let container_sel = Selector::parse("footer, header, nav, div, ul, p").expect("static selector");
    let anchor_sel = Selector::parse("a[href]").expect("static selector");

    let mut candidates: Vec<ElementRef> = document
        .select(&container_sel)
        .filter(|c| has_matching_class(c, &CONTAINER_CLASS_RE))
        .flat_map(|c| c.select(&anchor_sel).collect::<Vec<_>>())
        .collect();

    if candidates.is_empty() {
        candidates = document.select(&anchor_sel).collect();
    }

    let mut good_links: BTreeSet<String> = BTreeSet::new();
    for anchor in candidates {
        let Some(href) = anchor.value().attr("href") else { continue };
        if !is_relevant_link(&anchor, href, platform) {
            continue;
        }
        let Ok(full_url) = base_url.join(href) else { continue };
        let full = full_url.as_str();
        if !platform.domain.is_match(full) {
            continue;
        }
        if href.contains("intent") || href.contains("share") {
            continue;
        }
        if platform.name == "Instagram" && href.contains("/p/") {
            continue;
        }
        good_links.insert(full.to_string());
    }

    good_links
        .into_iter()
        .min_by_key(|u| u.len())
        .and_then(|u| Url::parse(&u).ok())
}

fn within_removed_container(element: &ElementRef) -> bool {
    let mut current = element.parent();
    while let Some(node) = current {
        if let Some(el) = ElementRef::wrap(node) {
            if REMOVED_TAGS.contains(&el.value().name()) {
                return true;
            }
        }
        current = node.parent();
    }
    false
}

fn strip_boilerplate_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let text_sel = Selector::parse("p, span, h1, h2, h3, li, blockquote, article, div")
        .expect("static selector");

    let words: Vec<String> = document
        .select(&text_sel)
        .filter(|el| !within_removed_container(el))
        .flat_map(|el| el.text().collect::<Vec<_>>())
        .flat_map(|t| t.split_whitespace().map(str::to_string))
        .collect();
    words.join(" ")
}

/// Fetch and harvest up to 2 kB of boilerplate-stripped visible text per
/// social platform found on the homepage, each block labeled with its
/// platform name.
pub async fn harvest_social_text(
    client: &reqwest::Client,
    homepage_html: &str,
    base_url: &str,
) -> String {
    let Ok(base) = Url::parse(base_url) else { return String::new() };
    let document = Html::parse_document(homepage_html);

    let mut output = String::new();
    for platform in platforms() {
        let Some(link) = find_platform_link(&document, &base, &platform) else {
            continue;
        };

        let body = match fetch_with_timeout(client, link.as_str()).await {
            Some(body) => body,
            None => continue,
        };

        let text = strip_boilerplate_text(&body);
        let truncated: String = text.chars().take(MAX_CHARS_PER_PLATFORM).collect();
        output.push_str(&format!("\n\n--- Social Media Content ({}) ---\n{truncated}", platform.name));
    }
    output
}

async fn fetch_with_timeout(client: &reqwest::Client, url: &str) -> Option<String> {
    let resp = tokio::time::timeout(Duration::from_secs(20), client.get(url).send())
        .await
        .ok()?
        .ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.text().await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_shortest_relevant_linkedin_link() {
        let html = r#"
            <html><body>
                <footer class="footer-social">
                    <a href="https://linkedin.com/company/acme/posts/123456">LinkedIn posts</a>
                    <a href="https://linkedin.com/company/acme">LinkedIn</a>
                </footer>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://acme.example/").unwrap();
        let platform = &platforms()[1];
        let link = find_platform_link(&document, &base, platform).unwrap();
        assert_eq!(link.as_str(), "https://linkedin.com/company/acme");
    }

    #[test]
    fn ignores_share_and_intent_links() {
        let html = r#"
            <html><body>
                <footer class="social-footer">
                    <a href="https://twitter.com/intent/tweet?text=hi">Share</a>
                </footer>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://acme.example/").unwrap();
        let platform = &platforms()[0];
        assert!(find_platform_link(&document, &base, platform).is_none());
    }

    #[test]
    fn instagram_post_permalinks_are_excluded() {
        let html = r#"
            <html><body>
                <div class="social-icons">
                    <a href="https://instagram.com/p/abc123">Post</a>
                    <a href="https://instagram.com/acmebrand">Profile</a>
                </div>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let base = Url::parse("https://acme.example/").unwrap();
        let platform = &platforms()[3];
        let link = find_platform_link(&document, &base, platform).unwrap();
        assert_eq!(link.as_str(), "https://instagram.com/acmebrand");
    }
}
