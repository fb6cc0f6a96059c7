use url::Url;

/// Normalize a URL for dedup/comparison purposes: strips the fragment,
/// drops a default port for its scheme, sorts query parameters
/// alphabetically, and strips a trailing slash (unless the path is bare
/// `/`).
pub fn normalize_url(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw)?;
    url.set_fragment(None);

    if let Some(port) = url.port() {
        let is_default = matches!((url.scheme(), port), ("http", 80) | ("https", 443));
        if is_default {
            let _ = url.set_port(None);
        }
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let query = pairs
            .into_iter()
            .map(|(k, v)| if v.is_empty() { k } else { format!("{k}={v}") })
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    let mut rendered = url.to_string();
    if rendered.ends_with('/') && url.path() != "/" {
        rendered.pop();
    }
    Ok(rendered)
}

/// Extract the central "root word" of a domain, e.g. `omv` from both
/// `www.omv.at` and `omv.com`, so alternate country-code TLDs of the same
/// brand are still recognized as the same site.
pub fn root_word(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 2 && matches!(parts[parts.len() - 2], "co" | "com" | "org" | "net" | "gov" | "edu") {
        Some(parts[parts.len() - 3].to_lowercase())
    } else if parts.len() >= 2 {
        Some(parts[parts.len() - 2].to_lowercase())
    } else {
        Some(parts[0].to_lowercase())
    }
}

pub fn is_same_root_word_domain(url1: &str, url2: &str) -> bool {
    match (root_word(url1), root_word(url2)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_default_port_and_fragment() {
        let n = normalize_url("https://example.com:443/page#section").unwrap();
        assert_eq!(n, "https://example.com/page");
    }

    #[test]
    fn sorts_query_params() {
        let n = normalize_url("https://example.com/search?b=2&a=1").unwrap();
        assert_eq!(n, "https://example.com/search?a=1&b=2");
    }

    #[test]
    fn strips_trailing_slash_but_keeps_bare_root() {
        assert_eq!(normalize_url("https://example.com/about/").unwrap(), "https://example.com/about");
        assert_eq!(normalize_url("https://example.com/").unwrap(), "https://example.com/");
    }

    #[test]
    fn root_word_ignores_cctld_and_www() {
        assert_eq!(root_word("https://www.omv.at/").as_deref(), Some("omv"));
        assert_eq!(root_word("https://omv.com/").as_deref(), Some("omv"));
        assert!(is_same_root_word_domain("https://www.omv.at/about", "https://omv.com/careers"));
    }

    #[test]
    fn different_root_words_are_not_same_domain() {
        assert!(!is_same_root_word_domain("https://omv.com", "https://shell.com"));
    }
}
