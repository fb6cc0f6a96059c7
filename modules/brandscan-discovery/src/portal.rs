//! High-value portal pivot: a scored link that looks like a content hub but
//! lives on a different subdomain of the same root-word domain (e.g. a
//! `brand.omv.com` microsite linked from `omv.com`) is easy for ordinary
//! link discovery to under-explore, since its own links never show up in
//! the seed page's HTML or sitemap. When one surfaces, its links get
//! harvested into the candidate pool as if they'd been discovered directly.

use brandscan_common::model::ScoredLink;
use url::Url;

use crate::url_norm::is_same_root_word_domain;

/// A link counts as a pivot-worthy portal once its score clears this bar.
pub const PORTAL_PIVOT_SCORE_THRESHOLD: i32 = 25;

/// Returns the highest-scoring link that qualifies as a portal pivot: scored
/// above [`PORTAL_PIVOT_SCORE_THRESHOLD`], hosted on a different subdomain
/// than `seed_url`, but sharing its root-word domain. `ranked` is assumed
/// sorted by score descending, so the first match is the best one.
pub fn find_portal_pivot<'a>(seed_url: &str, ranked: &'a [ScoredLink]) -> Option<&'a ScoredLink> {
    ranked
        .iter()
        .filter(|link| link.score > PORTAL_PIVOT_SCORE_THRESHOLD)
        .find(|link| different_host(seed_url, &link.url) && is_same_root_word_domain(seed_url, &link.url))
}

fn different_host(a: &str, b: &str) -> bool {
    let host = |u: &str| Url::parse(u).ok().and_then(|u| u.host_str().map(str::to_string));
    matches!((host(a), host(b)), (Some(a), Some(b)) if a != b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_common::model::LinkOrigin;

    fn link(url: &str, score: i32) -> ScoredLink {
        ScoredLink { url: url.to_string(), anchor_text: String::new(), origin: LinkOrigin::Html, score }
    }

    #[test]
    fn picks_highest_scoring_cross_subdomain_same_root_word_link() {
        let ranked = vec![link("https://brand.omv.com/strategy", 40), link("https://omv.com/about", 20)];
        let pivot = find_portal_pivot("https://www.omv.at/", &ranked).unwrap();
        assert_eq!(pivot.url, "https://brand.omv.com/strategy");
    }

    #[test]
    fn ignores_links_on_the_same_host_as_the_seed() {
        let ranked = vec![link("https://www.omv.at/careers-hub", 40)];
        assert!(find_portal_pivot("https://www.omv.at/", &ranked).is_none());
    }

    #[test]
    fn ignores_links_below_the_score_threshold() {
        let ranked = vec![link("https://brand.omv.com/strategy", 20)];
        assert!(find_portal_pivot("https://www.omv.at/", &ranked).is_none());
    }

    #[test]
    fn ignores_links_on_an_unrelated_domain() {
        let ranked = vec![link("https://shell.com/strategy", 40)];
        assert!(find_portal_pivot("https://www.omv.at/", &ranked).is_none());
    }
}
