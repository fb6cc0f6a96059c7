use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use brandscan_common::model::ScoredLink;
use url::Url;

const SHINGLE_SIZE: usize = 12;

const HIGH_SIGNAL_PATTERNS: &[&str] = &[
    "/about", "/company", "/our-story", "/strategy", "/vision", "/mission", "/products",
    "/solutions", "/platform", "/services", "/industries", "/segments", "/careers", "/culture",
    "/investors", "/esg", "/press", "/news", "/sustainability",
];

fn is_high_signal(url: &str) -> bool {
    let lower = url.to_lowercase();
    HIGH_SIGNAL_PATTERNS.iter().any(|p| lower.contains(p))
}

fn is_locale_variant(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else { return false };
    let segments: Vec<&str> = parsed.path_segments().map(|s| s.collect()).unwrap_or_default();
    segments
        .first()
        .is_some_and(|seg| seg.len() == 2 && seg.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_pdf(url: &str) -> bool {
    url.to_lowercase().ends_with(".pdf")
}

fn path_depth(url: &str) -> usize {
    Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().map(|s| s.filter(|seg| !seg.is_empty()).count()))
        .unwrap_or(usize::MAX)
}

/// Hashed k-shingles (k=12 whitespace-tokenized words) of a text, used for
/// O(1)-amortized Jaccard novelty comparisons instead of comparing raw
/// strings.
pub fn shingle_set(text: &str) -> HashSet<u64> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < SHINGLE_SIZE {
        return if words.is_empty() {
            HashSet::new()
        } else {
            let mut set = HashSet::with_capacity(1);
            set.insert(hash_shingle(&words.join(" ")));
            set
        };
    }
    words
        .windows(SHINGLE_SIZE)
        .map(|w| hash_shingle(&w.join(" ")))
        .collect()
}

fn hash_shingle(shingle: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    shingle.hash(&mut hasher);
    hasher.finish()
}

fn jaccard_novelty(candidate: &HashSet<u64>, global: &HashSet<u64>) -> f64 {
    if candidate.is_empty() {
        return 0.0;
    }
    let intersection = candidate.intersection(global).count();
    let union = candidate.union(global).count();
    if union == 0 {
        return 0.0;
    }
    1.0 - (intersection as f64 / union as f64)
}

/// A candidate page with its computed shingle set, ready for the novelty
/// expansion pass. `distillate` is only needed to compute shingles; the
/// caller supplies it via whatever means it fetched/distilled the page.
pub struct Candidate {
    pub link: ScoredLink,
    pub shingles: HashSet<u64>,
}

/// Tunables for [`select_pages`], sourced from [`brandscan_common::Config`]
/// so an operator can retune the selection budget without a rebuild.
/// `max_pages` is homepage-inclusive: the caller is expected to pass
/// `Config::max_pages - 1` here, since the homepage itself never goes
/// through `select_pages`.
#[derive(Debug, Clone, Copy)]
pub struct SelectionParams {
    pub max_pages: usize,
    pub seed_high_signal_pages: usize,
    pub novelty_threshold: f64,
}

/// Select up to `params.max_pages` pages: up to
/// `params.seed_high_signal_pages` high-signal non-locale-variant non-PDF
/// pages ranked by score/depth/URL, at most one qualifying PDF, then a
/// novelty expansion pass over the remainder. Pure function over
/// pre-fetched candidates plus their shingle sets — no network I/O here.
pub fn select_pages(candidates: Vec<Candidate>, params: &SelectionParams) -> Vec<ScoredLink> {
    let mut ranked: Vec<Candidate> = candidates;
    ranked.sort_by(|a, b| {
        b.link
            .score
            .cmp(&a.link.score)
            .then_with(|| path_depth(&a.link.url).cmp(&path_depth(&b.link.url)))
            .then_with(|| a.link.url.cmp(&b.link.url))
    });

    let mut selected: Vec<ScoredLink> = Vec::new();
    let mut global_shingles: HashSet<u64> = HashSet::new();
    let mut remaining: Vec<Candidate> = Vec::new();
    let mut pdf_used = false;

    for candidate in ranked {
        if selected.len() >= params.seed_high_signal_pages {
            remaining.push(candidate);
            continue;
        }

        let url = &candidate.link.url;
        if is_pdf(url) {
            if !pdf_used
                && (url.to_lowercase().contains("overview")
                    || url.to_lowercase().contains("brand")
                    || url.to_lowercase().contains("corporate"))
            {
                pdf_used = true;
                global_shingles.extend(&candidate.shingles);
                selected.push(candidate.link);
            } else {
                remaining.push(candidate);
            }
            continue;
        }

        if is_high_signal(url) && !is_locale_variant(url) {
            global_shingles.extend(&candidate.shingles);
            selected.push(candidate.link);
        } else {
            remaining.push(candidate);
        }
    }

    let mut trailing_novelties: Vec<f64> = Vec::new();
    for candidate in remaining {
        if selected.len() >= params.max_pages {
            break;
        }

        let novelty = jaccard_novelty(&candidate.shingles, &global_shingles);
        trailing_novelties.push(novelty);
        if trailing_novelties.len() > 3 {
            trailing_novelties.remove(0);
        }

        if novelty >= params.novelty_threshold {
            global_shingles.extend(&candidate.shingles);
            selected.push(candidate.link);
        } else if trailing_novelties.len() == 3
            && trailing_novelties.iter().sum::<f64>() / 3.0 < params.novelty_threshold
        {
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_common::model::LinkOrigin;

    fn link(url: &str, score: i32) -> ScoredLink {
        ScoredLink {
            url: url.to_string(),
            anchor_text: String::new(),
            origin: LinkOrigin::Html,
            score,
        }
    }

    fn candidate(url: &str, score: i32, text: &str) -> Candidate {
        Candidate {
            link: link(url, score),
            shingles: shingle_set(text),
        }
    }

    fn default_params() -> SelectionParams {
        SelectionParams { max_pages: 18, seed_high_signal_pages: 12, novelty_threshold: 0.12 }
    }

    #[test]
    fn shingle_sets_of_identical_text_are_identical() {
        let a = shingle_set("the quick brown fox jumps over the lazy dog again and again more");
        let b = shingle_set("the quick brown fox jumps over the lazy dog again and again more");
        assert_eq!(a, b);
        assert!(jaccard_novelty(&a, &b) < f64::EPSILON);
    }

    #[test]
    fn selects_high_signal_pages_first() {
        let candidates = vec![
            candidate("https://example.com/about", 25, "about us content unique one two three four five six"),
            candidate("https://example.com/login", 5, "login content"),
        ];
        let selected = select_pages(candidates, &default_params());
        assert!(selected.iter().any(|l| l.url.contains("/about")));
        assert!(!selected.iter().any(|l| l.url.contains("/login")));
    }

    #[test]
    fn locale_variant_is_excluded_from_high_signal_seeding() {
        assert!(is_locale_variant("https://example.com/de/about"));
        assert!(!is_locale_variant("https://example.com/about"));
    }

    #[test]
    fn caps_total_selection_at_homepage_inclusive_budget() {
        let mut candidates = Vec::new();
        for i in 0..40 {
            candidates.push(candidate(
                &format!("https://example.com/about-{i}"),
                20,
                &format!("unique distinct content block number {i} with enough words to form a shingle set properly"),
            ));
        }
        let params = default_params();
        let selected = select_pages(candidates, &params);
        assert!(selected.len() <= params.max_pages);
    }

    #[test]
    fn respects_a_custom_max_pages_budget() {
        let mut candidates = Vec::new();
        for i in 0..40 {
            candidates.push(candidate(
                &format!("https://example.com/about-{i}"),
                20,
                &format!("unique distinct content block number {i} with enough words to form a shingle set properly"),
            ));
        }
        let params = SelectionParams { max_pages: 17, seed_high_signal_pages: 12, novelty_threshold: 0.12 };
        let selected = select_pages(candidates, &params);
        assert!(selected.len() <= 17);
    }
}
