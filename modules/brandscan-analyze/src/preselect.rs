//! Step 2 of the Analyzer pipeline (C12): chunk the sanitized corpus on
//! paragraph boundaries with a token overlap between adjacent chunks, score
//! each chunk against a per-key keyword set, and keep the highest-scoring
//! chunks until the per-key input token budget is spent.

use brandscan_llm::tokens::estimate_tokens;

const CHUNK_TARGET_TOKENS: u32 = 300;
const CHUNK_OVERLAP_TOKENS: u32 = 120;

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    order: usize,
    score: u32,
}

/// Metrics reported alongside the pre-selected text, surfaced in
/// `AnalysisMetrics`-adjacent logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreselectMetrics {
    pub total_chunks: usize,
    pub selected_chunks: usize,
    pub selected_tokens: u32,
}

/// Splits `text` into overlapping paragraph chunks, each targeting
/// [`CHUNK_TARGET_TOKENS`] with [`CHUNK_OVERLAP_TOKENS`] of trailing overlap
/// carried into the next chunk.
fn chunk_paragraphs(text: &str) -> Vec<String> {
    let paragraphs: Vec<&str> = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect();
    if paragraphs.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < paragraphs.len() {
        let mut tokens = 0u32;
        let mut end = start;
        while end < paragraphs.len() && tokens < CHUNK_TARGET_TOKENS {
            tokens += estimate_tokens(paragraphs[end]);
            end += 1;
        }
        chunks.push(paragraphs[start..end].join("\n\n"));

        if end >= paragraphs.len() {
            break;
        }
        // Back up `end` by roughly CHUNK_OVERLAP_TOKENS worth of paragraphs
        // so the next chunk opens with trailing context from this one.
        let mut back = end;
        let mut overlap_tokens = 0u32;
        while back > start && overlap_tokens < CHUNK_OVERLAP_TOKENS {
            back -= 1;
            overlap_tokens += estimate_tokens(paragraphs[back]);
        }
        start = back.max(start + 1);
    }
    chunks
}

fn score_chunk(text: &str, keywords: &[&str]) -> u32 {
    let lower = text.to_lowercase();
    keywords.iter().map(|kw| lower.matches(&kw.to_lowercase()).count() as u32).sum()
}

/// Chunks `text`, scores each chunk against `keywords`, and greedily keeps
/// the highest-scoring chunks (restored to original order) until
/// `max_tokens` would be exceeded. Returns the assembled text and the
/// pre-selection metrics the caller should log.
pub fn preselect(text: &str, keywords: &[&str], max_tokens: u32) -> (String, PreselectMetrics) {
    let raw_chunks = chunk_paragraphs(text);
    let total_chunks = raw_chunks.len();

    let mut scored: Vec<Chunk> = raw_chunks
        .into_iter()
        .enumerate()
        .map(|(order, text)| {
            let score = score_chunk(&text, keywords);
            Chunk { text, order, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.order.cmp(&b.order)));

    let mut selected: Vec<Chunk> = Vec::new();
    let mut used_tokens = 0u32;
    for chunk in scored {
        let cost = estimate_tokens(&chunk.text);
        if used_tokens + cost > max_tokens && !selected.is_empty() {
            continue;
        }
        used_tokens += cost;
        selected.push(chunk);
        if used_tokens >= max_tokens {
            break;
        }
    }
    selected.sort_by_key(|c| c.order);

    let metrics = PreselectMetrics {
        total_chunks,
        selected_chunks: selected.len(),
        selected_tokens: used_tokens,
    };
    let assembled = selected.into_iter().map(|c| c.text).collect::<Vec<_>>().join("\n\n");
    (assembled, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_paragraphs_covers_every_paragraph() {
        let text = (0..10).map(|i| format!("paragraph number {i} with some filler words")).collect::<Vec<_>>().join("\n\n");
        let chunks = chunk_paragraphs(&text);
        assert!(!chunks.is_empty());
        for i in 0..10 {
            assert!(chunks.iter().any(|c| c.contains(&format!("paragraph number {i}"))));
        }
    }

    #[test]
    fn preselect_prefers_keyword_rich_chunks_under_budget() {
        let text = "Our mission is bold and clear.\n\nrandom filler about nothing in particular.\n\nWe value trust and community deeply in our mission.".to_string();
        let (assembled, metrics) = preselect(&text, &["mission", "trust"], 20);
        assert!(assembled.contains("mission"));
        assert!(metrics.selected_chunks >= 1);
        assert!(metrics.total_chunks >= metrics.selected_chunks);
    }

    #[test]
    fn preselect_keeps_selected_chunks_in_original_order() {
        let text = "Alpha mission statement here.\n\nBeta filler words only.\n\nGamma mission focus area.".to_string();
        let (assembled, _) = preselect(&text, &["mission"], 1000);
        let alpha_pos = assembled.find("Alpha").unwrap();
        let gamma_pos = assembled.find("Gamma").unwrap();
        assert!(alpha_pos < gamma_pos);
    }
}
