//! Step 1 of the Analyzer pipeline (C12): strip markup that survived
//! distillation, enforce a minimum corpus length, and when the result still
//! exceeds the sanitize budget, keep the lines most likely to carry brand
//! signal rather than simply cutting at a character offset.

use std::sync::LazyLock;

use regex::Regex;

pub const MIN_INPUT_CHARS: usize = 100;

/// Ceiling `sanitize` truncates to, matching `Config::corpus_max_chars`'s
/// default. The corpus is normally already under this by the time it
/// reaches here (`assemble_corpus` enforces the same budget upstream), so
/// this is a guard against a caller that skipped that step rather than the
/// primary size control.
const SANITIZE_MAX_CHARS: usize = 40_000;

static SCRIPT_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</\1>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static BRAND_SIGNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(mission|vision|values|about|brand|company|we are|our)\b").unwrap()
});

/// Strips `<script>`/`<style>` blocks and any remaining tags.
pub fn strip_markup(raw: &str) -> String {
    let without_scripts = SCRIPT_STYLE_RE.replace_all(raw, "");
    TAG_RE.replace_all(&without_scripts, "").trim().to_string()
}

/// Truncates `text` to `max_chars`, prioritizing lines containing
/// brand-signal words when a cut is unavoidable: signal lines are kept in
/// original order first, then filler lines fill any remaining budget.
pub fn intelligent_truncate(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let (signal, filler): (Vec<&str>, Vec<&str>) =
        lines.iter().partition(|l| BRAND_SIGNAL_RE.is_match(l));

    let mut kept = Vec::new();
    let mut used = 0usize;
    for line in signal.into_iter().chain(filler) {
        let cost = line.len() + 1;
        if used + cost > max_chars {
            continue;
        }
        kept.push(line);
        used += cost;
    }
    kept.join("\n")
}

/// Runs tag stripping, enforces the minimum-length floor, and applies
/// intelligent truncation against [`SANITIZE_MAX_CHARS`]. Returns `None`
/// when the cleaned text is too short to analyze at all.
pub fn sanitize(raw: &str) -> Option<String> {
    let cleaned = strip_markup(raw);
    if cleaned.len() < MIN_INPUT_CHARS {
        return None;
    }
    Some(intelligent_truncate(&cleaned, SANITIZE_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_and_style_blocks() {
        let raw = "<p>keep</p><script>evil()</script><style>.x{}</style><p>also</p>";
        let cleaned = strip_markup(raw);
        assert!(!cleaned.contains("evil"));
        assert!(!cleaned.contains(".x{}"));
        assert!(cleaned.contains("keep"));
        assert!(cleaned.contains("also"));
    }

    #[test]
    fn rejects_corpus_below_minimum_length() {
        assert!(sanitize("too short").is_none());
    }

    #[test]
    fn intelligent_truncate_prioritizes_brand_signal_lines() {
        let text = "filler line one\nOur mission is bold\nfiller line two\nfiller line three";
        let truncated = intelligent_truncate(text, 30);
        assert!(truncated.starts_with("Our mission is bold"));
    }

    #[test]
    fn intelligent_truncate_is_noop_under_budget() {
        let text = "short text";
        assert_eq!(intelligent_truncate(text, 1000), text);
    }
}
