//! Token estimation and adaptive per-call timeouts. No tokenizer crate is in
//! the workspace's dependency stack, so estimation falls back to the
//! reference's `len/4` heuristic directly rather than pulling in `tiktoken`
//! bindings for a single estimate used only to size a timeout.

use std::time::Duration;

const MIN_TOKEN_ESTIMATE: u32 = 200;

pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return MIN_TOKEN_ESTIMATE;
    }
    (text.len() as u32 / 4).max(MIN_TOKEN_ESTIMATE)
}

/// `min(20 + 0.002 * tokens, cap)` seconds.
pub fn adaptive_timeout(tokens: u32, cap_secs: u64) -> Duration {
    let secs = (20.0 + 0.002 * tokens as f64).min(cap_secs as f64);
    Duration::from_secs_f64(secs.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_floors_at_minimum() {
        assert_eq!(estimate_tokens(""), MIN_TOKEN_ESTIMATE);
    }

    #[test]
    fn short_text_floors_at_minimum() {
        assert_eq!(estimate_tokens("hi there"), MIN_TOKEN_ESTIMATE);
    }

    #[test]
    fn long_text_scales_by_four_chars_per_token() {
        let text = "a".repeat(4000);
        assert_eq!(estimate_tokens(&text), 1000);
    }

    #[test]
    fn adaptive_timeout_respects_cap() {
        let t = adaptive_timeout(1_000_000, 90);
        assert_eq!(t, Duration::from_secs(90));
    }

    #[test]
    fn adaptive_timeout_scales_with_tokens() {
        let t = adaptive_timeout(5_000, 90);
        assert_eq!(t, Duration::from_secs_f64(20.0 + 0.002 * 5000.0));
    }
}
