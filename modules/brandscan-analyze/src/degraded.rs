//! Degraded-fallback synthesis: when the validator exhausts repair for a
//! key, produce a typed-valid payload from a short excerpt of the sanitized
//! input rather than surfacing a hard failure, per the cache/validation
//! degraded-fallback policy. Confidence is always clamped to at most 50 —
//! this is a fallback, not a real analysis.

use brandscan_common::model::AnalysisKey;
use serde_json::{json, Value};

const EXCERPT_CHARS: usize = 300;
const FALLBACK_CONFIDENCE: i64 = 35;

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Synthesizes a schema-valid payload for `key` from `sanitized_text`,
/// independent of any LLM call.
pub fn synthesize(key: AnalysisKey, sanitized_text: &str) -> Value {
    let excerpt = excerpt(sanitized_text);
    match key {
        AnalysisKey::PositioningThemes => json!({
            "themes": [{
                "theme": "Unable to synthesize themes",
                "description": "Automated analysis could not be completed; showing a raw excerpt instead.",
                "evidence_quotes": [excerpt],
                "confidence": FALLBACK_CONFIDENCE,
            }]
        }),
        AnalysisKey::KeyMessages => json!({
            "key_messages": [{
                "message": excerpt,
                "context": "Automated analysis could not be completed.",
                "type": "Value Proposition",
                "confidence": FALLBACK_CONFIDENCE,
            }]
        }),
        AnalysisKey::ToneOfVoice => json!({
            "primary_tone": {
                "tone": "Undetermined",
                "justification": "Automated analysis could not be completed.",
                "evidence_quote": excerpt,
            },
            "secondary_tone": {
                "tone": "Undetermined",
                "justification": "Automated analysis could not be completed.",
                "evidence_quote": excerpt,
            },
            "contradictions": [],
            "confidence": FALLBACK_CONFIDENCE,
        }),
        AnalysisKey::BrandElements => json!({
            "overall_impression": {"summary": "Automated analysis could not be completed.", "keywords": []},
            "coherence_score": 0,
            "visual_identity": {
                "color_palette": {"description": "Undetermined", "consistency_notes": "Undetermined"},
                "typography": {"description": "Undetermined", "consistency_notes": "Undetermined"},
                "imagery_style": {"description": "Undetermined", "consistency_notes": "Undetermined"},
            },
            "strategic_alignment": {"harmony": "Undetermined", "dissonance": "Undetermined"},
            "confidence": FALLBACK_CONFIDENCE,
        }),
        AnalysisKey::VisualTextAlignment => json!({
            "alignment": "No",
            "justification": "Automated analysis could not be completed.",
        }),
        AnalysisKey::Emotion
        | AnalysisKey::Attention
        | AnalysisKey::Story
        | AnalysisKey::Involvement
        | AnalysisKey::Repetition
        | AnalysisKey::Consistency => json!({
            "score": 0,
            "analysis": "Automated analysis could not be completed for this key.",
            "evidence": excerpt,
            "confidence": FALLBACK_CONFIDENCE,
            "confidence_rationale": "Degraded fallback: the LLM response failed validation and repair.",
            "recommendation": "Retry this scan once the analysis service is healthy.",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::spec_for;
    use brandscan_llm::validate::coerce_and_prune;

    #[test]
    fn every_key_synthesizes_a_payload_that_survives_its_own_spec() {
        for key in AnalysisKey::DISCOVERY_TEXTUAL
            .into_iter()
            .chain(AnalysisKey::MEMORABILITY)
            .chain([AnalysisKey::BrandElements, AnalysisKey::VisualTextAlignment])
        {
            let mut payload = synthesize(key, "Our mission is to build great products for everyone.");
            let spec = spec_for(key);
            assert!(coerce_and_prune(&mut payload, &spec), "{key:?} degraded payload failed its own spec");
        }
    }

    #[test]
    fn confidence_never_exceeds_fifty() {
        let payload = synthesize(AnalysisKey::Emotion, "some text");
        assert!(payload["confidence"].as_i64().unwrap() <= 50);
    }
}
