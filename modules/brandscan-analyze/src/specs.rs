//! Per-key [`ValidationSpec`] values. `brandscan_llm::validate` is a generic
//! repair/coerce/prune engine; this module is the one place that knows which
//! fields, at which nesting, belong to which of the eleven analysis keys.

use brandscan_common::model::AnalysisKey;
use brandscan_llm::{ArrayField, NumericField, StringLenField, ValidationSpec};

const CONFIDENCE: NumericField = NumericField { name: "confidence", min: 0, max: 100 };
const SCORE_0_5: NumericField = NumericField { name: "score", min: 0, max: 5 };
const COHERENCE_0_5: NumericField = NumericField { name: "coherence_score", min: 0, max: 5 };

const EVIDENCE_QUOTE_CAP: StringLenField = StringLenField { name: "evidence_quote", max_chars: 400 };
const EVIDENCE_CAP: StringLenField = StringLenField { name: "evidence", max_chars: 2000 };
const ANALYSIS_CAP: StringLenField = StringLenField { name: "analysis", max_chars: 4000 };
const RECOMMENDATION_CAP: StringLenField = StringLenField { name: "recommendation", max_chars: 1000 };

pub const POSITIONING_THEMES: ValidationSpec = ValidationSpec {
    numeric_fields: &[CONFIDENCE],
    string_len_fields: &[],
    array_fields: &[ArrayField {
        name: "themes",
        min_items: 1,
        item_required_fields: &["theme", "description", "evidence_quotes", "confidence"],
    }],
};

pub const KEY_MESSAGES: ValidationSpec = ValidationSpec {
    numeric_fields: &[CONFIDENCE],
    string_len_fields: &[],
    array_fields: &[ArrayField {
        name: "key_messages",
        min_items: 1,
        item_required_fields: &["message", "context", "type", "confidence"],
    }],
};

pub const TONE_OF_VOICE: ValidationSpec = ValidationSpec {
    numeric_fields: &[CONFIDENCE],
    string_len_fields: &[EVIDENCE_QUOTE_CAP],
    array_fields: &[ArrayField {
        name: "contradictions",
        min_items: 0,
        item_required_fields: &["contradiction", "evidence_quote"],
    }],
};

pub const BRAND_ELEMENTS: ValidationSpec = ValidationSpec {
    numeric_fields: &[CONFIDENCE, COHERENCE_0_5],
    string_len_fields: &[],
    array_fields: &[],
};

pub const VISUAL_TEXT_ALIGNMENT: ValidationSpec = ValidationSpec {
    numeric_fields: &[],
    string_len_fields: &[],
    array_fields: &[],
};

/// Shared shape of the six Diagnosis-mode memorability keys.
pub const MEMORABILITY_KEY: ValidationSpec = ValidationSpec {
    numeric_fields: &[SCORE_0_5, CONFIDENCE],
    string_len_fields: &[ANALYSIS_CAP, EVIDENCE_CAP, RECOMMENDATION_CAP],
    array_fields: &[],
};

pub fn spec_for(key: AnalysisKey) -> ValidationSpec {
    match key {
        AnalysisKey::PositioningThemes => POSITIONING_THEMES,
        AnalysisKey::KeyMessages => KEY_MESSAGES,
        AnalysisKey::ToneOfVoice => TONE_OF_VOICE,
        AnalysisKey::BrandElements => BRAND_ELEMENTS,
        AnalysisKey::VisualTextAlignment => VISUAL_TEXT_ALIGNMENT,
        AnalysisKey::Emotion
        | AnalysisKey::Attention
        | AnalysisKey::Story
        | AnalysisKey::Involvement
        | AnalysisKey::Repetition
        | AnalysisKey::Consistency => MEMORABILITY_KEY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_analysis_key_has_a_spec() {
        for key in AnalysisKey::DISCOVERY_TEXTUAL {
            let spec = spec_for(key);
            assert!(!spec.numeric_fields.is_empty() || !spec.array_fields.is_empty());
        }
        for key in AnalysisKey::MEMORABILITY {
            assert_eq!(spec_for(key).numeric_fields.len(), 2);
        }
    }
}
