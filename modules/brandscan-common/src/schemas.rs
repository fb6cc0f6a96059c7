//! Per-key response schemas. Each type derives `JsonSchema` so the LLM
//! cascade can request strict structured output, and `Deserialize` so a
//! validated payload can be parsed straight off the wire.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PositioningTheme {
    pub theme: String,
    pub description: String,
    pub evidence_quotes: Vec<String>,
    pub confidence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PositioningThemes {
    pub themes: Vec<PositioningTheme>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum KeyMessageType {
    Tagline,
    #[serde(rename = "Value Proposition")]
    ValueProposition,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyMessage {
    pub message: String,
    pub context: String,
    #[serde(rename = "type")]
    pub kind: KeyMessageType,
    pub confidence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyMessages {
    pub key_messages: Vec<KeyMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Tone {
    pub tone: String,
    pub justification: String,
    pub evidence_quote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToneContradiction {
    pub contradiction: String,
    pub evidence_quote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToneOfVoice {
    pub primary_tone: Tone,
    pub secondary_tone: Tone,
    pub contradictions: Vec<ToneContradiction>,
    pub confidence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OverallImpression {
    pub summary: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorPalette {
    pub description: String,
    pub consistency_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Typography {
    pub description: String,
    pub consistency_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageryStyle {
    pub description: String,
    pub consistency_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VisualIdentity {
    pub color_palette: ColorPalette,
    pub typography: Typography,
    pub imagery_style: ImageryStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StrategicAlignment {
    pub harmony: String,
    pub dissonance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BrandElements {
    pub overall_impression: OverallImpression,
    pub coherence_score: i32,
    pub visual_identity: VisualIdentity,
    pub strategic_alignment: StrategicAlignment,
    pub confidence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VisualTextAlignment {
    pub alignment: YesNo,
    pub justification: String,
}

/// Shared shape of the six Diagnosis-mode memorability keys.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemorabilityKeyResult {
    pub score: i32,
    pub analysis: String,
    pub evidence: String,
    pub confidence: i32,
    pub confidence_rationale: String,
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;

    #[test]
    fn positioning_themes_schema_has_no_refs() {
        let schema = PositioningThemes::openai_schema();
        let rendered = serde_json::to_string(&schema).unwrap();
        assert!(!rendered.contains("$ref"));
        assert!(!rendered.contains("definitions"));
    }

    #[test]
    fn brand_elements_schema_is_fully_required() {
        let schema = BrandElements::openai_schema();
        let required = schema["required"].as_array().unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert!(names.contains(&"overall_impression"));
        assert!(names.contains(&"coherence_score"));
        assert!(names.contains(&"confidence"));
    }
}
