//! Summarizer (C14): deterministic Discovery-mode assembly over already
//! validated per-key payloads, and a single LLM call for the Diagnosis-mode
//! narrative plus its purely arithmetic quantitative summary.

use ai_client::openai::OpenAi;
use ai_client::StructuredOutput;
use brandscan_common::model::AnalysisResult;
use brandscan_common::schemas::{BrandElements, KeyMessages, PositioningThemes, ToneOfVoice, VisualTextAlignment};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use crate::prompts::executive_summary_prompt;

fn find<'a>(results: &'a [AnalysisResult], key: brandscan_common::model::AnalysisKey) -> Option<&'a AnalysisResult> {
    results.iter().find(|r| r.key == key)
}

/// Deterministic Discovery-mode summary: no LLM call, just formatting over
/// whichever of the five keys actually produced a result.
pub fn summarize_discovery(results: &[AnalysisResult]) -> String {
    use brandscan_common::model::AnalysisKey::*;

    let mut sections = Vec::new();

    if let Some(r) = find(results, PositioningThemes) {
        if let Ok(parsed) = serde_json::from_value::<PositioningThemes>(r.payload.clone()) {
            let mut themes = parsed.themes;
            themes.sort_by(|a, b| b.confidence.cmp(&a.confidence));
            let lines: Vec<String> = themes
                .into_iter()
                .take(3)
                .map(|t| format!("- {} ({}% confidence)", t.theme, t.confidence))
                .collect();
            sections.push(format!("Positioning Themes:\n{}", lines.join("\n")));
        }
    }

    if let Some(r) = find(results, KeyMessages) {
        if let Ok(parsed) = serde_json::from_value::<KeyMessages>(r.payload.clone()) {
            let lines: Vec<String> = parsed
                .key_messages
                .into_iter()
                .take(4)
                .map(|m| format!("- [{:?}] {}", m.kind, m.message))
                .collect();
            sections.push(format!("Key Messages:\n{}", lines.join("\n")));
        }
    }

    if let Some(r) = find(results, ToneOfVoice) {
        if let Ok(parsed) = serde_json::from_value::<ToneOfVoice>(r.payload.clone()) {
            sections.push(format!(
                "Tone of Voice:\n- Primary: {} (\"{}\")\n- Secondary: {} (\"{}\")",
                parsed.primary_tone.tone,
                parsed.primary_tone.evidence_quote,
                parsed.secondary_tone.tone,
                parsed.secondary_tone.evidence_quote,
            ));
        }
    }

    if let Some(r) = find(results, BrandElements) {
        if let Ok(parsed) = serde_json::from_value::<BrandElements>(r.payload.clone()) {
            let keywords: Vec<String> = parsed.overall_impression.keywords.into_iter().take(5).collect();
            sections.push(format!(
                "Brand Elements:\n- Impression: {}\n- Keywords: {}\n- Coherence: {}/5",
                parsed.overall_impression.summary,
                keywords.join(", "),
                parsed.coherence_score,
            ));
        }
    }

    if let Some(r) = find(results, VisualTextAlignment) {
        if let Ok(parsed) = serde_json::from_value::<VisualTextAlignment>(r.payload.clone()) {
            sections.push(format!(
                "Visual-Text Alignment:\n- {:?}: {}",
                parsed.alignment, parsed.justification
            ));
        }
    }

    format!("🔍 Discovery Mode Summary\n\n{}", sections.join("\n\n"))
}

/// Strong/weak/analyzed counts over the six memorability-key scores — a
/// score of 3 counts as neither strong nor weak.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantitativeSummary {
    pub keys_analyzed: u32,
    pub strong_keys: u32,
    pub weak_keys: u32,
}

pub fn quantitative_summary(results: &[AnalysisResult]) -> QuantitativeSummary {
    let mut summary = QuantitativeSummary { keys_analyzed: results.len() as u32, ..Default::default() };
    for result in results {
        if let Some(score) = result.payload.get("score").and_then(|v| v.as_i64()) {
            if score >= 4 {
                summary.strong_keys += 1;
            } else if score <= 2 {
                summary.weak_keys += 1;
            }
        }
    }
    summary
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExecutiveSummary {
    summary: String,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    strategic_focus: String,
}

/// One LLM call over the six memorability-key results, producing the
/// Diagnosis-mode narrative. Falls back to a terse deterministic line if the
/// call fails — the scan should still complete.
pub async fn summarize_diagnosis(client: &OpenAi, results: &[AnalysisResult]) -> String {
    let analyses_text = results
        .iter()
        .map(|r| {
            let score = r.payload.get("score").and_then(|v| v.as_i64()).unwrap_or(0);
            let analysis = r.payload.get("analysis").and_then(|v| v.as_str()).unwrap_or("");
            format!("Key: {}\nScore: {score}\nAnalysis: {analysis}", r.key.as_str())
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = executive_summary_prompt(&analyses_text);
    match client.extract::<ExecutiveSummary>("You are a senior brand strategist. Output only valid JSON.", &prompt).await {
        Ok(es) => format!(
            "Overall Summary: {}\n\nKey Strengths: {}\n\nPrimary Weaknesses: {}\n\nStrategic Focus: {}",
            es.summary,
            es.strengths.join(", "),
            es.weaknesses.join(", "),
            es.strategic_focus,
        ),
        Err(e) => {
            warn!(error = %e, "executive summary call failed, using deterministic fallback");
            let q = quantitative_summary(results);
            format!(
                "Analyzed {} keys: {} strong, {} weak. An executive narrative could not be generated.",
                q.keys_analyzed, q.strong_keys, q.weak_keys
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_common::model::{AnalysisKey, AnalysisMetrics, ValidationStatus};
    use serde_json::json;
    use uuid::Uuid;

    fn fixture(key: AnalysisKey, payload: serde_json::Value) -> AnalysisResult {
        AnalysisResult {
            key,
            payload,
            metrics: AnalysisMetrics {
                latency_ms: 1,
                token_usage: 1,
                model: "test".into(),
                api_used: "test".into(),
                validation_status: ValidationStatus::Success,
                repairs: vec![],
                trace_id: Uuid::new_v4(),
                cache_hit: false,
            },
        }
    }

    #[test]
    fn discovery_summary_includes_top_themes() {
        let results = vec![fixture(
            AnalysisKey::PositioningThemes,
            json!({"themes": [
                {"theme": "Reliability", "description": "d", "evidence_quotes": ["q"], "confidence": 90},
                {"theme": "Innovation", "description": "d", "evidence_quotes": ["q"], "confidence": 70},
            ]}),
        )];
        let summary = summarize_discovery(&results);
        assert!(summary.contains("Reliability"));
        assert!(summary.contains("90% confidence"));
    }

    #[test]
    fn quantitative_summary_counts_strong_and_weak() {
        let results = vec![
            fixture(AnalysisKey::Emotion, json!({"score": 5})),
            fixture(AnalysisKey::Attention, json!({"score": 1})),
            fixture(AnalysisKey::Story, json!({"score": 3})),
        ];
        let q = quantitative_summary(&results);
        assert_eq!(q.keys_analyzed, 3);
        assert_eq!(q.strong_keys, 1);
        assert_eq!(q.weak_keys, 1);
    }
}
