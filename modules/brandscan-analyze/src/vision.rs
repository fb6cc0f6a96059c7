//! Vision Analyzer (C13): `brand_elements` from one or more homepage
//! screenshots plus a text-content summary, and `visual_text_alignment`
//! when `positioning_themes` is also available.

use std::time::Instant;

use ai_client::openai::OpenAi;
use ai_client::StructuredOutput;
use base64::Engine;
use brandscan_common::model::{
    AnalysisKey, AnalysisMetrics, AnalysisResult, Screenshot, ValidationStatus,
};
use brandscan_common::schemas::{BrandElements, VisualTextAlignment};
use brandscan_llm::validate::{coerce_and_prune, parse_with_repair};
use tracing::warn;
use uuid::Uuid;

use crate::prompts;
use crate::specs::spec_for;

/// Below this decoded byte size a screenshot is treated as unusable (blank
/// page, capture error) and excluded from the vision prompt.
const MIN_SCREENSHOT_BYTES: usize = 10 * 1024;
const MAX_SCREENSHOTS: usize = 5;

fn usable_screenshots(screenshots: &[Screenshot]) -> Vec<&Screenshot> {
    screenshots
        .iter()
        .filter(|s| s.bytes.len() >= MIN_SCREENSHOT_BYTES)
        .take(MAX_SCREENSHOTS)
        .collect()
}

fn to_data_urls(screenshots: &[&Screenshot]) -> Vec<String> {
    screenshots
        .iter()
        .map(|s| {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&s.bytes);
            format!("data:{};base64,{encoded}", s.mime.content_type())
        })
        .collect()
}

/// Runs `brand_elements` analysis. Returns `None` when there is no usable
/// screenshot at all — the caller should skip emitting this key rather than
/// fabricate a result.
pub async fn analyze_brand_elements(
    client: &OpenAi,
    screenshots: &[Screenshot],
    text_summary: &str,
) -> Option<AnalysisResult> {
    let usable = usable_screenshots(screenshots);
    if usable.is_empty() {
        return None;
    }

    let started = Instant::now();
    let trace_id = Uuid::new_v4();
    let data_urls = to_data_urls(&usable);
    let prompt = prompts::brand_elements_prompt(text_summary);
    let schema = BrandElements::openai_schema();

    let raw = match client
        .structured_output_with_images(
            "You are a senior brand strategist. Output only valid JSON.",
            &prompt,
            data_urls,
            schema,
        )
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "brand_elements vision call failed, using degraded fallback");
            return Some(degraded(AnalysisKey::BrandElements, text_summary, started, trace_id));
        }
    };

    let mut value = match parse_with_repair(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "brand_elements response unrepairable, using degraded fallback");
            return Some(degraded(AnalysisKey::BrandElements, text_summary, started, trace_id));
        }
    };

    let spec = spec_for(AnalysisKey::BrandElements);
    if !coerce_and_prune(&mut value, &spec) {
        return Some(degraded(AnalysisKey::BrandElements, text_summary, started, trace_id));
    }

    Some(AnalysisResult {
        key: AnalysisKey::BrandElements,
        payload: value,
        metrics: AnalysisMetrics {
            latency_ms: started.elapsed().as_millis() as u64,
            token_usage: 0,
            model: client.model().to_string(),
            api_used: "chat_completions_vision".to_string(),
            validation_status: ValidationStatus::Success,
            repairs: vec![],
            trace_id,
            cache_hit: false,
        },
    })
}

/// Runs `visual_text_alignment`, a text-only call that compares the top
/// positioning themes against a compact brand-elements summary. Requires
/// both upstream results to already exist.
pub async fn analyze_visual_text_alignment(
    client: &OpenAi,
    top_themes: &str,
    brand_elements_summary: &str,
) -> AnalysisResult {
    let started = Instant::now();
    let trace_id = Uuid::new_v4();
    let prompt = prompts::visual_text_alignment_prompt(top_themes, brand_elements_summary);
    let schema = VisualTextAlignment::openai_schema();

    let raw = match client.structured_output("You are a senior brand strategist. Output only valid JSON.", &prompt, schema).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "visual_text_alignment call failed, using degraded fallback");
            return degraded(AnalysisKey::VisualTextAlignment, brand_elements_summary, started, trace_id);
        }
    };

    let mut value = match parse_with_repair(&raw) {
        Ok(v) => v,
        Err(_) => return degraded(AnalysisKey::VisualTextAlignment, brand_elements_summary, started, trace_id),
    };

    let spec = spec_for(AnalysisKey::VisualTextAlignment);
    coerce_and_prune(&mut value, &spec);

    AnalysisResult {
        key: AnalysisKey::VisualTextAlignment,
        payload: value,
        metrics: AnalysisMetrics {
            latency_ms: started.elapsed().as_millis() as u64,
            token_usage: 0,
            model: client.model().to_string(),
            api_used: "chat_completions".to_string(),
            validation_status: ValidationStatus::Success,
            repairs: vec![],
            trace_id,
            cache_hit: false,
        },
    }
}

fn degraded(key: AnalysisKey, text: &str, started: Instant, trace_id: Uuid) -> AnalysisResult {
    let mut payload = crate::degraded::synthesize(key, text);
    let spec = spec_for(key);
    coerce_and_prune(&mut payload, &spec);
    AnalysisResult {
        key,
        payload,
        metrics: AnalysisMetrics {
            latency_ms: started.elapsed().as_millis() as u64,
            token_usage: 0,
            model: String::new(),
            api_used: "degraded_fallback".to_string(),
            validation_status: ValidationStatus::DegradedFallback,
            repairs: vec![],
            trace_id,
            cache_hit: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_common::model::ScreenshotMime;

    #[test]
    fn screenshots_below_minimum_size_are_excluded() {
        let shots = vec![
            Screenshot { cache_id: "a".into(), bytes: vec![0u8; 100], mime: ScreenshotMime::Jpeg },
            Screenshot { cache_id: "b".into(), bytes: vec![0u8; 20_000], mime: ScreenshotMime::Jpeg },
        ];
        let usable = usable_screenshots(&shots);
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].cache_id, "b");
    }

    #[test]
    fn caps_at_five_screenshots() {
        let shots: Vec<Screenshot> = (0..8)
            .map(|i| Screenshot { cache_id: i.to_string(), bytes: vec![0u8; 20_000], mime: ScreenshotMime::Png })
            .collect();
        assert_eq!(usable_screenshots(&shots).len(), MAX_SCREENSHOTS);
    }
}
