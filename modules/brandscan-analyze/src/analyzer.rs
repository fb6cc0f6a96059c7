//! The Analyzer (C12): runs the sanitize → pre-select → prompt → cache →
//! schedule → call → validate pipeline for a single analysis key, and the
//! concurrency shape (spawn-per-key, emit-in-completion-order) for the three
//! Discovery textual keys.

use std::sync::Arc;
use std::time::Instant;

use ai_client::StructuredOutput;
use brandscan_common::model::{AnalysisKey, AnalysisMetrics, AnalysisResult, ValidationStatus};
use brandscan_common::schemas::{
    BrandElements, KeyMessages, MemorabilityKeyResult, PositioningThemes, ToneOfVoice, VisualTextAlignment,
};
use brandscan_llm::cache::fingerprint;
use brandscan_llm::tokens::estimate_tokens;
use brandscan_llm::validate::{coerce_and_prune, parse_with_repair};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::prompts;
use crate::sanitize::{sanitize, MIN_INPUT_CHARS};
use crate::services::{Services, SCHEDULER_WAIT};
use crate::specs::spec_for;

const DEFAULT_INPUT_TOKEN_BUDGET: u32 = 3000;

fn schema_for(key: AnalysisKey) -> serde_json::Value {
    match key {
        AnalysisKey::PositioningThemes => PositioningThemes::openai_schema(),
        AnalysisKey::KeyMessages => KeyMessages::openai_schema(),
        AnalysisKey::ToneOfVoice => ToneOfVoice::openai_schema(),
        AnalysisKey::BrandElements => BrandElements::openai_schema(),
        AnalysisKey::VisualTextAlignment => VisualTextAlignment::openai_schema(),
        AnalysisKey::Emotion
        | AnalysisKey::Attention
        | AnalysisKey::Story
        | AnalysisKey::Involvement
        | AnalysisKey::Repetition
        | AnalysisKey::Consistency => MemorabilityKeyResult::openai_schema(),
    }
}

fn keywords_for(key: AnalysisKey) -> &'static [&'static str] {
    match key {
        AnalysisKey::PositioningThemes => prompts::POSITIONING_THEMES_KEYWORDS,
        AnalysisKey::KeyMessages => prompts::KEY_MESSAGES_KEYWORDS,
        AnalysisKey::ToneOfVoice => prompts::TONE_OF_VOICE_KEYWORDS,
        other => prompts::memorability_keywords(other),
    }
}

fn build_prompt(key: AnalysisKey, preselected_text: &str, brand_summary: Option<&str>) -> String {
    match key {
        AnalysisKey::PositioningThemes => prompts::positioning_themes_prompt(preselected_text),
        AnalysisKey::KeyMessages => prompts::key_messages_prompt(preselected_text),
        AnalysisKey::ToneOfVoice => prompts::tone_of_voice_prompt(preselected_text),
        other => prompts::memorability_prompt(other, preselected_text, brand_summary),
    }
}

/// Runs the full per-key pipeline for any textual key (Discovery's three
/// textual artifacts, or one of the six Diagnosis memorability keys). Vision
/// keys (`brand_elements`, `visual_text_alignment`) go through
/// [`crate::vision`] instead, since they need image attachments the generic
/// text pipeline doesn't carry.
pub async fn analyze_textual_key(
    services: &Services,
    key: AnalysisKey,
    raw_corpus: &str,
    brand_summary: Option<&str>,
) -> AnalysisResult {
    let started = Instant::now();
    let trace_id = Uuid::new_v4();

    let Some(sanitized) = sanitize(raw_corpus) else {
        warn!(key = key.as_str(), "corpus below minimum length, using degraded fallback");
        return degraded_result(key, raw_corpus, started, trace_id);
    };

    let (preselected, metrics) = crate::preselect::preselect(&sanitized, keywords_for(key), DEFAULT_INPUT_TOKEN_BUDGET);
    info!(
        key = key.as_str(),
        total_chunks = metrics.total_chunks,
        selected_chunks = metrics.selected_chunks,
        selected_tokens = metrics.selected_tokens,
        "pre-selected input for key"
    );
    let preselected = if preselected.len() >= MIN_INPUT_CHARS { preselected } else { sanitized };

    let prompt = build_prompt(key, &preselected, brand_summary);
    let schema = schema_for(key);
    let fp = fingerprint(&preselected, &prompt, &schema, &services.prompt_version);

    if let Some(cached) = services.cache.get(key.as_str(), &fp).await {
        return AnalysisResult {
            key,
            payload: cached,
            metrics: AnalysisMetrics {
                latency_ms: 0,
                token_usage: 0,
                model: String::new(),
                api_used: "cache".to_string(),
                validation_status: ValidationStatus::Success,
                repairs: vec![],
                trace_id,
                cache_hit: true,
            },
        };
    }

    let tokens_needed = estimate_tokens(&prompt);
    let Some(_permit) = services.scheduler.acquire(tokens_needed, SCHEDULER_WAIT).await else {
        warn!(key = key.as_str(), "scheduler budget exhausted, using degraded fallback");
        return degraded_result(key, &preselected, started, trace_id);
    };

    let call = services.llm.choose_and_call(key.as_str(), &prompt, &schema, true).await;
    let (raw, meta) = match call {
        Ok(v) => v,
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "llm cascade exhausted, using degraded fallback");
            return degraded_result(key, &preselected, started, trace_id);
        }
    };

    let mut value = match parse_with_repair(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "response is not repairable JSON, using degraded fallback");
            return degraded_result(key, &preselected, started, trace_id);
        }
    };

    let spec = spec_for(key);
    if !coerce_and_prune(&mut value, &spec) {
        warn!(key = key.as_str(), "validated response fell below minimum array items, using degraded fallback");
        return degraded_result(key, &preselected, started, trace_id);
    }

    services.cache.put(key.as_str(), &fp, value.clone()).await;

    AnalysisResult {
        key,
        payload: value,
        metrics: AnalysisMetrics {
            latency_ms: started.elapsed().as_millis() as u64,
            token_usage: meta.token_estimate,
            model: meta.model,
            api_used: meta.api_used.to_string(),
            validation_status: ValidationStatus::Success,
            repairs: vec![],
            trace_id,
            cache_hit: false,
        },
    }
}

fn degraded_result(key: AnalysisKey, text: &str, started: Instant, trace_id: Uuid) -> AnalysisResult {
    let excerpt_source = sanitize(text).unwrap_or_else(|| text.to_string());
    let mut payload = crate::degraded::synthesize(key, &excerpt_source);
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

/// Synthesizes a one-paragraph brand overview from the full corpus, used as
/// shared context for the six Diagnosis-mode memorability keys. A single
/// plain-text completion, not routed through the schema-validating cascade
/// since there's no JSON shape to enforce here. Returns `None` on any
/// failure — the memorability keys still run without it, just with less
/// context.
pub async fn synthesize_brand_summary(client: &ai_client::openai::OpenAi, corpus: &str) -> Option<String> {
    let prompt = prompts::brand_synthesis_prompt(corpus);
    match client.complete(&prompt).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "brand synthesis failed, continuing without brand summary context");
            None
        }
    }
}

/// Runs the three Discovery textual keys concurrently, each as its own
/// `tokio::spawn` task, streaming each result onto `results_tx` as soon as
/// it lands — in completion order, not key-declaration order. The caller
/// (the Orchestrator) drains the other end and turns each into a
/// `discovery_result` event without waiting for all three to finish.
pub async fn run_discovery_textual_keys(
    services: Arc<Services>,
    corpus: Arc<String>,
    results_tx: mpsc::UnboundedSender<AnalysisResult>,
) {
    let mut handles = Vec::new();
    for key in AnalysisKey::DISCOVERY_TEXTUAL {
        let services = Arc::clone(&services);
        let corpus = Arc::clone(&corpus);
        handles.push(tokio::spawn(async move { analyze_textual_key(&services, key, &corpus, None).await }));
    }

    let mut remaining = handles;
    while !remaining.is_empty() {
        let (result, _index, rest) = futures::future::select_all(remaining).await;
        remaining = rest;
        match result {
            Ok(analysis_result) => {
                let _ = results_tx.send(analysis_result);
            }
            Err(e) => warn!(error = %e, "discovery textual key task panicked"),
        }
    }
}

/// Runs the six Diagnosis-mode memorability keys concurrently, bounded by
/// the same scheduler as the Discovery textual keys, each given the shared
/// brand summary for context. Streamed onto `results_tx` in completion
/// order.
pub async fn run_memorability_keys(
    services: Arc<Services>,
    corpus: Arc<String>,
    brand_summary: Arc<Option<String>>,
    results_tx: mpsc::UnboundedSender<AnalysisResult>,
) {
    let mut handles = Vec::new();
    for key in AnalysisKey::MEMORABILITY {
        let services = Arc::clone(&services);
        let corpus = Arc::clone(&corpus);
        let brand_summary = Arc::clone(&brand_summary);
        handles.push(tokio::spawn(async move {
            analyze_textual_key(&services, key, &corpus, brand_summary.as_deref()).await
        }));
    }

    let mut remaining = handles;
    while !remaining.is_empty() {
        let (result, _index, rest) = futures::future::select_all(remaining).await;
        remaining = rest;
        match result {
            Ok(analysis_result) => {
                let _ = results_tx.send(analysis_result);
            }
            Err(e) => warn!(error = %e, "memorability key task panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandscan_llm::{BreakerRegistry, LlmClient, ResultCache, Scheduler};

    fn unreachable_services() -> Services {
        let dead = ai_client::openai::OpenAi::new("sk-test", "gpt-5").with_base_url("http://127.0.0.1:0");
        Services {
            llm: LlmClient::new(dead.clone(), dead.clone(), dead.clone(), BreakerRegistry::new(1, 1), true),
            cache: ResultCache::new(std::env::temp_dir().join(format!("brandscan-analyzer-test-{}", std::process::id())), 3600),
            scheduler: Scheduler::new(2, 80_000),
            synthesis_client: dead,
            prompt_version: "v1".to_string(),
        }
    }

    #[tokio::test]
    async fn too_short_corpus_returns_degraded_fallback_without_calling_llm() {
        let services = unreachable_services();
        let result = analyze_textual_key(&services, AnalysisKey::PositioningThemes, "too short", None).await;
        assert_eq!(result.metrics.validation_status, ValidationStatus::DegradedFallback);
        assert!(result.payload["themes"].as_array().unwrap().len() >= 1);
    }
}
