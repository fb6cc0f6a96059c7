//! Bundles the cross-cutting handles (LLM cascade, scheduler, result cache)
//! that would otherwise be threaded through every call or reached for as
//! shared globals. Built once per process and passed by reference (or, for
//! tasks that must outlive a borrow across a `tokio::spawn`, by `Arc`) into
//! the Analyzer and, later, the Orchestrator.

use std::time::Duration;

use ai_client::openai::OpenAi;
use brandscan_common::Config;
use brandscan_llm::{BreakerRegistry, LlmClient, ResultCache, Scheduler};

pub struct Services {
    pub llm: LlmClient,
    pub cache: ResultCache,
    pub scheduler: Scheduler,
    /// Single-tier client used for plain-text calls that don't go through
    /// the schema-validating cascade (brand synthesis, executive summary).
    pub synthesis_client: OpenAi,
    /// Tags cache fingerprints; bumping `Config::prompt_version` without a
    /// rebuild invalidates stale cache entries keyed to an old template.
    pub prompt_version: String,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let primary = OpenAi::new(&config.openai_api_key, &config.llm_primary_model);
        let fallback_a = OpenAi::new(&config.openai_api_key, &config.llm_fallback_model);
        let fallback_b = OpenAi::new(&config.openai_api_key, &config.llm_fast_model);
        let synthesis_client = fallback_a.clone();
        let breaker = BreakerRegistry::new(config.cb_threshold, config.cb_cooldown_seconds);
        let llm = LlmClient::new(primary, fallback_a, fallback_b, breaker, config.force_chat_completions);

        let cache = ResultCache::new(config.cache_dir.clone(), config.cache_ttl_seconds);
        let scheduler = Scheduler::new(config.llm_concurrency, config.tpm_limit);

        Self { llm, cache, scheduler, synthesis_client, prompt_version: config.prompt_version.clone() }
    }
}

/// How long a single key's analysis will wait on the scheduler before
/// giving up and falling through to the degraded path.
pub const SCHEDULER_WAIT: Duration = Duration::from_secs(120);
