//! Unified call surface: capability probe, then a three-tier cascade
//! (Responses API primary → chat-completions fallback A → fast
//! chat-completions fallback B), wrapped in a wall-clock timeout and backed
//! by the per-key circuit breaker.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use ai_client::openai::OpenAi;
use tokio::time::timeout;
use tracing::warn;

use crate::breaker::BreakerRegistry;
use crate::error::LlmError;
use crate::tokens::{adaptive_timeout, estimate_tokens};

const PROBE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Unknown,
    Capable,
    Incapable,
}

impl From<u8> for Probe {
    fn from(v: u8) -> Self {
        match v {
            1 => Probe::Capable,
            2 => Probe::Incapable,
            _ => Probe::Unknown,
        }
    }
}

/// Raw text plus the bookkeeping the schema validator and event stream need.
#[derive(Debug, Clone)]
pub struct LlmCallMeta {
    pub api_used: &'static str,
    pub model: String,
    pub token_usage: u32,
    pub token_estimate: u32,
}

pub struct LlmClient {
    primary: OpenAi,
    fallback_a: OpenAi,
    fallback_b: OpenAi,
    breaker: BreakerRegistry,
    force_chat_completions: bool,
    probe_state: AtomicU8,
    probed_once: AtomicBool,
}

impl LlmClient {
    pub fn new(
        primary: OpenAi,
        fallback_a: OpenAi,
        fallback_b: OpenAi,
        breaker: BreakerRegistry,
        force_chat_completions: bool,
    ) -> Self {
        Self {
            primary,
            fallback_a,
            fallback_b,
            breaker,
            force_chat_completions,
            probe_state: AtomicU8::new(0),
            probed_once: AtomicBool::new(false),
        }
    }

    /// Once-per-process capability probe against the primary tier. An
    /// env-driven `force_chat_completions` flag shortcuts straight to
    /// `false` without ever issuing the probe call.
    async fn responses_capable(&self) -> bool {
        if self.force_chat_completions {
            return false;
        }
        if self.probed_once.load(Ordering::Acquire) {
            return Probe::from(self.probe_state.load(Ordering::Acquire)) == Probe::Capable;
        }

        let capable = timeout(PROBE_TIMEOUT, self.primary.probe_responses())
            .await
            .is_ok_and(|r| r.is_ok());

        self.probe_state
            .store(if capable { 1 } else { 2 }, Ordering::Release);
        self.probed_once.store(true, Ordering::Release);
        capable
    }

    /// Runs the three-tier cascade for `key_name`, returning the raw text
    /// response and call metadata. Honors the breaker: when open for
    /// `key_name`, the primary tier is skipped entirely. `schema` is the
    /// per-key JSON Schema used for strict structured output on the
    /// Responses tier and, when `enforce_schema` is set, on fallback A.
    pub async fn choose_and_call(
        &self,
        key_name: &str,
        prompt: &str,
        schema: &serde_json::Value,
        enforce_schema: bool,
    ) -> Result<(String, LlmCallMeta), LlmError> {
        let breaker_open = self.breaker.is_open(key_name);

        if !breaker_open && self.responses_capable().await {
            match self.call_primary(prompt, schema).await {
                Ok((raw, meta)) => {
                    self.breaker.record_success(key_name);
                    return Ok((raw, meta));
                }
                Err(e) => {
                    warn!(key = key_name, error = %e, "primary LLM tier failed");
                    self.breaker.record_failure(key_name);
                }
            }
        }

        match self.call_fallback_a(prompt, schema, enforce_schema).await {
            Ok((raw, meta)) => {
                self.breaker.record_success(key_name);
                return Ok((raw, meta));
            }
            Err(e) => {
                warn!(key = key_name, error = %e, "fallback A LLM tier failed");
                self.breaker.record_failure(key_name);
            }
        }

        match self.call_fallback_b(prompt).await {
            Ok((raw, meta)) => {
                self.breaker.record_success(key_name);
                Ok((raw, meta))
            }
            Err(e) => {
                warn!(key = key_name, error = %e, "fallback B LLM tier failed");
                self.breaker.record_failure(key_name);
                Err(LlmError::CascadeExhausted(key_name.to_string()))
            }
        }
    }

    async fn call_primary(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<(String, LlmCallMeta), LlmError> {
        let tokens = estimate_tokens(prompt);
        let wait = adaptive_timeout(tokens, 75);
        let raw = timeout(
            wait,
            self.primary
                .responses_structured_raw(prompt, "minimal", schema.clone()),
        )
        .await
        .map_err(|_| LlmError::Timeout(wait))?
        .map_err(|e| LlmError::Call(e.to_string()))?;
        Ok((
            raw,
            LlmCallMeta {
                api_used: "responses_api",
                model: self.primary.model().to_string(),
                token_usage: 0,
                token_estimate: tokens,
            },
        ))
    }

    async fn call_fallback_a(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
        enforce_schema: bool,
    ) -> Result<(String, LlmCallMeta), LlmError> {
        let tokens = estimate_tokens(prompt);
        let wait = adaptive_timeout(tokens, 75);
        let raw = call_with_one_retry_on_timeout(
            &self.fallback_a,
            prompt,
            schema,
            enforce_schema,
            wait,
        )
        .await?;
        Ok((
            raw,
            LlmCallMeta {
                api_used: "chat_completions",
                model: self.fallback_a.model().to_string(),
                token_usage: 0,
                token_estimate: tokens,
            },
        ))
    }

    async fn call_fallback_b(&self, prompt: &str) -> Result<(String, LlmCallMeta), LlmError> {
        let tokens = estimate_tokens(prompt);
        let wait = adaptive_timeout(tokens, 60);
        let raw = timeout(
            wait,
            self.fallback_b
                .json_object_completion(BRAND_STRATEGIST_SYSTEM, prompt),
        )
        .await
        .map_err(|_| LlmError::Timeout(wait))?
        .map_err(|e| LlmError::Call(e.to_string()))?;
        Ok((
            raw,
            LlmCallMeta {
                api_used: "chat_completions_fallback",
                model: self.fallback_b.model().to_string(),
                token_usage: 0,
                token_estimate: tokens,
            },
        ))
    }
}

const BRAND_STRATEGIST_SYSTEM: &str = "You are a senior brand strategist. Output only valid JSON.";

/// Retries exactly once on timeout, with a short fixed backoff; any other
/// error propagates immediately without retry. Uses strict schema
/// enforcement when `enforce_schema` is set, otherwise a looser
/// `json_object` constraint.
async fn call_with_one_retry_on_timeout(
    client: &OpenAi,
    prompt: &str,
    schema: &serde_json::Value,
    enforce_schema: bool,
    per_attempt_timeout: Duration,
) -> Result<String, LlmError> {
    let mut attempt = 0u32;
    loop {
        let call = async {
            if enforce_schema {
                client
                    .structured_output(BRAND_STRATEGIST_SYSTEM, prompt, schema.clone())
                    .await
            } else {
                client.json_object_completion(BRAND_STRATEGIST_SYSTEM, prompt).await
            }
        };
        let result = timeout(per_attempt_timeout, call).await;
        match result {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => return Err(LlmError::Call(e.to_string())),
            Err(_) if attempt == 0 => {
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
            Err(_) => return Err(LlmError::Timeout(per_attempt_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_from_u8_round_trips() {
        assert_eq!(Probe::from(0u8), Probe::Unknown);
        assert_eq!(Probe::from(1u8), Probe::Capable);
        assert_eq!(Probe::from(2u8), Probe::Incapable);
    }

    #[tokio::test]
    async fn force_chat_completions_skips_probe_without_a_network_call() {
        let client = LlmClient::new(
            OpenAi::new("sk-test", "gpt-5").with_base_url("http://127.0.0.1:0"),
            OpenAi::new("sk-test", "gpt-4o").with_base_url("http://127.0.0.1:0"),
            OpenAi::new("sk-test", "gpt-4o-mini").with_base_url("http://127.0.0.1:0"),
            BreakerRegistry::new(3, 600),
            true,
        );
        assert!(!client.responses_capable().await);
    }
}
