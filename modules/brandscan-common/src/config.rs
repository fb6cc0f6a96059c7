use std::env;

/// Process-wide configuration loaded from environment variables.
///
/// Required variables panic at startup with a descriptive message — a
/// misconfigured deployment should fail fast rather than run with a
/// silently-empty credential.
#[derive(Debug, Clone)]
pub struct Config {
    // LLM providers
    pub openai_api_key: String,
    pub anthropic_api_key: Option<String>,

    pub llm_primary_model: String,
    pub llm_fallback_model: String,
    pub llm_fast_model: String,
    pub force_chat_completions: bool,

    pub llm_concurrency: usize,
    pub tpm_limit: u64,

    pub cb_threshold: u32,
    pub cb_cooldown_seconds: u64,

    pub cache_ttl_seconds: u64,
    pub cache_dir: String,

    pub corpus_max_chars: usize,
    pub max_pages: usize,
    pub seed_high_signal_pages: usize,
    pub novelty_threshold: f64,

    pub prompt_version: String,

    // Managed scraper
    pub browserless_url: String,
    pub browserless_token: Option<String>,
    pub fetcher_country: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration for the scan pipeline (CLI runner or API server).
    pub fn from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),

            llm_primary_model: env::var("LLM_PRIMARY_MODEL")
                .unwrap_or_else(|_| "gpt-5".to_string()),
            llm_fallback_model: env::var("LLM_FALLBACK_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            llm_fast_model: env::var("LLM_FAST_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            force_chat_completions: parse_bool_env("FORCE_CHAT_COMPLETIONS", false),

            llm_concurrency: parse_env("LLM_CONCURRENCY", 2),
            tpm_limit: parse_env("TPM_LIMIT", 80_000),

            cb_threshold: parse_env("CB_THRESHOLD", 3),
            cb_cooldown_seconds: parse_env("CB_COOLDOWN_SECONDS", 600),

            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS", 86_400),
            cache_dir: env::var("CACHE_DIR").unwrap_or_else(|_| "./data/cache".to_string()),

            corpus_max_chars: parse_env("CORPUS_MAX_CHARS", 40_000),
            max_pages: parse_env("MAX_PAGES", 18),
            seed_high_signal_pages: parse_env("SEED_HIGH_SIGNAL_PAGES", 12),
            novelty_threshold: parse_env("NOVELTY_THRESHOLD", 0.12),

            prompt_version: env::var("PROMPT_VERSION").unwrap_or_else(|_| "v1".to_string()),

            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            fetcher_country: env::var("FETCHER_COUNTRY").unwrap_or_else(|_| "us".to_string()),

            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parse_env("WEB_PORT", 3000),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Log configuration at startup without ever printing secret values —
    /// only their presence and character length.
    pub fn log_redacted(&self) {
        let secrets = [
            ("OPENAI_API_KEY", Some(self.openai_api_key.as_str())),
            ("ANTHROPIC_API_KEY", self.anthropic_api_key.as_deref()),
            ("BROWSERLESS_TOKEN", self.browserless_token.as_deref()),
        ];
        for (name, value) in secrets {
            match value {
                Some(v) if !v.is_empty() => tracing::info!("{name} = ({} chars)", v.len()),
                _ => tracing::info!("{name} = (empty)"),
            }
        }
        tracing::info!(
            primary_model = %self.llm_primary_model,
            fallback_model = %self.llm_fallback_model,
            fast_model = %self.llm_fast_model,
            concurrency = self.llm_concurrency,
            tpm_limit = self.tpm_limit,
            "llm config"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_env_defaults_when_unset() {
        assert!(!parse_bool_env("BRANDSCAN_TEST_UNSET_FLAG_XYZ", false));
    }

    #[test]
    fn parse_env_falls_back_to_default_on_missing() {
        let v: u32 = parse_env("BRANDSCAN_TEST_UNSET_NUMBER_XYZ", 42);
        assert_eq!(v, 42);
    }
}
