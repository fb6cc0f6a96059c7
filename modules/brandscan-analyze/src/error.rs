use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("input corpus too short: {0} chars, need at least 100")]
    CorpusTooShort(usize),

    #[error("llm call failed for key {key}: {source}")]
    Llm {
        key: &'static str,
        #[source]
        source: brandscan_llm::LlmError,
    },

    #[error("response for key {0} failed validation and no degraded fallback applies")]
    Unvalidatable(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
