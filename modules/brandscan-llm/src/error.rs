use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
    #[error("LLM call failed: {0}")]
    Call(String),
    #[error("no model in the cascade produced a usable response for key {0}")]
    CascadeExhausted(String),
    #[error("scheduler could not acquire budget within {0:?}")]
    SchedulerUnavailable(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
