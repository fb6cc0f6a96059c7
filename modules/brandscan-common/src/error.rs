use thiserror::Error;

use crate::ssrf::SsrfError;

/// Shared error type for failures that can surface anywhere in the
/// pipeline before a more specific per-crate error takes over.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("url rejected by ssrf policy: {0}")]
    SsrfRejected(#[from] SsrfError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
