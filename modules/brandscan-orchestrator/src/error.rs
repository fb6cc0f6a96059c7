use brandscan_common::ssrf::SsrfError;
use brandscan_fetcher::FetchError;
use thiserror::Error;

/// Top-level scan failure. Wraps the lower crates' error types as variants
/// so `?` composes across crate boundaries; the Orchestrator's top-level
/// match on this is what decides terminal-`error` vs. per-key-`error` vs.
/// silent recovery.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("seed url rejected: {0}")]
    Ssrf(#[from] SsrfError),

    #[error("homepage fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("no pages could be selected for analysis")]
    NoPagesSelected,

    #[error("assembled corpus is empty")]
    EmptyCorpus,

    #[error("scan was cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
