//! Shared configuration, error taxonomy, data model, event protocol, and
//! response schemas for the brand-scan pipeline.

pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod schemas;
pub mod screenshot_cache;
pub mod ssrf;

pub use config::Config;
pub use error::CommonError;
pub use event::{ScanEvent, ScanPhase};
pub use model::{
    AnalysisKey, AnalysisMetrics, AnalysisResult, CacheEntry, Corpus, DiscoveredLink, LinkOrigin,
    Page, ScanMode, ScanRequest, Screenshot, ScreenshotMime, ScoredLink, ValidationStatus,
};
pub use screenshot_cache::ScreenshotCache;
