//! Per-key prompt construction and analysis (C12), vision analysis (C13),
//! and deterministic/narrative summarization (C14).

pub mod analyzer;
pub mod degraded;
pub mod error;
pub mod preselect;
pub mod prompts;
pub mod sanitize;
pub mod services;
pub mod specs;
pub mod summarizer;
pub mod vision;

pub use analyzer::{
    analyze_textual_key, run_discovery_textual_keys, run_memorability_keys, synthesize_brand_summary,
};
pub use error::AnalyzeError;
pub use services::Services;
