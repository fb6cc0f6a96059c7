//! Provider-agnostic AI client used by the analysis pipeline.
//!
//! Exposes two thin wire clients — [`openai::OpenAi`] and [`claude::Claude`] —
//! each offering structured-output extraction, plain chat completion, and
//! vision description over a single image. Callers that need fallback
//! cascades, circuit breaking, or scheduling compose these primitives;
//! this crate only speaks the provider wire protocols.

pub mod claude;
pub mod openai;

pub use openai::StructuredOutput;
