//! LLM call cascade (C7), circuit breaker (C8), scheduler (C9), schema
//! validator/repairer (C10), and result cache (C11).

pub mod breaker;
pub mod cache;
pub mod client;
pub mod error;
pub mod scheduler;
pub mod tokens;
pub mod validate;

pub use breaker::BreakerRegistry;
pub use cache::ResultCache;
pub use client::{LlmCallMeta, LlmClient};
pub use error::LlmError;
pub use scheduler::{Scheduler, SchedulerPermit};
pub use validate::{ArrayField, NumericField, StringLenField, ValidationSpec};
