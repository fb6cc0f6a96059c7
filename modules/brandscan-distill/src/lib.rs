//! Structured HTML distillation (C5) and social-profile text harvesting (C6).

pub mod distill;
pub mod social;

pub use distill::distill_page;
pub use social::harvest_social_text;
