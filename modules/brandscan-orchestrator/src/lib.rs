//! Scan Orchestrator (C15): sequences the five scan phases, owns the
//! `ScanEvent` stream contract, and wires together every crate in the
//! pipeline.

pub mod error;
pub mod scan;

pub use error::ScanError;
pub use scan::{Scan, ScanOutcome};
