//! Core use-case services.
//!
//! # Responsibility
//! - Run the single-pass slot assignment and the scoring-based matching.
//! - Derive summaries from assignment results.
//! - Orchestrate load, assign, layout and export as one pipeline.

pub mod matching;
pub mod pipeline;
pub mod slot_engine;
pub mod summary;
