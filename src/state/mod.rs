//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunPhase`: the orchestrator's phase (init, parser selection, crawling, fetching, ...)

mod run_phase;

// Re-export main types
pub use run_phase::RunPhase;
