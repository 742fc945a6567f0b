//! Baseline timing model and suspicious-gap detection over a parsed transcript

mod baseline;
mod config;
mod detector;
mod heuristics;
mod scoring;

pub use baseline::Baseline;
pub use config::DetectorConfig;
pub use detector::{detect_all, filter_by_suspicion, GapDetector};
pub use heuristics::{context_mismatch, pattern_break};
pub use scoring::{duration_weight, suspicion_score, type_weight};
