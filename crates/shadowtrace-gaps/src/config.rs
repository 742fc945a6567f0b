//! Thresholds for gap detection

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Shortest gap (seconds) that can count as a timing anomaly
    pub min_suspicious_gap_secs: i64,

    /// Deltas at or above this (seconds) are expected offline periods and stay out of the baseline
    pub max_normal_gap_secs: i64,

    /// Messages kept on each side of a gap
    pub context_window: usize,

    /// Character cap for context entry content
    pub content_preview_chars: usize,

    /// z-score a gap must exceed to be a timing anomaly
    pub z_score_threshold: f64,

    /// Same-sender run length that makes a continuation suspicious
    pub min_same_sender_run: usize,

    /// How far back a same-sender run is counted
    pub run_lookback: usize,

    /// Suspicion score at or above which a gap is high priority
    pub high_priority_threshold: f64,
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self {
            min_suspicious_gap_secs: 30 * 60,
            max_normal_gap_secs: 8 * 3600,
            context_window: 3,
            content_preview_chars: 200,
            z_score_threshold: 2.5,
            min_same_sender_run: 3,
            run_lookback: 10,
            high_priority_threshold: 0.5,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}
