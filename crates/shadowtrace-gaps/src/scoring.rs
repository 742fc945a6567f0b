//! Additive, capped suspicion score

use shadowtrace_core::DetectionType;

const HOUR: i64 = 3600;
const REASON_BONUS: f64 = 0.05;
const MAX_REASON_BONUS: f64 = 0.15;

/// Base term from gap length: <1h, 1-4h, >=4h
pub fn duration_weight(gap_seconds: i64) -> f64 {
    if gap_seconds >= 4 * HOUR {
        0.2
    } else if gap_seconds >= HOUR {
        0.15
    } else {
        0.1
    }
}

pub fn type_weight(detection_type: DetectionType) -> f64 {
    match detection_type {
        DetectionType::ExplicitDeletion => 0.35,
        DetectionType::ContextMismatch => 0.25,
        DetectionType::PatternBreak => 0.2,
        DetectionType::TimeAnomaly => 0.15,
    }
}

/// Every firing check contributes, not only the primary one
pub fn suspicion_score(gap_seconds: i64, fired: &[DetectionType], reason_count: usize) -> f64 {
    let types: f64 = fired.iter().map(|t| type_weight(*t)).sum();
    let reasons = (reason_count as f64 * REASON_BONUS).min(MAX_REASON_BONUS);
    (duration_weight(gap_seconds) + types + reasons).clamp(0.0, 1.0)
}
