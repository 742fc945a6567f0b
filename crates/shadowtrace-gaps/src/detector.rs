//! Four independent checks per adjacent message pair

use shadowtrace_core::{ContextEntry, DetectedGap, DetectionType, ParsedMessage};
use tracing::debug;

use crate::baseline::Baseline;
use crate::config::DetectorConfig;
use crate::heuristics::{context_mismatch, pattern_break};
use crate::scoring::suspicion_score;

const MAX_ESTIMATED_MISSING: i64 = 50;

#[derive(Debug)]
pub struct GapDetector<'a> {
    messages: &'a [ParsedMessage],
    config: DetectorConfig,
    baseline: Baseline,
}

impl<'a> GapDetector<'a> {
    pub fn new(messages: &'a [ParsedMessage], config: DetectorConfig) -> Self {
        let baseline = Baseline::from_messages(messages, config.max_normal_gap_secs);
        Self {
            messages,
            config,
            baseline,
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Every flagged adjacent pair, in sequence order
    pub fn detect_all(&self) -> Vec<DetectedGap> {
        if self.messages.len() < 2 {
            return Vec::new();
        }

        let gaps: Vec<DetectedGap> = (1..self.messages.len())
            .filter_map(|index| self.evaluate_pair(index))
            .collect();

        debug!(
            messages = self.messages.len(),
            gaps = gaps.len(),
            baseline_mean = self.baseline.mean,
            baseline_stdev = self.baseline.stdev,
            "gap detection complete"
        );
        gaps
    }

    fn evaluate_pair(&self, index: usize) -> Option<DetectedGap> {
        let prev = &self.messages[index - 1];
        let curr = &self.messages[index];
        let gap_seconds = (curr.timestamp - prev.timestamp).num_seconds();

        let mut fired: Vec<DetectionType> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        if self.is_time_anomaly(gap_seconds) {
            fired.push(DetectionType::TimeAnomaly);
            reasons.push(format!(
                "Unusual gap of {} minutes detected",
                gap_seconds / 60
            ));
        }

        if prev.is_deleted || curr.is_deleted {
            fired.push(DetectionType::ExplicitDeletion);
            reasons.push("Adjacent message marked as deleted".to_string());
        }

        if let Some(reason) = context_mismatch(prev, curr) {
            fired.push(DetectionType::ContextMismatch);
            reasons.push(reason.to_string());
        }

        if let Some(reason) = pattern_break(
            self.messages,
            index,
            self.config.min_same_sender_run,
            self.config.run_lookback,
        ) {
            fired.push(DetectionType::PatternBreak);
            reasons.push(reason);
        }

        let detection_type = *fired.first()?;
        let suspicion_score = suspicion_score(gap_seconds, &fired, reasons.len());

        Some(DetectedGap {
            before_seq: prev.sequence_number,
            after_seq: curr.sequence_number,
            before_timestamp: prev.timestamp,
            after_timestamp: curr.timestamp,
            time_gap_seconds: gap_seconds,
            detection_type,
            suspicion_score,
            suspicion_reasons: reasons,
            context_before: self.context(index, true),
            context_after: self.context(index, false),
            estimated_missing: self.estimate_missing(gap_seconds),
        })
    }

    fn is_time_anomaly(&self, gap_seconds: i64) -> bool {
        let min_gap = self.config.min_suspicious_gap_secs;
        if gap_seconds < min_gap {
            return false;
        }

        let (mean, stdev) = self.baseline.excluding(gap_seconds as f64);
        if stdev > 0.0 {
            let z_score = (gap_seconds as f64 - mean) / stdev;
            return z_score > self.config.z_score_threshold;
        }

        gap_seconds > min_gap * 3
    }

    /// `before`: messages ending at index - 1. Otherwise: messages starting at index.
    fn context(&self, index: usize, before: bool) -> Vec<ContextEntry> {
        let window = self.config.context_window;
        let range = if before {
            index.saturating_sub(window)..index
        } else {
            index..(index + window).min(self.messages.len())
        };

        self.messages[range]
            .iter()
            .map(|m| ContextEntry::from_message(m, self.config.content_preview_chars))
            .collect()
    }

    fn estimate_missing(&self, gap_seconds: i64) -> Option<u32> {
        let mean = self.baseline.mean;
        if mean <= 0.0 || gap_seconds as f64 <= mean {
            return None;
        }
        let estimated = (gap_seconds as f64 / mean).floor() as i64 - 1;
        Some(estimated.clamp(1, MAX_ESTIMATED_MISSING) as u32)
    }
}

/// Detect gaps with default thresholds
pub fn detect_all(messages: &[ParsedMessage]) -> Vec<DetectedGap> {
    GapDetector::new(messages, DetectorConfig::default()).detect_all()
}

/// Keep gaps whose suspicion score is at least `threshold`
pub fn filter_by_suspicion(gaps: Vec<DetectedGap>, threshold: f64) -> Vec<DetectedGap> {
    gaps.into_iter()
        .filter(|g| g.suspicion_score >= threshold)
        .collect()
}
