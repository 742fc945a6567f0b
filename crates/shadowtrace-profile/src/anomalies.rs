use serde::{Deserialize, Serialize};
use shadowtrace_core::stats::{mean, sample_stdev};
use shadowtrace_core::ParsedMessage;

const MIN_MESSAGES: usize = 10;
const SILENCE_Z_THRESHOLD: f64 = 3.0;
const LENGTH_CHANGE_RATIO: f64 = 0.5;

/// Metadata irregularity that may corroborate tampering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anomaly {
    /// Silence far outside the whole transcript's spacing. Scored against
    /// every delta, including the long ones the gap detector leaves out.
    UnusualSilence {
        before_seq: u32,
        after_seq: u32,
        gap_seconds: i64,
        expected_avg: f64,
        z_score: f64,
    },
    BehaviorChange {
        sender: String,
        metric: String,
        before: f64,
        after: f64,
        change_percent: f64,
    },
}

pub(crate) fn silence_anomalies(messages: &[ParsedMessage]) -> Vec<Anomaly> {
    if messages.len() < MIN_MESSAGES {
        return Vec::new();
    }

    let deltas: Vec<f64> = messages
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64)
        .collect();
    let avg = mean(&deltas);
    let stdev = sample_stdev(&deltas);
    if stdev <= 0.0 {
        return Vec::new();
    }

    messages
        .windows(2)
        .zip(&deltas)
        .filter_map(|(pair, &gap)| {
            let z_score = (gap - avg) / stdev;
            (z_score > SILENCE_Z_THRESHOLD).then(|| Anomaly::UnusualSilence {
                before_seq: pair[0].sequence_number,
                after_seq: pair[1].sequence_number,
                gap_seconds: gap as i64,
                expected_avg: avg,
                z_score,
            })
        })
        .collect()
}

fn mean_length(messages: &[&ParsedMessage]) -> f64 {
    let lengths: Vec<f64> = messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| m.content.chars().count() as f64)
        .collect();
    mean(&lengths)
}

/// Compares each prolific sender's first and second half by mean length
pub(crate) fn behavior_changes(groups: &[(&str, Vec<&ParsedMessage>)]) -> Vec<Anomaly> {
    groups
        .iter()
        .filter(|(_, own)| own.len() >= MIN_MESSAGES)
        .filter_map(|(sender, own)| {
            let (first, second) = own.split_at(own.len() / 2);
            let before = mean_length(first);
            let after = mean_length(second);
            if before <= 0.0 {
                return None;
            }
            let change = (after - before) / before;
            (change.abs() > LENGTH_CHANGE_RATIO).then(|| Anomaly::BehaviorChange {
                sender: sender.to_string(),
                metric: "message_length".to_string(),
                before,
                after,
                change_percent: change * 100.0,
            })
        })
        .collect()
}
