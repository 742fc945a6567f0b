//! Inter-message timing baseline

use shadowtrace_core::stats::{mean, sample_stdev};
use shadowtrace_core::ParsedMessage;

/// Mean and spread of "normal" inter-message deltas for one transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub mean: f64,
    pub stdev: f64,
    /// Deltas (seconds) below the offline cutoff, in sequence order
    samples: Vec<f64>,
}

impl Baseline {
    /// Deltas at or above `max_normal_gap_secs` are left out so sleep and
    /// offline stretches do not inflate the baseline.
    pub fn from_messages(messages: &[ParsedMessage], max_normal_gap_secs: i64) -> Self {
        let samples: Vec<f64> = messages
            .windows(2)
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
            .filter(|&delta| delta < max_normal_gap_secs)
            .map(|delta| delta as f64)
            .collect();

        Self {
            mean: mean(&samples),
            stdev: sample_stdev(&samples),
            samples,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Mean and stdev with one occurrence of `delta` removed, so a gap is not
    /// scored against statistics it inflated itself. Deltas that never entered
    /// the baseline see the full statistics.
    pub fn excluding(&self, delta: f64) -> (f64, f64) {
        let Some(pos) = self.samples.iter().position(|&s| s == delta) else {
            return (self.mean, self.stdev);
        };
        let rest: Vec<f64> = self
            .samples
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != pos)
            .map(|(_, &s)| s)
            .collect();
        (mean(&rest), sample_stdev(&rest))
    }
}
