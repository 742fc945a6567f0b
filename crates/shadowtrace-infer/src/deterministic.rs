//! Offline backend built from shallow context heuristics

use shadowtrace_core::{truncate_chars, ContextEntry, DetectedGap, DetectionType, InferenceResult};

use crate::backend::InferenceBackend;
use crate::ANCHORS_PER_SIDE;

pub const DETERMINISTIC_MODEL: &str = "deterministic-mock";

/// Attached to every result this backend produces
pub const MOCK_FLAGS: [&str; 2] = ["MOCK_DATA", "NOT_REAL_PREDICTION"];

const MAX_CONFIDENCE: f64 = 0.85;
const MIN_TOPIC_CHARS: usize = 3;
const TOPIC_SAMPLE_CHARS: usize = 50;
const TOPIC_DISPLAY_CHARS: usize = 30;
const UNKNOWN_TOPIC: &str = "unidentified matter";
const MAX_CITED_REASONS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicBackend;

impl DeterministicBackend {
    pub fn new() -> Self {
        Self
    }
}

impl InferenceBackend for DeterministicBackend {
    fn name(&self) -> &str {
        "deterministic"
    }

    fn model(&self) -> &str {
        DETERMINISTIC_MODEL
    }

    fn is_mock(&self) -> bool {
        true
    }

    fn produce(&self, gap: &DetectedGap) -> InferenceResult {
        let topic = topic_hint(&gap.context_before, &gap.context_after);
        let (intent, content) = templates(gap.detection_type, &topic);

        InferenceResult {
            predicted_intent: intent,
            predicted_content: Some(content),
            predicted_sender: predict_sender(gap),
            confidence_score: confidence(gap),
            context_anchors: gap.context_anchors(ANCHORS_PER_SIDE, ANCHORS_PER_SIDE),
            reasoning: reasoning(gap, &topic),
            backend: DETERMINISTIC_MODEL.to_string(),
            hallucination_flags: MOCK_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Quoted excerpt of the first substantial message around the gap
fn topic_hint(before: &[ContextEntry], after: &[ContextEntry]) -> String {
    let Some(content) = before
        .iter()
        .chain(after)
        .map(|e| e.content.as_str())
        .find(|c| c.chars().count() > MIN_TOPIC_CHARS)
    else {
        return UNKNOWN_TOPIC.to_string();
    };

    let sample = truncate_chars(content, TOPIC_SAMPLE_CHARS).trim();
    if sample.chars().count() > TOPIC_DISPLAY_CHARS {
        format!("'{}...'", truncate_chars(sample, TOPIC_DISPLAY_CHARS))
    } else {
        format!("'{}'", sample)
    }
}

fn templates(detection_type: DetectionType, topic: &str) -> (String, String) {
    match detection_type {
        DetectionType::ExplicitDeletion => (
            format!("Possible exchange of sensitive information related to {}", topic),
            format!("[REDACTED: Possible discussion about {}]", topic),
        ),
        DetectionType::TimeAnomaly => (
            format!("Discussion about {} likely continued", topic),
            "[INFERRED: Response confirming previous statement]".to_string(),
        ),
        DetectionType::ContextMismatch => (
            "Clarification request about previous statement".to_string(),
            "[PREDICTED: Question seeking clarification]".to_string(),
        ),
        DetectionType::PatternBreak => (
            format!("Follow-up questions about {}", topic),
            "[MOCK: Agreement or acknowledgment message]".to_string(),
        ),
    }
}

/// When the same person speaks on both sides, the silent partner is the
/// likelier author of what went missing.
fn predict_sender(gap: &DetectedGap) -> Option<String> {
    let last = gap.context_before.last()?.sender.as_str();
    let next = gap.context_after.first()?.sender.as_str();

    if last == next {
        if let Some(other) = gap.window_senders().into_iter().find(|s| *s != last) {
            return Some(other.to_string());
        }
    }
    Some(last.to_string())
}

fn confidence(gap: &DetectedGap) -> f64 {
    let entries = gap.context_before.len() + gap.context_after.len();
    let context_bonus = (entries as f64 * 0.05).min(0.3);
    let time_bonus = if gap.time_gap_seconds < 3600 {
        0.15
    } else if gap.time_gap_seconds < 7200 {
        0.1
    } else {
        0.0
    };
    let type_bonus = if gap.detection_type == DetectionType::ExplicitDeletion {
        0.1
    } else {
        0.05
    };
    (0.4 + context_bonus + time_bonus + type_bonus).min(MAX_CONFIDENCE)
}

fn reasoning(gap: &DetectedGap, topic: &str) -> String {
    let cited = if gap.suspicion_reasons.is_empty() {
        "unusual gap detected".to_string()
    } else {
        gap.suspicion_reasons
            .iter()
            .take(MAX_CITED_REASONS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    };
    format!(
        "[MOCK REASONING] Gap characteristics ({}) and surrounding context about {} \
         suggest roughly {} message(s) may be missing; the flow implies a reply or \
         continuation was expected.",
        cited,
        topic,
        gap.estimated_missing.unwrap_or(1)
    )
}
