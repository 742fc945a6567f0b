//! Record types shared by parsing, gap detection, profiling and inference

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::truncate_chars;

/// Message classification assigned at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Media,
    System,
    Deleted,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Media => "media",
            MessageType::System => "system",
            MessageType::Deleted => "deleted",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recognized message from a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub timestamp: NaiveDateTime,
    pub sender: String,
    /// Empty for deletions that left no placeholder text
    pub content: String,
    /// 1-based, contiguous across one parse
    pub sequence_number: u32,
    pub message_type: MessageType,
    pub is_deleted: bool,
    pub has_media: bool,
}

impl ParsedMessage {
    /// Build a message whose flags agree with its type
    pub fn new(
        sequence_number: u32,
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        content: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            content: content.into(),
            sequence_number,
            message_type,
            is_deleted: message_type == MessageType::Deleted,
            has_media: message_type == MessageType::Media,
        }
    }

    /// Plain text message, mostly useful for building fixtures
    pub fn text(
        sequence_number: u32,
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(
            sequence_number,
            timestamp,
            sender,
            content,
            MessageType::Text,
        )
    }
}

/// Why a pair of adjacent messages was flagged.
///
/// Declaration order is the priority order used to pick a gap's primary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionType {
    TimeAnomaly,
    ExplicitDeletion,
    ContextMismatch,
    PatternBreak,
}

impl DetectionType {
    pub const ALL: [DetectionType; 4] = [
        DetectionType::TimeAnomaly,
        DetectionType::ExplicitDeletion,
        DetectionType::ContextMismatch,
        DetectionType::PatternBreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionType::TimeAnomaly => "time_anomaly",
            DetectionType::ExplicitDeletion => "explicit_deletion",
            DetectionType::ContextMismatch => "context_mismatch",
            DetectionType::PatternBreak => "pattern_break",
        }
    }
}

impl fmt::Display for DetectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown detection type: {}", s))
    }
}

/// Reduced view of a message flanking a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub sequence: u32,
    pub sender: String,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

impl ContextEntry {
    pub fn from_message(message: &ParsedMessage, max_chars: usize) -> Self {
        Self {
            sequence: message.sequence_number,
            sender: message.sender.clone(),
            content: truncate_chars(&message.content, max_chars).to_string(),
            timestamp: message.timestamp,
        }
    }
}

/// A suspicious discontinuity between two sequence-adjacent messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedGap {
    pub before_seq: u32,
    pub after_seq: u32,
    pub before_timestamp: NaiveDateTime,
    pub after_timestamp: NaiveDateTime,
    pub time_gap_seconds: i64,
    /// First firing check in priority order; the score may reflect several
    pub detection_type: DetectionType,
    pub suspicion_score: f64,
    pub suspicion_reasons: Vec<String>,
    pub context_before: Vec<ContextEntry>,
    pub context_after: Vec<ContextEntry>,
    #[serde(default)]
    pub estimated_missing: Option<u32>,
}

impl DetectedGap {
    /// Anchors into the context window: the last `before` entries preceding the
    /// gap and the first `after` entries following it, in transcript order.
    pub fn context_anchors(&self, before: usize, after: usize) -> Vec<ContextAnchor> {
        let skip = self.context_before.len().saturating_sub(before);
        let before_len = self.context_before.len();

        let preceding = self
            .context_before
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, entry)| ContextAnchor {
                sequence: entry.sequence,
                role: AnchorRole::BeforeGap,
                relevance: Relevance::from_distance(before_len - 1 - idx),
            });

        let following = self
            .context_after
            .iter()
            .take(after)
            .enumerate()
            .map(|(idx, entry)| ContextAnchor {
                sequence: entry.sequence,
                role: AnchorRole::AfterGap,
                relevance: Relevance::from_distance(idx),
            });

        preceding.chain(following).collect()
    }

    /// Distinct senders in the context window, in order of appearance
    pub fn window_senders(&self) -> Vec<&str> {
        let mut senders: Vec<&str> = Vec::new();
        for entry in self.context_before.iter().chain(&self.context_after) {
            if !senders.contains(&entry.sender.as_str()) {
                senders.push(entry.sender.as_str());
            }
        }
        senders
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRole {
    BeforeGap,
    AfterGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Tier by distance (in messages) from the gap edge
    pub fn from_distance(distance: usize) -> Self {
        match distance {
            0 => Relevance::High,
            1 => Relevance::Medium,
            _ => Relevance::Low,
        }
    }
}

/// Reference from a prediction back to the literal evidence behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAnchor {
    pub sequence: u32,
    pub role: AnchorRole,
    pub relevance: Relevance,
}

/// Prediction for a single gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub predicted_intent: String,
    pub predicted_content: Option<String>,
    pub predicted_sender: Option<String>,
    pub confidence_score: f64,
    pub context_anchors: Vec<ContextAnchor>,
    pub reasoning: String,
    pub backend: String,
    pub hallucination_flags: Vec<String>,
}
