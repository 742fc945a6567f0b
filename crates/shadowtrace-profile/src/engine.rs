use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shadowtrace_core::ParsedMessage;
use tracing::debug;

use crate::anomalies::{behavior_changes, silence_anomalies, Anomaly};
use crate::patterns::{conversation_bursts, daily_rhythm, peak_hours, ConversationPattern};
use crate::sender::SenderProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Headline counts for a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub total_messages: usize,
    pub total_participants: usize,
    pub participants: Vec<String>,
    pub date_range: DateRange,
    pub deleted_count: usize,
    pub media_count: usize,
}

/// Analytics views over one message sequence.
///
/// Only the sender grouping is computed up front; every view is derived on
/// demand and never mutates the engine.
#[derive(Debug)]
pub struct MetadataEngine<'a> {
    messages: &'a [ParsedMessage],
    /// Senders in order of first appearance, each with their messages
    groups: Vec<(&'a str, Vec<&'a ParsedMessage>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> MetadataEngine<'a> {
    pub fn new(messages: &'a [ParsedMessage]) -> Self {
        let mut groups: Vec<(&'a str, Vec<&'a ParsedMessage>)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for message in messages {
            let sender = message.sender.as_str();
            let slot = *index.entry(sender).or_insert_with(|| {
                groups.push((sender, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(message);
        }

        debug!(
            messages = messages.len(),
            senders = groups.len(),
            "metadata engine ready"
        );
        Self {
            messages,
            groups,
            index,
        }
    }

    pub fn messages(&self) -> &'a [ParsedMessage] {
        self.messages
    }

    pub fn senders(&self) -> Vec<&'a str> {
        self.groups.iter().map(|(name, _)| *name).collect()
    }

    pub fn get_summary(&self) -> Option<TranscriptSummary> {
        let first = self.messages.first()?;
        let last = self.messages.last()?;

        Some(TranscriptSummary {
            total_messages: self.messages.len(),
            total_participants: self.groups.len(),
            participants: self.senders().into_iter().map(str::to_string).collect(),
            date_range: DateRange {
                start: first.timestamp,
                end: last.timestamp,
            },
            deleted_count: self.messages.iter().filter(|m| m.is_deleted).count(),
            media_count: self.messages.iter().filter(|m| m.has_media).count(),
        })
    }

    /// `None` when `sender` never wrote a message
    pub fn analyze_sender(&self, sender: &str) -> Option<SenderProfile> {
        let slot = *self.index.get(sender)?;
        let (name, own) = &self.groups[slot];
        Some(SenderProfile::build(name, own, self.messages))
    }

    pub fn analyze_all_senders(&self) -> Vec<SenderProfile> {
        self.groups
            .iter()
            .map(|(name, own)| SenderProfile::build(name, own, self.messages))
            .collect()
    }

    /// Patterns whose minimum-sample precondition holds, in fixed order:
    /// peak hours, daily rhythm, conversation bursts
    pub fn detect_activity_patterns(&self) -> Vec<ConversationPattern> {
        [
            peak_hours(self.messages),
            daily_rhythm(self.messages),
            conversation_bursts(self.messages),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn find_anomalies(&self) -> Vec<Anomaly> {
        let mut anomalies = silence_anomalies(self.messages);
        anomalies.extend(behavior_changes(&self.groups));
        anomalies
    }
}

pub fn get_summary(messages: &[ParsedMessage]) -> Option<TranscriptSummary> {
    MetadataEngine::new(messages).get_summary()
}

pub fn analyze_all_senders(messages: &[ParsedMessage]) -> Vec<SenderProfile> {
    MetadataEngine::new(messages).analyze_all_senders()
}

pub fn detect_activity_patterns(messages: &[ParsedMessage]) -> Vec<ConversationPattern> {
    MetadataEngine::new(messages).detect_activity_patterns()
}

pub fn find_anomalies(messages: &[ParsedMessage]) -> Vec<Anomaly> {
    MetadataEngine::new(messages).find_anomalies()
}
