//! Transcript parser: raw export text to an ordered message sequence

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shadowtrace_core::{MessageType, ParsedMessage};
use tracing::debug;

use crate::classify::classify_content;
use crate::grammar::match_line;

/// A line that matched no grammar while no message was open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub line_number: usize,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_messages: usize,
    pub participants: usize,
    pub deleted_count: usize,
    pub media_count: usize,
    pub parse_errors: usize,
}

/// Everything one parse produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub messages: Vec<ParsedMessage>,
    /// Distinct senders in order of first appearance
    pub participants: Vec<String>,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    /// First and last timestamps, or `None` for an empty transcript
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.messages.first()?;
        let last = self.messages.last()?;
        Some((first.timestamp, last.timestamp))
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            total_messages: self.messages.len(),
            participants: self.participants.len(),
            deleted_count: self.messages.iter().filter(|m| m.is_deleted).count(),
            media_count: self.messages.iter().filter(|m| m.has_media).count(),
            parse_errors: self.errors.len(),
        }
    }
}

/// Message still collecting continuation lines
struct OpenMessage {
    timestamp: NaiveDateTime,
    sender: String,
    content: String,
    message_type: MessageType,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptParser;

impl TranscriptParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut open: Option<OpenMessage> = None;

        for (idx, line) in text.trim().split('\n').enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match match_line(line) {
                Some(m) => {
                    if let Some(prev) = open.take() {
                        flush(&mut outcome, prev);
                    }
                    if !outcome.participants.iter().any(|p| p == m.sender) {
                        outcome.participants.push(m.sender.to_string());
                    }
                    open = Some(OpenMessage {
                        timestamp: m.timestamp,
                        sender: m.sender.to_string(),
                        content: m.content.to_string(),
                        message_type: classify_content(m.content),
                    });
                }
                None => match open.as_mut() {
                    Some(current) => {
                        current.content.push('\n');
                        current.content.push_str(line);
                    }
                    None => outcome.errors.push(ParseError {
                        line_number: idx + 1,
                        raw: line.to_string(),
                    }),
                },
            }
        }

        if let Some(prev) = open.take() {
            flush(&mut outcome, prev);
        }

        debug!(
            messages = outcome.messages.len(),
            participants = outcome.participants.len(),
            errors = outcome.errors.len(),
            "parsed transcript"
        );
        outcome
    }
}

fn flush(outcome: &mut ParseOutcome, open: OpenMessage) {
    let sequence_number = outcome.messages.len() as u32 + 1;
    outcome.messages.push(ParsedMessage::new(
        sequence_number,
        open.timestamp,
        open.sender,
        open.content,
        open.message_type,
    ));
}

/// Parse with the default grammar set
pub fn parse(text: &str) -> ParseOutcome {
    TranscriptParser::new().parse(text)
}
