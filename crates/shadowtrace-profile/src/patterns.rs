//! Activity patterns. Each detector returns `None` when its data is too thin.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use shadowtrace_core::stats::{mean, sample_stdev};
use shadowtrace_core::ParsedMessage;

const PEAK_HOURS: usize = 3;
const MIN_RHYTHM_MESSAGES: usize = 10;
const BURST_MAX_SPACING_SECS: i64 = 120;
const MIN_BURST_MESSAGES: usize = 5;
const MAX_REPORTED_BURSTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPattern {
    pub description: String,
    pub confidence: f64,
    #[serde(flatten)]
    pub detail: PatternDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern_type", rename_all = "snake_case")]
pub enum PatternDetail {
    PeakHours {
        /// Busiest first; ties go to the earlier hour
        peak_hours: Vec<u32>,
        hour_distribution: BTreeMap<u32, usize>,
    },
    DailyRhythm {
        avg_daily_messages: f64,
        daily_stdev: f64,
        total_days: usize,
    },
    ConversationBursts {
        bursts: Vec<Burst>,
    },
}

impl PatternDetail {
    pub fn pattern_type(&self) -> &'static str {
        match self {
            PatternDetail::PeakHours { .. } => "peak_hours",
            PatternDetail::DailyRhythm { .. } => "daily_rhythm",
            PatternDetail::ConversationBursts { .. } => "conversation_bursts",
        }
    }
}

/// A maximal run of rapid-fire messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub message_count: usize,
    /// In order of first appearance within the burst
    pub participants: Vec<String>,
}

impl Burst {
    fn from_run(run: &[ParsedMessage]) -> Option<Self> {
        let first = run.first()?;
        let last = run.last()?;
        let mut participants: Vec<String> = Vec::new();
        for message in run {
            if !participants.contains(&message.sender) {
                participants.push(message.sender.clone());
            }
        }
        Some(Self {
            start: first.timestamp,
            end: last.timestamp,
            message_count: run.len(),
            participants,
        })
    }
}

pub(crate) fn peak_hours(messages: &[ParsedMessage]) -> Option<ConversationPattern> {
    if messages.is_empty() {
        return None;
    }

    let mut hour_distribution: BTreeMap<u32, usize> = BTreeMap::new();
    for message in messages {
        *hour_distribution.entry(message.timestamp.hour()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(u32, usize)> = hour_distribution.iter().map(|(h, c)| (*h, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let peak_hours: Vec<u32> = ranked.into_iter().take(PEAK_HOURS).map(|(h, _)| h).collect();

    let listed: Vec<String> = peak_hours.iter().map(|h| format!("{}:00", h)).collect();
    Some(ConversationPattern {
        description: format!("Most active hours: {}", listed.join(", ")),
        confidence: 0.9,
        detail: PatternDetail::PeakHours {
            peak_hours,
            hour_distribution,
        },
    })
}

pub(crate) fn daily_rhythm(messages: &[ParsedMessage]) -> Option<ConversationPattern> {
    if messages.len() < MIN_RHYTHM_MESSAGES {
        return None;
    }

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for message in messages {
        *per_day.entry(message.timestamp.date()).or_insert(0) += 1;
    }
    let counts: Vec<f64> = per_day.values().map(|c| *c as f64).collect();
    let avg_daily_messages = mean(&counts);
    let daily_stdev = sample_stdev(&counts);

    Some(ConversationPattern {
        description: format!(
            "Average {:.1} messages/day (±{:.1})",
            avg_daily_messages, daily_stdev
        ),
        confidence: 0.85,
        detail: PatternDetail::DailyRhythm {
            avg_daily_messages,
            daily_stdev,
            total_days: per_day.len(),
        },
    })
}

pub(crate) fn conversation_bursts(messages: &[ParsedMessage]) -> Option<ConversationPattern> {
    if messages.len() < MIN_BURST_MESSAGES {
        return None;
    }

    let mut bursts: Vec<Burst> = Vec::new();
    let mut run_start = 0;
    for index in 1..=messages.len() {
        let continues = index < messages.len()
            && (messages[index].timestamp - messages[index - 1].timestamp).num_seconds()
                <= BURST_MAX_SPACING_SECS;
        if continues {
            continue;
        }
        let run = &messages[run_start..index];
        if run.len() >= MIN_BURST_MESSAGES {
            bursts.extend(Burst::from_run(run));
        }
        run_start = index;
    }

    if bursts.is_empty() {
        return None;
    }

    let description = format!("Detected {} intense conversation bursts", bursts.len());
    bursts.truncate(MAX_REPORTED_BURSTS);
    Some(ConversationPattern {
        description,
        confidence: 0.8,
        detail: PatternDetail::ConversationBursts { bursts },
    })
}
