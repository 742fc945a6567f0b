use chrono::Timelike;
use serde::{Deserialize, Serialize};
use shadowtrace_core::stats::mean;
use shadowtrace_core::ParsedMessage;

/// Replies slower than this are not counted as direct responses
const MAX_RESPONSE_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    pub message_count: usize,
    /// Mean length in chars over non-empty contents
    pub avg_message_length: f64,
    pub hourly_histogram: [u32; 24],
    /// Histogram mode; ties go to the earliest hour
    pub most_active_hour: u32,
    /// Hours with at least one message, ascending
    pub active_hours: Vec<u32>,
    pub avg_response_time_seconds: Option<f64>,
    pub deleted_message_count: usize,
}

impl SenderProfile {
    pub(crate) fn build(name: &str, own: &[&ParsedMessage], all: &[ParsedMessage]) -> Self {
        let lengths: Vec<f64> = own
            .iter()
            .filter(|m| !m.content.is_empty())
            .map(|m| m.content.chars().count() as f64)
            .collect();

        let mut hourly_histogram = [0u32; 24];
        for message in own {
            hourly_histogram[message.timestamp.hour() as usize] += 1;
        }

        let response_times = response_times(name, all);

        Self {
            name: name.to_string(),
            message_count: own.len(),
            avg_message_length: mean(&lengths),
            hourly_histogram,
            most_active_hour: most_active_hour(&hourly_histogram),
            active_hours: (0..24u32)
                .filter(|h| hourly_histogram[*h as usize] > 0)
                .collect(),
            avg_response_time_seconds: (!response_times.is_empty())
                .then(|| mean(&response_times)),
            deleted_message_count: own.iter().filter(|m| m.is_deleted).count(),
        }
    }
}

fn most_active_hour(histogram: &[u32; 24]) -> u32 {
    let mut best = 0usize;
    for (hour, count) in histogram.iter().enumerate() {
        if *count > histogram[best] {
            best = hour;
        }
    }
    best as u32
}

/// Seconds between another participant's message and `sender`'s reply
fn response_times(sender: &str, messages: &[ParsedMessage]) -> Vec<f64> {
    messages
        .windows(2)
        .filter(|pair| pair[1].sender == sender && pair[0].sender != sender)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds())
        .filter(|delta| (0..MAX_RESPONSE_SECS).contains(delta))
        .map(|delta| delta as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use shadowtrace_core::MessageType;

    fn ts(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn profile_of(name: &str, messages: &[ParsedMessage]) -> SenderProfile {
        let own: Vec<&ParsedMessage> = messages.iter().filter(|m| m.sender == name).collect();
        SenderProfile::build(name, &own, messages)
    }

    #[test]
    fn test_basic_profile() {
        let messages = vec![
            ParsedMessage::text(1, ts(9, 0), "A", "abcd"),
            ParsedMessage::text(2, ts(9, 5), "B", "hello"),
            ParsedMessage::text(3, ts(9, 7), "A", "ab"),
            ParsedMessage::new(4, ts(14, 0), "A", "", MessageType::Deleted),
        ];
        let profile = profile_of("A", &messages);
        assert_eq!(profile.message_count, 3);
        assert_eq!(profile.avg_message_length, 3.0);
        assert_eq!(profile.hourly_histogram[9], 2);
        assert_eq!(profile.hourly_histogram[14], 1);
        assert_eq!(profile.most_active_hour, 9);
        assert_eq!(profile.active_hours, vec![9, 14]);
        assert_eq!(profile.deleted_message_count, 1);
        // 9:05 -> 9:07 counts; 9:07 -> 14:00 is A after A
        assert_eq!(profile.avg_response_time_seconds, Some(120.0));
    }

    #[test]
    fn test_slow_replies_ignored() {
        let messages = vec![
            ParsedMessage::text(1, ts(8, 0), "A", "report?"),
            ParsedMessage::text(2, ts(10, 0), "B", "here"),
        ];
        let profile = profile_of("B", &messages);
        assert_eq!(profile.avg_response_time_seconds, None);
    }

    #[test]
    fn test_most_active_hour_tie_goes_early() {
        let messages = vec![
            ParsedMessage::text(1, ts(20, 0), "A", "late"),
            ParsedMessage::text(2, ts(20, 1), "A", "late"),
            ParsedMessage::text(3, ts(7, 0), "A", "early"),
            ParsedMessage::text(4, ts(7, 1), "A", "early"),
        ];
        assert_eq!(profile_of("A", &messages).most_active_hour, 7);
    }

    #[test]
    fn test_all_empty_contents() {
        let messages = vec![ParsedMessage::new(1, ts(9, 0), "A", "", MessageType::Deleted)];
        let profile = profile_of("A", &messages);
        assert_eq!(profile.avg_message_length, 0.0);
        assert_eq!(profile.avg_response_time_seconds, None);
    }
}
