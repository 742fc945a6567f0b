use serde::Serialize;
use shadowtrace_core::ParsedMessage;
use shadowtrace_profile::{
    Anomaly, ConversationPattern, MetadataEngine, SenderProfile, TranscriptSummary,
};
use std::path::Path;

use super::{format_duration, load_transcript, print_json};

#[derive(Serialize)]
pub(crate) struct ProfileReport {
    pub summary: Option<TranscriptSummary>,
    pub senders: Vec<SenderProfile>,
    pub patterns: Vec<ConversationPattern>,
    pub anomalies: Vec<Anomaly>,
}

pub(crate) fn build_report(messages: &[ParsedMessage]) -> ProfileReport {
    let engine = MetadataEngine::new(messages);
    ProfileReport {
        summary: engine.get_summary(),
        senders: engine.analyze_all_senders(),
        patterns: engine.detect_activity_patterns(),
        anomalies: engine.find_anomalies(),
    }
}

fn describe_anomaly(anomaly: &Anomaly) -> String {
    match anomaly {
        Anomaly::UnusualSilence {
            before_seq,
            after_seq,
            gap_seconds,
            z_score,
            ..
        } => format!(
            "unusual silence #{} -> #{}: {} (z = {:.1})",
            before_seq,
            after_seq,
            format_duration(*gap_seconds),
            z_score
        ),
        Anomaly::BehaviorChange {
            sender,
            before,
            after,
            change_percent,
            ..
        } => format!(
            "behavior change for {}: mean length {:.0} -> {:.0} chars ({:+.0}%)",
            sender, before, after, change_percent
        ),
    }
}

pub(crate) fn render(report: &ProfileReport) -> String {
    let Some(summary) = &report.summary else {
        return "Empty transcript".to_string();
    };

    let mut out = format!(
        "Summary\n=======\n{} messages from {} participants ({} .. {})\nDeleted: {}  Media: {}\n",
        summary.total_messages,
        summary.total_participants,
        summary.date_range.start,
        summary.date_range.end,
        summary.deleted_count,
        summary.media_count
    );

    out.push_str("\nSenders\n-------\n");
    for s in &report.senders {
        let response = s
            .avg_response_time_seconds
            .map(|r| format_duration(r.round() as i64))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{}: {} messages, avg {:.1} chars, peak {}:00, reply {}, deleted {}\n",
            s.name,
            s.message_count,
            s.avg_message_length,
            s.most_active_hour,
            response,
            s.deleted_message_count
        ));
    }

    if !report.patterns.is_empty() {
        out.push_str("\nPatterns\n--------\n");
        for p in &report.patterns {
            out.push_str(&format!(
                "[{}] {} (confidence {:.2})\n",
                p.detail.pattern_type(),
                p.description,
                p.confidence
            ));
        }
    }

    if !report.anomalies.is_empty() {
        out.push_str("\nAnomalies\n---------\n");
        for a in &report.anomalies {
            out.push_str(&format!("{}\n", describe_anomaly(a)));
        }
    }

    out
}

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let outcome = load_transcript(file)?;
    let report = build_report(&outcome.messages);
    if json {
        print_json(&report)
    } else {
        print!("{}", render(&report));
        Ok(())
    }
}
