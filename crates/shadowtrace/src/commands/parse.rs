use serde::Serialize;
use shadowtrace_parser::{ParseError, ParseOutcome, ParseStats};
use std::path::Path;

use super::{load_transcript, print_json};

const SHOWN_ERRORS: usize = 5;

#[derive(Serialize)]
struct ParseReport<'a> {
    stats: ParseStats,
    participants: &'a [String],
    start: Option<String>,
    end: Option<String>,
    errors: &'a [ParseError],
}

fn build_report(outcome: &ParseOutcome) -> ParseReport<'_> {
    let range = outcome.time_range();
    ParseReport {
        stats: outcome.stats(),
        participants: &outcome.participants,
        start: range.map(|(s, _)| s.to_string()),
        end: range.map(|(_, e)| e.to_string()),
        errors: &outcome.errors,
    }
}

fn render(report: &ParseReport<'_>) -> String {
    let stats = &report.stats;
    let mut out = format!(
        "Messages:     {}\nParticipants: {} ({})\nDeleted:      {}\nMedia:        {}",
        stats.total_messages,
        stats.participants,
        report.participants.join(", "),
        stats.deleted_count,
        stats.media_count
    );
    if let (Some(start), Some(end)) = (&report.start, &report.end) {
        out.push_str(&format!("\nTime range:   {} .. {}", start, end));
    }
    if !report.errors.is_empty() {
        out.push_str(&format!("\nUnparsed lines: {}", report.errors.len()));
        for err in report.errors.iter().take(SHOWN_ERRORS) {
            out.push_str(&format!("\n  line {}: {}", err.line_number, err.raw));
        }
    }
    out
}

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let outcome = load_transcript(file)?;
    let report = build_report(&outcome);
    if json {
        print_json(&report)
    } else {
        println!("{}", render(&report));
        Ok(())
    }
}
