use shadowtrace_core::{DetectedGap, ParsedMessage};
use shadowtrace_gaps::{detect_all, filter_by_suspicion};
use std::path::Path;
use tracing::info;

use super::{format_gap, load_transcript, print_json};

pub(crate) fn detect(messages: &[ParsedMessage], min_suspicion: f64) -> Vec<DetectedGap> {
    let all = detect_all(messages);
    let total = all.len();
    let kept = filter_by_suspicion(all, min_suspicion);
    info!(total, kept = kept.len(), min_suspicion, "gap detection");
    kept
}

pub fn run(file: &Path, min_suspicion: f64, json: bool) -> anyhow::Result<()> {
    let outcome = load_transcript(file)?;
    let gaps = detect(&outcome.messages, min_suspicion);

    if json {
        return print_json(&gaps);
    }

    if gaps.is_empty() {
        println!("No suspicious gaps in {} messages", outcome.messages.len());
        return Ok(());
    }
    println!("{} suspicious gap(s) in {} messages\n", gaps.len(), outcome.messages.len());
    for gap in &gaps {
        println!("{}", format_gap(gap));
    }
    Ok(())
}
