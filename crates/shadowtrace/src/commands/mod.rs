pub mod analyze;
pub mod backend;
pub mod gaps;
pub mod infer;
pub mod parse;
pub mod profile;
pub mod synth;
pub mod version;

use anyhow::Context;
use serde::Serialize;
use shadowtrace_core::{DetectedGap, InferenceResult, Settings};
use shadowtrace_parser::ParseOutcome;
use std::path::Path;
use tracing::warn;

/// Read a transcript file and parse it. Invalid UTF-8 is replaced, a BOM is dropped.
pub(crate) fn load_transcript(path: &Path) -> anyhow::Result<ParseOutcome> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let outcome = shadowtrace_parser::parse(text.trim_start_matches('\u{feff}'));

    if outcome.messages.is_empty() {
        warn!(path = %path.display(), "no messages recognised");
    }
    Ok(outcome)
}

/// Settings from the environment; `force_mock` pins the deterministic backend
pub(crate) fn load_settings(force_mock: bool) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_env().context("invalid inference settings")?;
    if force_mock {
        settings.use_mock_ai = true;
    }
    Ok(settings)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let s = seconds.unsigned_abs();
    match (s / 3600, (s % 3600) / 60, s % 60) {
        (0, 0, secs) => format!("{}{}s", sign, secs),
        (0, mins, secs) => format!("{}{}m {}s", sign, mins, secs),
        (hours, mins, _) => format!("{}{}h {}m", sign, hours, mins),
    }
}

pub(crate) fn format_gap(gap: &DetectedGap) -> String {
    let mut out = format!(
        "#{} -> #{}  {:<17} score {:.2}  gap {}",
        gap.before_seq,
        gap.after_seq,
        gap.detection_type.as_str(),
        gap.suspicion_score,
        format_duration(gap.time_gap_seconds)
    );
    if let Some(n) = gap.estimated_missing {
        out.push_str(&format!("  ~{} missing", n));
    }
    for reason in &gap.suspicion_reasons {
        out.push_str(&format!("\n    - {}", reason));
    }
    out
}

pub(crate) fn format_inference(result: &InferenceResult) -> String {
    let anchors: Vec<String> = result
        .context_anchors
        .iter()
        .map(|a| a.sequence.to_string())
        .collect();
    format!(
        "    intent:     {}\n    content:    {}\n    sender:     {}\n    confidence: {:.2} ({})\n    anchors:    #{}\n    flags:      {}",
        result.predicted_intent,
        result.predicted_content.as_deref().unwrap_or("-"),
        result.predicted_sender.as_deref().unwrap_or("-"),
        result.confidence_score,
        result.backend,
        anchors.join(", #"),
        result.hallucination_flags.join(", ")
    )
}
