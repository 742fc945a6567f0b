use anyhow::Context;
use shadowtrace_core::DetectedGap;
use shadowtrace_infer::InferenceEngine;
use std::path::Path;
use tracing::info;

use super::{format_gap, format_inference, load_settings, print_json};
use crate::export::read_jsonl;

pub fn run(gaps_file: &Path, force_mock: bool, json: bool) -> anyhow::Result<()> {
    let gaps: Vec<DetectedGap> = read_jsonl(gaps_file)
        .with_context(|| format!("failed to read gaps from {}", gaps_file.display()))?;

    let engine = InferenceEngine::from_settings(&load_settings(force_mock)?);
    info!(gaps = gaps.len(), backend = %engine.backend_info().model, "regenerating inferences");
    let results = engine.analyze_gaps(&gaps);

    if json {
        return print_json(&results);
    }

    if gaps.is_empty() {
        println!("No gaps in {}", gaps_file.display());
        return Ok(());
    }
    for (gap, result) in gaps.iter().zip(&results) {
        println!("{}\n{}\n", format_gap(gap), format_inference(result));
    }
    Ok(())
}
