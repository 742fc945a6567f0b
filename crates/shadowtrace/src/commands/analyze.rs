use anyhow::Context;
use serde::Serialize;
use shadowtrace_core::{DetectedGap, InferenceResult};
use shadowtrace_infer::{BackendInfo, InferenceEngine};
use shadowtrace_parser::ParseStats;
use std::path::{Path, PathBuf};

use super::gaps::detect;
use super::profile::{build_report, ProfileReport};
use super::{format_gap, format_inference, load_settings, load_transcript, print_json};
use crate::export::export_analysis;

pub struct AnalyzeOptions {
    pub min_suspicion: f64,
    pub inference: bool,
    pub force_mock: bool,
    pub out: Option<PathBuf>,
    pub json: bool,
}

#[derive(Serialize)]
struct AnalysisReport {
    stats: ParseStats,
    profile: ProfileReport,
    gaps: Vec<DetectedGap>,
    inferences: Vec<InferenceResult>,
    backend: Option<BackendInfo>,
}

pub fn run(file: &Path, options: AnalyzeOptions) -> anyhow::Result<()> {
    let outcome = load_transcript(file)?;
    let gaps = detect(&outcome.messages, options.min_suspicion);

    let (inferences, backend) = if options.inference {
        let engine = InferenceEngine::from_settings(&load_settings(options.force_mock)?);
        (engine.analyze_gaps(&gaps), Some(engine.backend_info()))
    } else {
        (Vec::new(), None)
    };

    if let Some(dir) = &options.out {
        export_analysis(dir, &outcome.messages, &gaps, &inferences)
            .with_context(|| format!("failed to export to {}", dir.display()))?;
    }

    let report = AnalysisReport {
        stats: outcome.stats(),
        profile: build_report(&outcome.messages),
        gaps,
        inferences,
        backend,
    };

    if options.json {
        return print_json(&report);
    }

    print!("{}", super::profile::render(&report.profile));
    println!("\nGaps\n----");
    if report.gaps.is_empty() {
        println!("No suspicious gaps");
    }
    for (idx, gap) in report.gaps.iter().enumerate() {
        println!("{}", format_gap(gap));
        if let Some(result) = report.inferences.get(idx) {
            println!("{}", format_inference(result));
        }
    }
    if let Some(info) = &report.backend {
        println!(
            "\nPredictions by {} ({}){}",
            info.implementation,
            info.model,
            if info.is_mock { " - synthetic, not evidence" } else { "" }
        );
    }
    if let Some(dir) = &options.out {
        println!("Records written to {}", dir.display());
    }
    Ok(())
}
