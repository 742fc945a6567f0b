use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shadowtrace")]
#[command(version)]
#[command(about = "Gap forensics for exported chat transcripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a transcript and report what was recognised
    Parse {
        /// Exported chat transcript
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Detect suspicious gaps
    Gaps {
        file: PathBuf,

        /// Hide gaps scoring below this value
        #[arg(long, default_value_t = 0.0)]
        min_suspicion: f64,

        #[arg(long)]
        json: bool,
    },

    /// Sender profiles, activity patterns and metadata anomalies
    Profile {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Parse, detect gaps and predict their content
    Analyze {
        file: PathBuf,

        #[arg(long, default_value_t = 0.0)]
        min_suspicion: f64,

        /// Stop after gap detection
        #[arg(long)]
        no_inference: bool,

        /// Force the deterministic backend
        #[arg(long)]
        mock: bool,

        /// Write messages.jsonl, gaps.jsonl and inferences.jsonl here
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Regenerate predictions for gaps stored as JSON Lines
    Infer {
        /// A gaps.jsonl written by `analyze --out`
        gaps: PathBuf,

        #[arg(long)]
        mock: bool,

        #[arg(long)]
        json: bool,
    },

    /// Print a synthetic transcript with planted gaps
    Synth {
        #[arg(long, default_value_t = 100)]
        messages: usize,

        /// Suspicious gaps (or deleted messages with --deletions-only)
        #[arg(long, default_value_t = 5)]
        gaps: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Evenly paced two-party chat whose only anomalies are deletion markers
        #[arg(long)]
        deletions_only: bool,
    },

    /// Show which inference backend the environment selects
    Backend,

    /// Print version information
    Version,
}
