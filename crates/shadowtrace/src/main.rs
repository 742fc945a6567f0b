mod cli;
mod commands;
mod export;
mod synth;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // stdout carries reports and JSON; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, json } => commands::parse::run(&file, json),
        Commands::Gaps {
            file,
            min_suspicion,
            json,
        } => commands::gaps::run(&file, min_suspicion, json),
        Commands::Profile { file, json } => commands::profile::run(&file, json),
        Commands::Analyze {
            file,
            min_suspicion,
            no_inference,
            mock,
            out,
            json,
        } => commands::analyze::run(
            &file,
            commands::analyze::AnalyzeOptions {
                min_suspicion,
                inference: !no_inference,
                force_mock: mock,
                out,
                json,
            },
        ),
        Commands::Infer { gaps, mock, json } => commands::infer::run(&gaps, mock, json),
        Commands::Synth {
            messages,
            gaps,
            seed,
            deletions_only,
        } => commands::synth::run(messages, gaps, seed, deletions_only),
        Commands::Backend => commands::backend::run(),
        Commands::Version => commands::version::run(),
    }
}
