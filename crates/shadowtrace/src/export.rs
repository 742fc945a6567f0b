//! JSON Lines export for the persistence collaborator

use serde::de::DeserializeOwned;
use serde::Serialize;
use shadowtrace_core::{DetectedGap, InferenceResult, ParsedMessage};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MESSAGES_FILE: &str = "messages.jsonl";
pub const GAPS_FILE: &str = "gaps.jsonl";
pub const INFERENCES_FILE: &str = "inferences.jsonl";

/// Replace `path` with one JSON record per line
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> std::io::Result<()> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, record)?;
        buf.push(b'\n');
    }
    atomic_write(path, &buf)
}

/// Read every well-formed record; malformed lines are logged and skipped
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> std::io::Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), line = idx + 1, error = %e, "skipping malformed record"),
        }
    }

    Ok(records)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

/// Write the three record lists of one analysis run into `dir`
pub fn export_analysis(
    dir: &Path,
    messages: &[ParsedMessage],
    gaps: &[DetectedGap],
    inferences: &[InferenceResult],
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let messages_path = dir.join(MESSAGES_FILE);
    let gaps_path = dir.join(GAPS_FILE);
    let inferences_path = dir.join(INFERENCES_FILE);

    write_jsonl(&messages_path, messages)?;
    write_jsonl(&gaps_path, gaps)?;
    write_jsonl(&inferences_path, inferences)?;

    info!(
        dir = %dir.display(),
        messages = messages.len(),
        gaps = gaps.len(),
        inferences = inferences.len(),
        "exported analysis"
    );
    Ok(vec![messages_path, gaps_path, inferences_path])
}
