//! Transcript and chunk file formats.
//!
//! Transcripts arrive as one JSON object per file; chunk batches are written
//! as JSON-lines, one [`ChunkRecord`](crate::chunking::ChunkRecord) per line.
//! These files are the contract between the processing and indexing stages.

use crate::chunking::ChunkRecord;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A raw transcript with its identifying episode attributes.
///
/// Immutable once ingested; `episode_number` is 0 when unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    #[serde(default)]
    pub episode_number: i64,
    #[serde(default = "unknown")]
    pub title: String,
    #[serde(default = "unknown")]
    pub guest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
    /// Origin of the text, e.g. the source file name. Its extension decides
    /// which subtitle format the normalizer assumes.
    #[serde(default)]
    pub source: String,
    pub text: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl Transcript {
    /// Read a transcript from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the transcript as a JSON file.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Load all transcript JSON files from a directory, sorted by file name.
///
/// Unreadable or malformed files are logged and skipped; they never abort
/// the ingestion run.
pub fn load_transcripts(dir: &Path) -> Result<Vec<(PathBuf, Transcript)>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut transcripts = Vec::new();
    for path in paths {
        match Transcript::from_json_file(&path) {
            Ok(t) => transcripts.push((path, t)),
            Err(e) => warn!("Skipping unreadable transcript {:?}: {}", path, e),
        }
    }
    Ok(transcripts)
}

/// Write chunk records to a JSONL file, one record per line.
pub fn write_chunks_jsonl(path: &Path, chunks: &[ChunkRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    for chunk in chunks {
        let line = serde_json::to_string(chunk)?;
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// Read chunk records from a JSONL file, skipping blank lines.
pub fn read_chunks_jsonl(path: &Path) -> Result<Vec<ChunkRecord>> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut chunks = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        chunks.push(serde_json::from_str(&line)?);
    }
    Ok(chunks)
}

/// Load all chunk records from every `*.jsonl` file in a directory, sorted
/// by file name.
pub fn load_chunk_dir(dir: &Path) -> Result<Vec<ChunkRecord>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jsonl"))
        .collect();
    paths.sort();

    let mut all_chunks = Vec::new();
    for path in paths {
        all_chunks.extend(read_chunks_jsonl(&path)?);
    }
    Ok(all_chunks)
}
