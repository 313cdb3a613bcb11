//! Process command - chunk transcripts into indexable quote records.

use crate::chunking::{HeuristicHighlighter, TokenChunker};
use crate::cli::Output;
use crate::config::Settings;
use crate::text::{TextNormalizer, TranscriptFormat};
use crate::tokenizer::Cl100kTokenizer;
use crate::transcript::{load_transcripts, write_chunks_jsonl};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the process command.
pub fn run_process(
    input: Option<String>,
    output: Option<String>,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let input_dir = input
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.transcripts_dir());
    let output_dir = output
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.chunks_dir());

    let chunk_size = chunk_size.unwrap_or(settings.chunking.chunk_size);
    let overlap = overlap.unwrap_or(settings.chunking.chunk_overlap);

    if !input_dir.exists() {
        anyhow::bail!("Transcript directory not found: {}", input_dir.display());
    }

    let transcripts = load_transcripts(&input_dir)?;
    if transcripts.is_empty() {
        Output::warning(&format!(
            "No transcript JSON files found in {}",
            input_dir.display()
        ));
        return Ok(());
    }

    Output::info(&format!(
        "Processing {} transcripts ({} token chunks, {} token overlap)",
        transcripts.len(),
        chunk_size,
        overlap
    ));

    let tokenizer = Cl100kTokenizer::shared()?;
    let chunker = TokenChunker::new(chunk_size, overlap, tokenizer)?;
    let normalizer = TextNormalizer::new();
    let highlighter = HeuristicHighlighter;

    let pb = Output::progress_bar(transcripts.len() as u64, "Chunking transcripts");

    let mut total_chunks = 0;
    let mut skipped = 0;
    for (path, mut transcript) in transcripts {
        pb.inc(1);

        if transcript.episode_number == 0 {
            skipped += 1;
            pb.println(format!(
                "  Skipping {} (no episode number)",
                path.display()
            ));
            continue;
        }

        let format = if transcript.source.is_empty() {
            TranscriptFormat::Plain
        } else {
            TranscriptFormat::from_path(Path::new(&transcript.source))
        };
        transcript.text = normalizer.normalize(&transcript.text, format);

        if transcript.text.chars().count() < settings.chunking.min_transcript_chars {
            skipped += 1;
            pb.println(format!(
                "  Skipping {} (shorter than {} chars)",
                path.display(),
                settings.chunking.min_transcript_chars
            ));
            continue;
        }

        let chunks = chunker.chunk_transcript(
            &transcript,
            &highlighter,
            &settings.chunking.id_prefix,
            settings.chunking.highlight_max_length,
        )?;

        let out_path = output_path(
            &output_dir,
            &settings.chunking.id_prefix,
            transcript.episode_number,
        );
        write_chunks_jsonl(&out_path, &chunks)?;
        total_chunks += chunks.len();
    }

    pb.finish_and_clear();
    Output::success(&format!(
        "Wrote {} chunks to {}",
        total_chunks,
        output_dir.display()
    ));
    if skipped > 0 {
        Output::warning(&format!("Skipped {} transcripts", skipped));
    }

    Ok(())
}

/// One chunk file per episode.
fn output_path(output_dir: &Path, prefix: &str, episode_number: i64) -> PathBuf {
    output_dir.join(format!("{}-{}-chunks.jsonl", prefix, episode_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_per_episode() {
        let path = output_path(Path::new("/tmp/chunks"), "pod", 1169);
        assert_eq!(path, PathBuf::from("/tmp/chunks/pod-1169-chunks.jsonl"));
    }
}
