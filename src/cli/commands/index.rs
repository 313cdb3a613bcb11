//! Index command - embed chunk files and upsert them into the vector store.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::indexer::Indexer;
use crate::transcript::load_chunk_dir;
use crate::vector_store::create_store;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(
    chunks_dir: Option<String>,
    batch_size: Option<usize>,
    dry_run: bool,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let chunks_dir = chunks_dir
        .map(|p| Settings::expand_path(&p))
        .unwrap_or_else(|| settings.chunks_dir());

    if !chunks_dir.exists() {
        anyhow::bail!("Chunks directory not found: {}", chunks_dir.display());
    }

    let mut chunks = load_chunk_dir(&chunks_dir)?;
    if let Some(limit) = limit {
        chunks.truncate(limit);
    }

    if chunks.is_empty() {
        Output::warning(&format!(
            "No chunk JSONL files found in {}",
            chunks_dir.display()
        ));
        Output::info("Run 'quotient process' first to chunk your transcripts.");
        return Ok(());
    }

    let mut indexing = settings.indexing.clone();
    if let Some(batch_size) = batch_size {
        indexing.embed_batch_size = batch_size;
    }

    let embedder = create_embedder(&settings)?;
    let store = create_store(&settings)?;
    let indexer = Indexer::new(embedder, store, &indexing)?.dry_run(dry_run);

    if dry_run {
        Output::info(&format!(
            "Dry run: embedding {} chunks without writing to the store",
            chunks.len()
        ));
    } else {
        Output::info(&format!(
            "Indexing {} chunks into '{}' ({})",
            chunks.len(),
            settings.vector_store.index_name,
            settings.vector_store.provider
        ));
    }

    let spinner = Output::spinner("Embedding and upserting...");
    let result = indexer.index_chunks(&chunks).await;
    spinner.finish_and_clear();

    match result {
        Ok(written) => {
            if dry_run {
                Output::success(&format!("Dry run complete: {} chunks embedded", chunks.len()));
            } else {
                Output::success(&format!("Indexed {} vectors", written));
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            Output::info("Committed batches are kept; re-running resumes safely.");
            Err(e.into())
        }
    }
}
