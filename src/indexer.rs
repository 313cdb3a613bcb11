//! Batch indexing pipeline.
//!
//! Embeds chunk records in batches and upserts the resulting vectors into
//! the configured store. Embedding and upsert batch sizes differ because
//! the embedding API and the store have different limits.

use crate::chunking::ChunkRecord;
use crate::config::IndexingSettings;
use crate::embedding::{EmbedMode, Embedder};
use crate::error::{QuotientError, Result};
use crate::vector_store::{IndexEntry, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Drives the embed-then-upsert pipeline.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    embed_batch_size: usize,
    upsert_batch_size: usize,
    batch_delay: Duration,
    dry_run: bool,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        settings: &IndexingSettings,
    ) -> Result<Self> {
        if settings.embed_batch_size == 0 || settings.upsert_batch_size == 0 {
            return Err(QuotientError::Config(
                "Batch sizes must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            store,
            embed_batch_size: settings.embed_batch_size,
            upsert_batch_size: settings.upsert_batch_size,
            batch_delay: Duration::from_millis(settings.batch_delay_ms),
            dry_run: false,
        })
    }

    /// Skip all store writes; embedding calls still run.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Embed and upsert the given chunks. Returns the number of vectors
    /// written. A failed batch aborts the run; batches already committed
    /// stay in the store, and re-running is safe because ids are
    /// deterministic and upserts overwrite.
    #[instrument(skip(self, chunks), fields(total = chunks.len(), dry_run = self.dry_run))]
    pub async fn index_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let batch_count = chunks.len().div_ceil(self.embed_batch_size);
        info!(
            "Indexing {} chunks in {} embedding batches",
            chunks.len(),
            batch_count
        );

        let mut written = 0;
        for (batch_index, batch) in chunks.chunks(self.embed_batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts, EmbedMode::Document).await?;

            if vectors.len() != batch.len() {
                return Err(QuotientError::Embedding(format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            let entries: Vec<IndexEntry> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector))
                .collect();

            if self.dry_run {
                debug!(
                    "Dry run: skipping upsert of {} vectors (batch {}/{})",
                    entries.len(),
                    batch_index + 1,
                    batch_count
                );
            } else {
                for upsert_batch in entries.chunks(self.upsert_batch_size) {
                    written += self.store.upsert_batch(upsert_batch).await?;
                }
                debug!(
                    "Indexed batch {}/{} ({} vectors so far)",
                    batch_index + 1,
                    batch_count,
                    written
                );
            }

            // Rate limiting between embedding calls.
            if batch_index + 1 < batch_count && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        info!("Indexing complete: {} vectors written", written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{SearchFilter, SqliteVectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder producing a distinct unit vector per call order.
    struct StubEmbedder {
        calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_batch(&self, texts: &[String], _mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, _)| vec![1.0, i as f32, 0.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn chunk(index: usize) -> ChunkRecord {
        ChunkRecord {
            chunk_id: format!("pod-100-chunk-{:04}", index),
            text: format!("Chunk number {} talking about something", index),
            highlight: None,
            episode_number: 100,
            episode_title: "Test Episode".to_string(),
            guest: "Test Guest".to_string(),
            youtube_id: None,
            chunk_index: index,
            total_chunks: 10,
            token_count: 8,
        }
    }

    fn test_settings(embed: usize, upsert: usize) -> IndexingSettings {
        IndexingSettings {
            embed_batch_size: embed,
            upsert_batch_size: upsert,
            batch_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_index_chunks_writes_all() {
        let embedder = Arc::new(StubEmbedder::new());
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let indexer = Indexer::new(embedder.clone(), store.clone(), &test_settings(4, 3)).unwrap();

        let chunks: Vec<ChunkRecord> = (0..10).map(chunk).collect();
        let written = indexer.index_chunks(&chunks).await.unwrap();
        assert_eq!(written, 10);

        // 10 chunks in embed batches of 4 -> 3 calls
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_vectors, 10);
        assert_eq!(stats.dimension, 3);
    }

    #[tokio::test]
    async fn test_dry_run_skips_writes() {
        let embedder = Arc::new(StubEmbedder::new());
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let indexer = Indexer::new(embedder.clone(), store.clone(), &test_settings(4, 100))
            .unwrap()
            .dry_run(true);

        let chunks: Vec<ChunkRecord> = (0..6).map(chunk).collect();
        let written = indexer.index_chunks(&chunks).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_vectors, 0);
    }

    #[tokio::test]
    async fn test_reindex_overwrites() {
        let embedder = Arc::new(StubEmbedder::new());
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let indexer = Indexer::new(embedder, store.clone(), &test_settings(96, 100)).unwrap();

        let chunks: Vec<ChunkRecord> = (0..5).map(chunk).collect();
        indexer.index_chunks(&chunks).await.unwrap();
        indexer.index_chunks(&chunks).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_vectors, 5);

        let matches = store
            .query(&[1.0, 0.0, 0.0], 10, &SearchFilter::none())
            .await
            .unwrap();
        assert_eq!(matches.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let embedder = Arc::new(StubEmbedder::new());
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let indexer = Indexer::new(embedder.clone(), store, &test_settings(96, 100)).unwrap();

        let written = indexer.index_chunks(&[]).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder::new());
        let store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::in_memory().unwrap());
        assert!(Indexer::new(embedder, store, &test_settings(0, 100)).is_err());
    }
}
