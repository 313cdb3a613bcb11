//! Vector store abstraction for Quotient.
//!
//! Provides a trait-based interface over vector database backends. The
//! backend is selected once at startup from configuration and injected into
//! the indexer and searcher.

mod pinecone;
mod sqlite;

pub use pinecone::PineconeStore;
pub use sqlite::SqliteVectorStore;

use crate::chunking::ChunkRecord;
use crate::config::Settings;
use crate::error::{QuotientError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata snapshot stored alongside each vector.
///
/// Copied from the chunk record at indexing time so search results can be
/// rendered without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub episode_number: i64,
    pub episode_title: String,
    pub guest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
    pub chunk_index: i64,
    pub total_chunks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChunkMetadata {
    /// Build metadata from an untyped JSON object, substituting documented
    /// defaults for absent fields: episode number 0, title and guest
    /// "Unknown". Remote stores return numbers as floats; both shapes are
    /// accepted.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let str_field = |key: &str, default: &str| -> String {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        let int_field = |key: &str| -> i64 {
            value
                .get(key)
                .and_then(|v| v.as_f64())
                .map(|f| f as i64)
                .unwrap_or(0)
        };
        let opt_field = |key: &str| -> Option<String> {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        Self {
            text: str_field("text", ""),
            highlight: opt_field("highlight"),
            episode_number: int_field("episode_number"),
            episode_title: str_field("episode_title", "Unknown"),
            guest: str_field("guest", "Unknown"),
            youtube_id: opt_field("youtube_id"),
            chunk_index: int_field("chunk_index"),
            total_chunks: int_field("total_chunks"),
            timestamp: opt_field("timestamp"),
        }
    }
}

impl From<&ChunkRecord> for ChunkMetadata {
    fn from(chunk: &ChunkRecord) -> Self {
        Self {
            text: chunk.text.clone(),
            highlight: chunk.highlight.clone(),
            episode_number: chunk.episode_number,
            episode_title: chunk.episode_title.clone(),
            guest: chunk.guest.clone(),
            youtube_id: chunk.youtube_id.clone(),
            chunk_index: chunk.chunk_index as i64,
            total_chunks: chunk.total_chunks as i64,
            timestamp: None,
        }
    }
}

/// The (id, vector, metadata) triple persisted in the vector store.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl IndexEntry {
    pub fn from_chunk(chunk: &ChunkRecord, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.chunk_id.clone(),
            vector,
            metadata: ChunkMetadata::from(chunk),
        }
    }
}

/// A raw similarity match returned by a store query.
///
/// `score` is the backend's native cosine similarity; normalization to
/// [0, 1] happens at the retrieval layer.
#[derive(Debug, Clone)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Metadata predicate applied during the store query, before ranking.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Restrict to these episode numbers.
    pub episodes: Option<Vec<i64>>,
    /// Restrict to entries whose guest field equals this string exactly.
    pub guest: Option<String>,
}

impl SearchFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.as_ref().map_or(true, |e| e.is_empty()) && self.guest.is_none()
    }
}

/// Summary statistics about the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_vectors: usize,
    pub dimension: usize,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert a batch of entries; existing ids are overwritten.
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// Return the top `top_k` nearest entries under the filter, most
    /// similar first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredMatch>>;

    /// Index-wide statistics.
    async fn stats(&self) -> Result<IndexStats>;

    /// Number of distinct episodes indexed, if the backend can answer it.
    async fn episode_count(&self) -> Result<Option<usize>>;
}

/// Create the vector store selected by configuration. Called once at
/// startup; the handle is shared from there.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "pinecone" => Ok(Arc::new(PineconeStore::from_env(
            &settings.vector_store.pinecone_host,
        )?)),
        other => Err(QuotientError::Config(format!(
            "Unknown vector store provider: {} (expected sqlite or pinecone)",
            other
        ))),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
