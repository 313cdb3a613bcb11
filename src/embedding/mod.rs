//! Embedding generation for indexing and retrieval.

mod cohere;
mod openai;

pub use cohere::CohereEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::Settings;
use crate::error::{QuotientError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Embedding mode for asymmetric models.
///
/// Cohere embeds queries and documents differently; retrieval quality
/// depends on using the matching mode on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    /// Embedding a search query.
    Query,
    /// Embedding documents for indexing.
    Document,
}

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of texts.
    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()], EmbedMode::Query).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| QuotientError::Embedding("Empty embedding response".to_string()))
    }

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder selected by configuration. Called once at startup;
/// the handle is shared from there (no lazily-initialized globals).
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    match settings.embedding.provider.as_str() {
        "cohere" => Ok(Arc::new(CohereEmbedder::from_env(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?)),
        "openai" => Ok(Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ))),
        other => Err(QuotientError::Config(format!(
            "Unknown embedding provider: {} (expected cohere or openai)",
            other
        ))),
    }
}
