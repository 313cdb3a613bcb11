//! Query-time retrieval.
//!
//! Validates the request, embeds the query, runs the filtered store query
//! and shapes the results for the API and CLI.

use crate::config::SearchSettings;
use crate::embedding::Embedder;
use crate::error::{QuotientError, Result};
use crate::vector_store::{ScoredMatch, SearchFilter, VectorStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// A search request, as accepted by both the HTTP API and the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Omitted means the configured `search.default_top_k`.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub episode_filter: Option<Vec<i64>>,
    #[serde(default)]
    pub guest_filter: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            episode_filter: None,
            guest_filter: None,
        }
    }
}

/// A single search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResult {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub episode_number: i64,
    pub episode_title: String,
    pub guest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Relevance score clamped to [0, 1].
    pub score: f32,
    pub chunk_id: String,
}

impl From<ScoredMatch> for QuoteResult {
    fn from(m: ScoredMatch) -> Self {
        Self {
            text: m.metadata.text,
            highlight: m.metadata.highlight,
            episode_number: m.metadata.episode_number,
            episode_title: m.metadata.episode_title,
            guest: m.metadata.guest,
            youtube_id: m.metadata.youtube_id,
            timestamp: m.metadata.timestamp,
            score: m.score.clamp(0.0, 1.0),
            chunk_id: m.id,
        }
    }
}

/// The full response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<QuoteResult>,
    pub total_results: usize,
    /// Wall-clock search time in milliseconds, rounded to two decimals.
    pub search_time_ms: f64,
}

/// Embeds queries and retrieves ranked quotes from the vector store.
pub struct QuoteSearcher {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    default_top_k: usize,
    max_top_k: usize,
    max_query_length: usize,
}

impl QuoteSearcher {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            default_top_k: settings.default_top_k,
            max_top_k: settings.max_top_k,
            max_query_length: settings.max_query_length,
        }
    }

    fn validate(&self, request: &SearchRequest, top_k: usize) -> Result<()> {
        if request.query.trim().is_empty() {
            return Err(QuotientError::InvalidInput(
                "Query must not be empty".to_string(),
            ));
        }
        if request.query.chars().count() > self.max_query_length {
            return Err(QuotientError::InvalidInput(format!(
                "Query exceeds maximum length of {} characters",
                self.max_query_length
            )));
        }
        if top_k == 0 || top_k > self.max_top_k {
            return Err(QuotientError::InvalidInput(format!(
                "top_k must be between 1 and {}",
                self.max_top_k
            )));
        }
        Ok(())
    }

    /// Run a search. An empty result set is a successful response with
    /// `total_results` of zero, not an error.
    #[instrument(skip(self, request), fields(top_k = ?request.top_k))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let top_k = request.top_k.unwrap_or(self.default_top_k);
        self.validate(request, top_k)?;

        let started = Instant::now();
        let query_vector = self.embedder.embed_query(&request.query).await?;

        let filter = SearchFilter {
            episodes: request.episode_filter.clone(),
            guest: request.guest_filter.clone(),
        };

        let matches = self.store.query(&query_vector, top_k, &filter).await?;

        let results: Vec<QuoteResult> = matches.into_iter().map(QuoteResult::from).collect();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!("Search returned {} results", results.len());

        Ok(SearchResponse {
            query: request.query.clone(),
            total_results: results.len(),
            results,
            search_time_ms: (elapsed_ms * 100.0).round() / 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbedMode;
    use crate::vector_store::{ChunkMetadata, IndexEntry, SqliteVectorStore};
    use async_trait::async_trait;

    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String], _mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.vector.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }
    }

    fn metadata(text: &str, episode: i64, guest: &str) -> ChunkMetadata {
        ChunkMetadata {
            text: text.to_string(),
            highlight: Some(text.split('.').next().unwrap_or(text).to_string()),
            episode_number: episode,
            episode_title: format!("Episode #{}", episode),
            guest: guest.to_string(),
            youtube_id: Some("ycPr5-27vSI".to_string()),
            chunk_index: 0,
            total_chunks: 1,
            timestamp: None,
        }
    }

    async fn seeded_searcher() -> QuoteSearcher {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        store
            .upsert_batch(&[
                IndexEntry {
                    id: "pod-1169-ycPr5--0000".to_string(),
                    vector: vec![1.0, 0.0, 0.0],
                    metadata: metadata("Consciousness is a strange thing.", 1169, "Elon Musk"),
                },
                IndexEntry {
                    id: "pod-1470-abc123-0000".to_string(),
                    vector: vec![0.0, 1.0, 0.0],
                    metadata: metadata("Chimps are terrifyingly strong.", 1470, "Joe Rogan"),
                },
            ])
            .await
            .unwrap();

        QuoteSearcher::new(
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0, 0.0],
            }),
            store,
            &SearchSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let searcher = seeded_searcher().await;
        let response = searcher
            .search(&SearchRequest::new("what is consciousness"))
            .await
            .unwrap();

        assert_eq!(response.total_results, 2);
        assert_eq!(response.results[0].chunk_id, "pod-1169-ycPr5--0000");
        assert!((response.results[0].score - 1.0).abs() < 0.001);
        assert!(response.results[0].score >= response.results[1].score);
        assert_eq!(response.results[0].guest, "Elon Musk");
        assert!(response.results[0].highlight.is_some());
    }

    #[tokio::test]
    async fn test_near_duplicate_vector_scores_near_one() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        store
            .upsert_batch(&[IndexEntry {
                id: "pod-1169-ycPr5--0000".to_string(),
                vector: vec![0.99, 0.1, 0.0],
                metadata: metadata("Consciousness is a strange thing.", 1169, "Elon Musk"),
            }])
            .await
            .unwrap();

        let searcher = QuoteSearcher::new(
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0, 0.0],
            }),
            store,
            &SearchSettings::default(),
        );

        let mut request = SearchRequest::new("consciousness");
        request.top_k = Some(5);
        let response = searcher.search(&request).await.unwrap();

        assert_eq!(response.total_results, 1);
        assert!(response.results[0].score > 0.95);
        assert!(response.results[0].score <= 1.0);
        assert_eq!(response.results[0].chunk_id, "pod-1169-ycPr5--0000");
    }

    #[tokio::test]
    async fn test_filters_narrow_results() {
        let searcher = seeded_searcher().await;

        let mut request = SearchRequest::new("strength");
        request.episode_filter = Some(vec![1470]);
        let response = searcher.search(&request).await.unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].episode_number, 1470);

        let mut request = SearchRequest::new("strength");
        request.guest_filter = Some("Nobody".to_string());
        let response = searcher.search(&request).await.unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_request_validation() {
        let searcher = seeded_searcher().await;

        let empty = searcher.search(&SearchRequest::new("   ")).await;
        assert!(matches!(empty, Err(QuotientError::InvalidInput(_))));

        let long_query = "x".repeat(1001);
        let too_long = searcher.search(&SearchRequest::new(long_query)).await;
        assert!(matches!(too_long, Err(QuotientError::InvalidInput(_))));

        let mut zero_k = SearchRequest::new("valid query");
        zero_k.top_k = Some(0);
        assert!(searcher.search(&zero_k).await.is_err());

        let mut over_k = SearchRequest::new("valid query");
        over_k.top_k = Some(51);
        assert!(searcher.search(&over_k).await.is_err());

        let mut min_k = SearchRequest::new("valid query");
        min_k.top_k = Some(1);
        assert!(searcher.search(&min_k).await.is_ok());

        let mut max_k = SearchRequest::new("valid query");
        max_k.top_k = Some(50);
        assert!(searcher.search(&max_k).await.is_ok());
    }

    #[test]
    fn test_request_deserialization_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "bow hunting"}"#).unwrap();
        assert_eq!(request.query, "bow hunting");
        assert!(request.top_k.is_none());
        assert!(request.episode_filter.is_none());
        assert!(request.guest_filter.is_none());

        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "bow hunting", "top_k": 25}"#).unwrap();
        assert_eq!(request.top_k, Some(25));
    }

    #[tokio::test]
    async fn test_omitted_top_k_uses_configured_default() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        store
            .upsert_batch(&[
                IndexEntry {
                    id: "pod-1169-ycPr5--0000".to_string(),
                    vector: vec![1.0, 0.0, 0.0],
                    metadata: metadata("Consciousness is a strange thing.", 1169, "Elon Musk"),
                },
                IndexEntry {
                    id: "pod-1470-abc123-0000".to_string(),
                    vector: vec![0.9, 0.1, 0.0],
                    metadata: metadata("Chimps are terrifyingly strong.", 1470, "Joe Rogan"),
                },
            ])
            .await
            .unwrap();

        let settings = SearchSettings {
            default_top_k: 1,
            ..Default::default()
        };
        let searcher = QuoteSearcher::new(
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0, 0.0],
            }),
            store,
            &settings,
        );

        // Request omits top_k; the configured default of 1 caps the results.
        let response = searcher
            .search(&SearchRequest::new("consciousness"))
            .await
            .unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].chunk_id, "pod-1169-ycPr5--0000");
    }

    #[test]
    fn test_score_clamping() {
        let result = QuoteResult::from(ScoredMatch {
            id: "pod-1-chunk-0000".to_string(),
            score: -0.4,
            metadata: metadata("Negative similarity.", 1, "Unknown"),
        });
        assert_eq!(result.score, 0.0);
    }
}
