//! Pinecone vector store implementation.
//!
//! Talks to a Pinecone index's data plane over HTTPS. The index host is the
//! per-index URL from the Pinecone console; the API key comes from
//! `PINECONE_API_KEY`.

use super::{ChunkMetadata, IndexEntry, IndexStats, ScoredMatch, SearchFilter, VectorStore};
use crate::error::{QuotientError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const API_KEY_HEADER: &str = "Api-Key";

/// Pinecone-backed vector store.
pub struct PineconeStore {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<PineconeVector>,
}

#[derive(Serialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    metadata: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: usize,
}

impl PineconeStore {
    /// Create a store reading the API key from `PINECONE_API_KEY`.
    pub fn from_env(host: &str) -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| QuotientError::Config("PINECONE_API_KEY is not set".to_string()))?;
        Self::new(api_key, host)
    }

    pub fn new(api_key: String, host: &str) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(QuotientError::Config(
                "Pinecone index host is not configured (vector_store.pinecone_host)".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(QuotientError::Config("Pinecone API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Translate a [`SearchFilter`] into Pinecone's metadata filter syntax.
    fn filter_to_json(filter: &SearchFilter) -> Option<serde_json::Value> {
        let mut map = serde_json::Map::new();

        if let Some(episodes) = &filter.episodes {
            if !episodes.is_empty() {
                map.insert("episode_number".to_string(), json!({ "$in": episodes }));
            }
        }
        if let Some(guest) = &filter.guest {
            map.insert("guest".to_string(), json!({ "$eq": guest }));
        }

        if map.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(map))
        }
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(format!("{}{}", self.host, path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(QuotientError::VectorStore(format!(
                "Pinecone request {} failed ({}): {}",
                path, status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    #[instrument(skip(self, entries))]
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let vectors = entries
            .iter()
            .map(|entry| {
                Ok(PineconeVector {
                    id: entry.id.clone(),
                    values: entry.vector.clone(),
                    metadata: serde_json::to_value(&entry.metadata)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let response: UpsertResponse = self
            .post("/vectors/upsert", &UpsertRequest { vectors })
            .await?;

        debug!("Upserted {} vectors", response.upserted_count);
        Ok(response.upserted_count)
    }

    #[instrument(skip(self, vector, filter))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredMatch>> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            include_metadata: true,
            filter: Self::filter_to_json(filter),
        };

        let response: QueryResponse = self.post("/query", &request).await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| ScoredMatch {
                id: m.id,
                score: m.score,
                metadata: ChunkMetadata::from_value(
                    m.metadata.as_ref().unwrap_or(&serde_json::Value::Null),
                ),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<IndexStats> {
        let response: StatsResponse = self.post("/describe_index_stats", &json!({})).await?;
        Ok(IndexStats {
            total_vectors: response.total_vector_count,
            dimension: response.dimension,
        })
    }

    async fn episode_count(&self) -> Result<Option<usize>> {
        // Would require a full metadata scan; Pinecone has no distinct-count.
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_translation() {
        let filter = SearchFilter {
            episodes: Some(vec![1169, 1470]),
            guest: Some("Elon Musk".to_string()),
        };
        let value = PineconeStore::filter_to_json(&filter).unwrap();
        assert_eq!(value["episode_number"]["$in"], json!([1169, 1470]));
        assert_eq!(value["guest"]["$eq"], json!("Elon Musk"));

        assert!(PineconeStore::filter_to_json(&SearchFilter::none()).is_none());

        let empty_episodes = SearchFilter {
            episodes: Some(vec![]),
            guest: None,
        };
        assert!(PineconeStore::filter_to_json(&empty_episodes).is_none());
    }

    #[test]
    fn test_host_required() {
        assert!(PineconeStore::new("key".to_string(), "").is_err());
        assert!(PineconeStore::new(String::new(), "https://idx.pinecone.io").is_err());
    }

    #[test]
    fn test_query_response_parsing() {
        let raw = r#"{
            "matches": [
                {"id": "pod-1169-ycPr5--0001", "score": 0.87,
                 "metadata": {"text": "quote", "episode_number": 1169.0,
                              "episode_title": "Elon Musk", "guest": "Elon Musk",
                              "chunk_index": 1.0, "total_chunks": 4.0}}
            ]
        }"#;
        let parsed: QueryResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.matches.len(), 1);

        let m = &parsed.matches[0];
        let metadata = ChunkMetadata::from_value(m.metadata.as_ref().unwrap());
        assert_eq!(metadata.episode_number, 1169);
        assert_eq!(metadata.guest, "Elon Musk");
    }
}
