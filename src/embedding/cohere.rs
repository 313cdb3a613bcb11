//! Cohere embeddings implementation.
//!
//! Talks to the Cohere `/v1/embed` endpoint. Cohere's embed models are
//! asymmetric: the `input_type` field must be `search_query` at query time
//! and `search_document` at indexing time.

use super::{EmbedMode, Embedder};
use crate::error::{QuotientError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://api.cohere.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Cohere-based embedder.
pub struct CohereEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl CohereEmbedder {
    /// Create an embedder reading the API key from `COHERE_API_KEY`.
    pub fn from_env(model: &str, dimensions: usize) -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY")
            .map_err(|_| QuotientError::Config("COHERE_API_KEY is not set".to_string()))?;
        Self::new(api_key, DEFAULT_BASE_URL, model, dimensions)
    }

    pub fn new(api_key: String, base_url: &str, model: &str, dimensions: usize) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(QuotientError::Config("Cohere API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/embed", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for CohereEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len(), mode = ?mode))]
    async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let input_type = match mode {
            EmbedMode::Query => "search_query",
            EmbedMode::Document => "search_document",
        };

        let request = EmbedRequest {
            texts,
            model: &self.model,
            input_type,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(QuotientError::Embedding(format!(
                "Cohere embed request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await?;
        if parsed.embeddings.len() != texts.len() {
            return Err(QuotientError::Embedding(format!(
                "Cohere returned {} embeddings for {} inputs",
                parsed.embeddings.len(),
                texts.len()
            )));
        }

        debug!("Generated {} embeddings", parsed.embeddings.len());
        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder =
            CohereEmbedder::new("test-key".to_string(), DEFAULT_BASE_URL, "embed-english-v3.0", 1024)
                .unwrap();
        assert_eq!(embedder.dimensions(), 1024);
        assert_eq!(embedder.endpoint, "https://api.cohere.com/v1/embed");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = CohereEmbedder::new("  ".to_string(), DEFAULT_BASE_URL, "embed-english-v3.0", 1024);
        assert!(result.is_err());
    }
}
