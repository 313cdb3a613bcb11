//! Configuration settings for Quotient.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub indexing: IndexingSettings,
    pub vector_store: VectorStoreSettings,
    pub search: SearchSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory containing transcript JSON files.
    pub transcripts_dir: String,
    /// Directory for chunk JSONL files.
    pub chunks_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.quotient".to_string(),
            transcripts_dir: "~/.quotient/transcripts".to_string(),
            chunks_dir: "~/.quotient/chunks".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Embedding generation settings.
///
/// API keys are read from the environment (`COHERE_API_KEY` or
/// `OPENAI_API_KEY`), never from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (cohere, openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "embed-english-v3.0".to_string(),
            dimensions: 1024,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk size in tokens.
    pub chunk_size: usize,
    /// Token overlap carried between consecutive chunks.
    pub chunk_overlap: usize,
    /// Transcripts shorter than this (chars) are skipped during processing.
    pub min_transcript_chars: usize,
    /// Maximum highlight length in characters.
    pub highlight_max_length: usize,
    /// Prefix for deterministic chunk ids.
    pub id_prefix: String,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 150,
            chunk_overlap: 30,
            min_transcript_chars: 500,
            highlight_max_length: 200,
            id_prefix: "pod".to_string(),
        }
    }
}

/// Batch indexing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingSettings {
    /// Number of chunks per embedding API call.
    pub embed_batch_size: usize,
    /// Number of vectors per store upsert call.
    pub upsert_batch_size: usize,
    /// Delay between embedding batches in milliseconds (rate limiting).
    pub batch_delay_ms: u64,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            // Cohere recommends batches of 96 for embed-english-v3.0
            embed_batch_size: 96,
            upsert_batch_size: 100,
            batch_delay_ms: 100,
        }
    }
}

/// Vector store settings.
///
/// The Pinecone API key is read from `PINECONE_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, pinecone).
    pub provider: String,
    /// Logical index name, reported by the stats endpoint.
    pub index_name: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Pinecone index host URL (for pinecone provider).
    pub pinecone_host: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            index_name: "pod-quotes".to_string(),
            sqlite_path: "~/.quotient/vectors.db".to_string(),
            pinecone_host: String::new(),
        }
    }
}

/// Search request bounds and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default number of results when the request omits top_k.
    pub default_top_k: usize,
    /// Maximum allowed top_k.
    pub max_top_k: usize,
    /// Maximum query length in characters.
    pub max_query_length: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            max_top_k: 50,
            max_query_length: 1000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::QuotientError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quotient")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded transcripts directory path.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.transcripts_dir)
    }

    /// Get the expanded chunks directory path.
    pub fn chunks_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.chunks_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}
