//! SQLite-based vector store implementation.
//!
//! Uses SQLite for persistence with cosine similarity computed in Rust.
//! Metadata filters are pushed into SQL so only candidate rows are scored.
//! Suitable for local indexes up to a few hundred thousand chunks; beyond
//! that, use the Pinecone backend.

use super::{
    cosine_similarity, ChunkMetadata, IndexEntry, IndexStats, ScoredMatch, SearchFilter,
    VectorStore,
};
use crate::error::{QuotientError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        highlight TEXT,
        episode_number INTEGER NOT NULL,
        episode_title TEXT NOT NULL,
        guest TEXT NOT NULL,
        youtube_id TEXT,
        chunk_index INTEGER NOT NULL,
        total_chunks INTEGER NOT NULL,
        timestamp TEXT,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_episode ON chunks(episode_number);
    CREATE INDEX IF NOT EXISTS idx_chunks_guest ON chunks(guest);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a vector store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QuotientError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to little-endian bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_candidate(row: &Row<'_>) -> rusqlite::Result<(String, ChunkMetadata, Vec<f32>)> {
        let id: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(10)?;

        let metadata = ChunkMetadata {
            text: row.get(1)?,
            highlight: row.get(2)?,
            episode_number: row.get(3)?,
            episode_title: row.get(4)?,
            guest: row.get(5)?,
            youtube_id: row.get(6)?,
            chunk_index: row.get(7)?,
            total_chunks: row.get(8)?,
            timestamp: row.get(9)?,
        };

        Ok((id, metadata, Self::bytes_to_embedding(&embedding_bytes)))
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, entries))]
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for entry in entries {
            let m = &entry.metadata;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, text, highlight, episode_number, episode_title, guest, youtube_id,
                 chunk_index, total_chunks, timestamp, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    entry.id,
                    m.text,
                    m.highlight,
                    m.episode_number,
                    m.episode_title,
                    m.guest,
                    m.youtube_id,
                    m.chunk_index,
                    m.total_chunks,
                    m.timestamp,
                    Self::embedding_to_bytes(&entry.vector),
                    Utc::now().to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} entries", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, vector, filter))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredMatch>> {
        let conn = self.lock()?;

        let mut sql = String::from(
            "SELECT id, text, highlight, episode_number, episode_title, guest, youtube_id, \
             chunk_index, total_chunks, timestamp, embedding FROM chunks",
        );

        let mut clauses: Vec<String> = Vec::new();
        if let Some(episodes) = &filter.episodes {
            if !episodes.is_empty() {
                let list = episodes
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                clauses.push(format!("episode_number IN ({})", list));
            }
        }
        if filter.guest.is_some() {
            clauses.push("guest = ?1".to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut stmt = conn.prepare(&sql)?;
        let candidates: Vec<(String, ChunkMetadata, Vec<f32>)> = match &filter.guest {
            Some(guest) => stmt
                .query_map(params![guest], Self::row_to_candidate)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], Self::row_to_candidate)?
                .filter_map(|r| r.ok())
                .collect(),
        };

        let mut results: Vec<ScoredMatch> = candidates
            .into_iter()
            .map(|(id, metadata, embedding)| ScoredMatch {
                id,
                score: cosine_similarity(vector, &embedding),
                metadata,
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<IndexStats> {
        let conn = self.lock()?;

        let total_vectors: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;

        let dimension = match conn.query_row(
            "SELECT embedding FROM chunks LIMIT 1",
            [],
            |row| row.get::<_, Vec<u8>>(0),
        ) {
            Ok(bytes) => bytes.len() / 4,
            Err(rusqlite::Error::QueryReturnedNoRows) => 0,
            Err(e) => return Err(e.into()),
        };

        Ok(IndexStats {
            total_vectors: total_vectors as usize,
            dimension,
        })
    }

    async fn episode_count(&self) -> Result<Option<usize>> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT episode_number) FROM chunks",
            [],
            |row| row.get(0),
        )?;
        Ok(Some(count as usize))
    }
}
