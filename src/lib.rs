//! Quotient - Podcast Quote Search
//!
//! A CLI tool and HTTP service for semantic search over podcast transcripts.
//!
//! # Overview
//!
//! Quotient allows you to:
//! - Convert raw podcast transcripts (plain text, SRT, VTT) into clean prose
//! - Split transcripts into token-bounded, overlapping chunks with highlights
//! - Embed and index the chunks in a vector database
//! - Search the index semantically and get ranked, metadata-rich quotes
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `text` - Subtitle normalization and sentence segmentation
//! - `tokenizer` - Token counting and encoding
//! - `chunking` - Token-bounded chunking and highlight extraction
//! - `transcript` - Transcript and chunk file formats
//! - `embedding` - Embedding generation backends
//! - `vector_store` - Vector database backends
//! - `indexer` - Batch embedding and upserting
//! - `search` - Query validation, retrieval, and ranking
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quotient::config::Settings;
//! use quotient::embedding::create_embedder;
//! use quotient::search::{QuoteSearcher, SearchRequest};
//! use quotient::vector_store::create_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let embedder = create_embedder(&settings)?;
//!     let store = create_store(&settings)?;
//!     let searcher = QuoteSearcher::new(embedder, store, &settings.search);
//!
//!     let response = searcher
//!         .search(&SearchRequest::new("the nature of consciousness"))
//!         .await?;
//!     println!("{} results", response.total_results);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod search;
pub mod text;
pub mod tokenizer;
pub mod transcript;
pub mod vector_store;

pub use error::{QuotientError, Result};
