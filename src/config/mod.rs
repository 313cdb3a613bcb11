//! Configuration module for Quotient.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ApiSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IndexingSettings,
    SearchSettings, Settings, VectorStoreSettings,
};
