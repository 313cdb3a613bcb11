//! CLI module for Quotient.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Quotient - Semantic Quote Search for Podcasts
///
/// Chunks podcast transcripts, embeds them, and serves semantic search over
/// the result. Search by meaning, not keywords.
#[derive(Parser, Debug)]
#[command(name = "quotient")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Quotient and verify configuration
    Init,

    /// Chunk transcript files into indexable quote records
    Process {
        /// Directory of transcript JSON files (defaults to configured dir)
        #[arg(short, long)]
        input: Option<String>,

        /// Output directory for chunk JSONL files (defaults to configured dir)
        #[arg(short, long)]
        output: Option<String>,

        /// Target chunk size in tokens
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Token overlap between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Embed chunk files and upsert them into the vector store
    Index {
        /// Directory of chunk JSONL files (defaults to configured dir)
        #[arg(long)]
        chunks_dir: Option<String>,

        /// Chunks per embedding API call
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Embed but skip all store writes
        #[arg(long)]
        dry_run: bool,

        /// Only index the first N chunks
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search indexed quotes by meaning
    Search {
        /// Search query
        query: String,

        /// Number of results to return (defaults to the configured value)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Restrict to these episode numbers (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        episodes: Option<Vec<i64>>,

        /// Restrict to this guest (exact name)
        #[arg(short, long)]
        guest: Option<String>,
    },

    /// Show index statistics
    Stats,

    /// Start the HTTP search API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
