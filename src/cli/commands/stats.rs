//! Stats command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::create_store;
use anyhow::Result;

/// Run the stats command.
pub async fn run_stats(settings: Settings) -> Result<()> {
    let store = create_store(&settings)?;

    let stats = store.stats().await?;
    let episodes = store.episode_count().await?;

    Output::header("Index Statistics");
    println!();
    Output::kv("Index", &settings.vector_store.index_name);
    Output::kv("Provider", &settings.vector_store.provider);
    Output::kv("Total vectors", &stats.total_vectors.to_string());
    Output::kv("Dimension", &stats.dimension.to_string());
    match episodes {
        Some(count) => Output::kv("Episodes", &count.to_string()),
        None => Output::kv("Episodes", "n/a"),
    }

    Ok(())
}
