//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::create_embedder;
use crate::search::{QuoteSearcher, SearchRequest};
use crate::vector_store::create_store;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    top_k: Option<usize>,
    episodes: Option<Vec<i64>>,
    guest: Option<String>,
    settings: Settings,
) -> Result<()> {
    let embedder = create_embedder(&settings)?;
    let store = create_store(&settings)?;
    let searcher = QuoteSearcher::new(embedder, store, &settings.search);

    let request = SearchRequest {
        query: query.to_string(),
        top_k,
        episode_filter: episodes,
        guest_filter: guest,
    };

    let spinner = Output::spinner("Searching...");
    let result = searcher.search(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            if response.results.is_empty() {
                Output::warning("No quotes found matching your query.");
            } else {
                Output::success(&format!(
                    "Found {} quotes in {:.0}ms",
                    response.total_results, response.search_time_ms
                ));

                for quote in &response.results {
                    Output::quote_result(
                        &quote.episode_title,
                        &quote.guest,
                        quote.episode_number,
                        quote.score,
                        &quote.text,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
