//! HTTP API server for quote search.
//!
//! REST endpoints mirror the CLI: semantic search, health, and index stats.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{create_embedder, EmbedMode, Embedder};
use crate::error::QuotientError;
use crate::search::{QuoteSearcher, SearchRequest};
use crate::vector_store::{create_store, VectorStore};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    searcher: QuoteSearcher,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.api.host.clone());
    let port = port.unwrap_or(settings.api.port);

    let embedder = create_embedder(&settings)?;
    let store = create_store(&settings)?;
    let searcher = QuoteSearcher::new(embedder.clone(), store.clone(), &settings.search);

    let state = Arc::new(AppState {
        searcher,
        embedder,
        store,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/search", post(search))
        .route("/api/stats", get(stats))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Quotient API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Search", "POST /api/search");
    Output::kv("Stats", "GET  /api/stats");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Response Types ===

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    vector_store_connected: bool,
    embedder_connected: bool,
}

#[derive(Serialize)]
struct StatsResponse {
    index_name: String,
    total_vectors: usize,
    index_dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_episodes: Option<usize>,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
}

impl ErrorResponse {
    fn internal(detail: String) -> Self {
        Self {
            detail,
            error_code: None,
        }
    }
}

/// Map a search-path error to an HTTP status. Validation failures are the
/// caller's fault; everything else is a backend problem.
fn error_status(error: &QuotientError) -> (StatusCode, Option<&'static str>) {
    match error {
        QuotientError::InvalidInput(_) => (StatusCode::BAD_REQUEST, Some("validation_error")),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
    }
}

/// Probe both backends with real calls. Each probe is caught individually
/// so one failing dependency degrades the report instead of turning it into
/// a 500.
async fn probe_health(store: &dyn VectorStore, embedder: &dyn Embedder) -> HealthResponse {
    let vector_store_connected = store.stats().await.is_ok();
    let embedder_connected = embedder
        .embed_batch(&["ping".to_string()], EmbedMode::Query)
        .await
        .is_ok();

    let status = if vector_store_connected && embedder_connected {
        "healthy"
    } else {
        "degraded"
    };

    HealthResponse {
        status,
        vector_store_connected,
        embedder_connected,
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(probe_health(state.store.as_ref(), state.embedder.as_ref()).await)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    match state.searcher.search(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let (status, error_code) = error_status(&e);
            (
                status,
                Json(ErrorResponse {
                    detail: e.to_string(),
                    error_code,
                }),
            )
                .into_response()
        }
    }
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let index_stats = match state.store.stats().await {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(e.to_string())),
            )
                .into_response()
        }
    };

    let total_episodes = state.store.episode_count().await.unwrap_or(None);

    Json(StatsResponse {
        index_name: state.settings.vector_store.index_name.clone(),
        total_vectors: index_stats.total_vectors,
        index_dimension: index_stats.dimension,
        total_episodes,
    })
    .into_response()
}
