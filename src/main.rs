//! Quotient CLI entry point.

use anyhow::Result;
use clap::Parser;
use quotient::cli::{commands, Cli, Commands};
use quotient::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("quotient={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Process {
            input,
            output,
            chunk_size,
            overlap,
        } => {
            commands::run_process(
                input.clone(),
                output.clone(),
                *chunk_size,
                *overlap,
                settings,
            )?;
        }

        Commands::Index {
            chunks_dir,
            batch_size,
            dry_run,
            limit,
        } => {
            commands::run_index(chunks_dir.clone(), *batch_size, *dry_run, *limit, settings)
                .await?;
        }

        Commands::Search {
            query,
            top_k,
            episodes,
            guest,
        } => {
            commands::run_search(query, *top_k, episodes.clone(), guest.clone(), settings).await?;
        }

        Commands::Stats => {
            commands::run_stats(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
