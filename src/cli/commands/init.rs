//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Quotient Setup");
    println!();
    println!("Welcome to Quotient! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API keys
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let mut missing = Vec::new();
    match settings.embedding.provider.as_str() {
        "cohere" if std::env::var("COHERE_API_KEY").is_err() => {
            missing.push(("COHERE_API_KEY", "https://dashboard.cohere.com/api-keys"));
        }
        "openai" if std::env::var("OPENAI_API_KEY").is_err() => {
            missing.push(("OPENAI_API_KEY", "https://platform.openai.com/api-keys"));
        }
        _ => {}
    }
    if settings.vector_store.provider == "pinecone" && std::env::var("PINECONE_API_KEY").is_err() {
        missing.push(("PINECONE_API_KEY", "https://app.pinecone.io"));
    }

    if missing.is_empty() {
        Output::success("All required API keys are configured!");
    } else {
        Output::warning("Some API keys are missing:");
        println!();
        for (key, url) in &missing {
            println!("  {} {} - not set", style("✗").red(), style(key).bold());
            println!("    {} Get a key from: {}", style("→").dim(), style(url).underlined());
        }
        println!();
        println!("  Set them in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        for (key, _) in &missing {
            println!("  {}", style(format!("export {}='...'", key)).green());
        }
        println!();

        if !prompt_continue("Continue without API keys?")? {
            println!();
            Output::info("Setup cancelled. Set your API keys and run 'quotient init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    for dir in [
        settings.data_dir(),
        settings.transcripts_dir(),
        settings.chunks_dir(),
    ] {
        if dir.exists() {
            Output::info(&format!("Directory exists: {}", dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created directory: {}", dir.display()));
        }
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("quotient config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!(
        "  {} Drop transcript JSON files into {}",
        style("1.").cyan(),
        settings.transcripts_dir().display()
    );
    println!("  {} Chunk them", style("quotient process").cyan());
    println!("  {} Embed and index", style("quotient index").cyan());
    println!("  {} Search your quotes", style("quotient search \"<query>\"").cyan());
    println!();
    println!("For more help: {}", style("quotient --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
