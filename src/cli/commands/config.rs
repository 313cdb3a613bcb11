//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    let config_path = Settings::default_config_path();

    match action {
        ConfigAction::Show => {
            if !config_path.exists() {
                Output::info("No config file found; showing built-in defaults.");
                println!();
            }
            let rendered = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to render config: {}", e))?;
            print!("{}", rendered);
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!(
                    "Created default config at {}",
                    config_path.display()
                ));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    // Re-parse so a syntax error surfaces now, not on the
                    // next command.
                    Settings::load_from(Some(&config_path))?;
                    Output::success("Config updated.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status; config not re-checked.");
                }
                Err(e) => {
                    Output::error(&format!("Could not launch {}: {}", editor, e));
                    Output::info(&format!(
                        "Edit the file directly: {}",
                        config_path.display()
                    ));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
