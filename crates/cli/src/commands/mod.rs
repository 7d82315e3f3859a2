pub mod chat;
pub mod generate;
pub mod projects;
pub mod wizard;

use anyhow::{Context, Result};
use site_wizard_core::{AppConfig, Error, load_config};
use site_wizard_generator::{ContentGenerator, LocalGenerator, generator_from_config};
use site_wizard_store::{ProjectStore, open_store};
use std::io::{self, Write};
use std::path::Path;

/// Config file overlaid with the process environment
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = load_config(path).context("Failed to load config file")?;
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("Invalid environment override")?;
    Ok(config)
}

/// Configured generator. A half-configured endpoint degrades to local
/// generation with a warning instead of failing the command.
pub fn select_generator(config: &AppConfig) -> Result<Box<dyn ContentGenerator>> {
    match generator_from_config(&config.generation) {
        Ok(generator) => Ok(generator),
        Err(Error::ConfigurationMissing(what)) => {
            tracing::warn!(missing = %what, "Generation endpoint incomplete, using local generation");
            eprintln!("⚠ Generation endpoint incomplete ({}), using local generation", what);
            Ok(Box::new(LocalGenerator))
        }
        Err(e) => Err(e).context("Failed to set up generation"),
    }
}

pub async fn open_project_store(config: &AppConfig) -> Result<Box<dyn ProjectStore>> {
    open_store(&config.storage)
        .await
        .context("Failed to open project storage")
}

/// Prompt and read one trimmed line. `None` at end of input.
pub fn read_input(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
