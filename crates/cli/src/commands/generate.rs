use anyhow::{Context, Result};
use site_wizard_core::AppConfig;

use super::select_generator;

/// Generate a draft and print it as JSON without saving.
pub async fn run(config: &AppConfig, description: &str, pretty: bool) -> Result<()> {
    if description.trim().is_empty() {
        anyhow::bail!("Description is empty");
    }

    let generator = select_generator(config)?;
    tracing::info!(strategy = %generator.strategy(), "Generating site outline");

    let content = generator
        .generate(description)
        .await
        .context("Failed to generate site outline")?;

    let json = if pretty {
        serde_json::to_string_pretty(&content)?
    } else {
        serde_json::to_string(&content)?
    };
    println!("{}", json);
    Ok(())
}
