use anyhow::{Context, Result};
use site_wizard_core::AppConfig;
use site_wizard_generator::prompt::CHAT_ERROR_REPLY;
use site_wizard_generator::{ChatSession, CompletionClient};

use super::read_input;

/// Free-form conversation with the assistant. Needs a configured endpoint.
pub async fn run(config: &AppConfig) -> Result<()> {
    let endpoint = config
        .generation
        .endpoint()
        .context("Generation endpoint is misconfigured")?
        .context("Chat needs a generation endpoint: set base_url and api_token in the config file")?;

    let client = CompletionClient::new(&endpoint).context("Failed to create HTTP client")?;
    let mut chat = ChatSession::new(client);

    println!("💬 Chat with the site assistant. Empty line or 'quit' to leave.");
    println!();

    loop {
        let Some(line) = read_input("> ")? else {
            break;
        };
        if line.is_empty() || line == "quit" {
            break;
        }

        match chat.send(&line).await {
            Ok(Some(reply)) => println!("{}\n", reply),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Chat turn failed");
                println!("{}\n", CHAT_ERROR_REPLY);
            }
        }
    }

    tracing::debug!(turns = chat.history().len(), "Chat ended");
    Ok(())
}
