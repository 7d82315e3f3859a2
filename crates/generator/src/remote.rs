use async_trait::async_trait;
use serde_json::Value;
use site_wizard_core::{Endpoint, Error, GeneratedContent, Result, validate_generated};

use crate::client::{ChatMessage, CompletionClient};
use crate::prompt::GENERATION_SYSTEM_PROMPT;
use crate::{ContentGenerator, Strategy};

/// Generator backed by the completion endpoint.
///
/// The assistant reply must be a JSON document matching the content model.
/// Anything else fails with [`Error::GenerationFailed`]; there is no silent
/// fallback to the local skeleton.
#[derive(Debug, Clone)]
pub struct RemoteGenerator {
    client: CompletionClient,
}

impl RemoteGenerator {
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self {
            client: CompletionClient::new(endpoint)?,
        })
    }
}

#[async_trait]
impl ContentGenerator for RemoteGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Remote
    }

    async fn generate(&self, description: &str) -> Result<GeneratedContent> {
        let messages = [
            ChatMessage::system(GENERATION_SYSTEM_PROMPT),
            ChatMessage::user(description.trim()),
        ];
        let reply = self.client.complete(&messages).await?;
        let content = parse_generated(&reply)?;

        tracing::info!(
            title = %content.title,
            pages = content.pages.len(),
            "Generated site outline"
        );
        Ok(content)
    }
}

/// Decode and validate an assistant reply.
pub fn parse_generated(reply: &str) -> Result<GeneratedContent> {
    let value: Value = serde_json::from_str(reply.trim()).map_err(|e| {
        Error::GenerationFailed(format!("Reply is not valid JSON: {}", e))
    })?;

    let content = validate_generated(&value).map_err(|e| {
        tracing::warn!(error = %e, "Generated structure rejected");
        Error::GenerationFailed(format!("Reply does not match the site structure: {}", e))
    })?;

    if content.pages.is_empty() {
        return Err(Error::GenerationFailed("Reply contains no pages".into()));
    }

    Ok(content)
}
