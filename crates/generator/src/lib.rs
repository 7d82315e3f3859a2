// Site outline generation: remote completion endpoint or local skeleton

pub mod chat;
pub mod client;
pub mod local;
pub mod prompt;
pub mod remote;

use async_trait::async_trait;
use site_wizard_core::config::GenerationConfig;
use site_wizard_core::{GeneratedContent, Result};

pub use chat::ChatSession;
pub use client::{ChatMessage, CompletionClient};
pub use local::LocalGenerator;
pub use remote::RemoteGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Remote,
    Local,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Remote => write!(f, "remote"),
            Strategy::Local => write!(f, "local"),
        }
    }
}

/// Turns a free-text description into a validated draft.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn strategy(&self) -> Strategy;

    async fn generate(&self, description: &str) -> Result<GeneratedContent>;
}

/// Pick the strategy from configuration: remote when the endpoint is fully
/// configured, local when nothing is. A half-configured endpoint is an
/// error so the caller can tell the user before degrading.
pub fn generator_from_config(config: &GenerationConfig) -> Result<Box<dyn ContentGenerator>> {
    match config.endpoint()? {
        Some(endpoint) => {
            tracing::debug!(url = %endpoint.url, "Using remote generation");
            Ok(Box::new(RemoteGenerator::new(&endpoint)?))
        }
        None => {
            tracing::debug!("No generation endpoint configured, using local generation");
            Ok(Box::new(LocalGenerator))
        }
    }
}
