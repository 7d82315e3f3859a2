use site_wizard_core::Result;

use crate::client::{ChatMessage, CompletionClient};
use crate::prompt::{CHAT_ERROR_REPLY, CHAT_SYSTEM_PROMPT};

/// Free-form assistant conversation.
///
/// The system persona is prepended on every request and is not part of the
/// visible history.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: CompletionClient,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: CompletionClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send one user turn. Blank input is ignored and yields `Ok(None)`.
    ///
    /// On failure the apology reply is appended to the history so the
    /// conversation stays readable, and the error is returned.
    pub async fn send(&mut self, input: &str) -> Result<Option<String>> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        self.history.push(ChatMessage::user(input));

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(self.history.iter().cloned());

        match self.client.complete(&messages).await {
            Ok(reply) => {
                self.history.push(ChatMessage::assistant(reply.clone()));
                Ok(Some(reply))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.history.push(ChatMessage::assistant(CHAT_ERROR_REPLY));
                Err(e)
            }
        }
    }
}
