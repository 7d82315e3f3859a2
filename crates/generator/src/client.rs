use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use site_wizard_core::{Endpoint, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the text-completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
}

impl CompletionClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", endpoint.api_token)).map_err(|_| {
                Error::ConfigParse("API token contains characters not allowed in a header".into())
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| Error::ConfigParse(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
        })
    }

    /// Send `messages` and return `choices[0].message.content`.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(url = %self.url, messages = messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .json(&CompletionRequest { messages })
            .send()
            .await
            .map_err(|e| Error::GenerationFailed(format!("Failed to reach endpoint: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::GenerationFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::GenerationFailed(format!(
                "Endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::GenerationFailed(format!("Unexpected response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| Error::GenerationFailed("Response has no message content".into()))
    }
}
