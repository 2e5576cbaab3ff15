use async_trait::async_trait;
use eyre::Result;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};
use url::Url;

use crate::config::BotConfig;
use crate::error::RemoteError;

/// Turns a single prompt into generated text.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, message: &str) -> std::result::Result<String, RemoteError>;
}

pub struct MistralClient {
    api_key: Option<String>,
    model: String,
    endpoint: Url,
    client: reqwest::Client,
}

impl MistralClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let endpoint = config.api_base.join("chat/completions")?;

        Ok(Self {
            api_key: config.mistral_api_key.clone(),
            model: config.model.clone(),
            endpoint,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl CompletionGateway for MistralClient {
    /// Sends exactly one request carrying only `message`; prior turns are not included.
    async fn complete(&self, message: &str) -> std::result::Result<String, RemoteError> {
        let api_key = self.api_key.as_deref().ok_or(RemoteError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": message
                }
            ]
        });

        debug!(
            model = %self.model,
            chars = message.chars().count(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Mistral API request failed with status {}: {}", status, body);
            return Err(RemoteError::Api { status, body });
        }

        extract_content(&body)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(body: &str) -> std::result::Result<String, RemoteError> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::Malformed("response has no choices".to_string()))?
        .message
        .content
        .unwrap_or_default();

    if content.is_empty() {
        return Err(RemoteError::Malformed("first choice has no content".to_string()));
    }

    Ok(content)
}
