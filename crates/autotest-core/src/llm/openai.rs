//! OpenAI-compatible chat completions client

use super::{ChatModel, ChatRequest, ResponseFormat};
use crate::config::AutotestConfig;
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Chat model served at `<api_base>/chat/completions`
pub struct OpenAiChatModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiChatModel {
    /// Create client
    ///
    /// # Errors
    /// [`GenerationError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        api_base: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::Transport)?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }

    /// Create client from configuration
    ///
    /// # Errors
    /// [`GenerationError::Config`] without an API key, or a client build error.
    pub fn from_config(config: &AutotestConfig) -> Result<Self, GenerationError> {
        let api_key = config.require_api_key()?;
        Self::new(
            &config.api_base,
            api_key,
            config.model.clone(),
            config.temperature,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body for a request
    #[must_use]
    pub fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "system", "content": request.system }],
        });

        if let ResponseFormat::JsonSchema { name, schema } = &request.response_format {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": { "name": name, "schema": schema, "strict": false },
            });
        }
        body
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, GenerationError> {
        tracing::debug!("POST {} (model {})", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat completion failed with status {}", status);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse =
            response.json().await.map_err(GenerationError::Transport)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
