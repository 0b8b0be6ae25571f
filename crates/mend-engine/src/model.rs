//! The external language-model seam.
//!
//! The resolver only needs a prompt-in, text-out call with a deadline.
//! `HttpModelClient` speaks an OpenAI-style chat-completions endpoint;
//! anything else can implement `ModelClient` instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model transport error: {0}")]
    Network(String),

    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model returned an unusable response: {0}")]
    Malformed(String),
}

/// A blocking chat call to an external model, bounded by `timeout`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client over HTTP. The API key is read from the
/// environment variable named in the config; requests without one are sent
/// unauthenticated (local endpoints).
pub struct HttpModelClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl HttpModelClient {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: std::env::var(&config.api_key_env).ok(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body);
            return Err(ModelError::Api { status, message });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::Malformed("response carried no message content".into()))
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn chat(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        match tokio::time::timeout(timeout, self.send(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(timeout)),
        }
    }
}
