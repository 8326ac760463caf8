//! A thin OpenAI-compatible `LlmProvider` so `clipper-cli` can run the
//! Structure Engine, Extractor and Link Discovery's AI steps against a
//! real endpoint. The engine crates only ever see the `LlmProvider`
//! trait (§6); this is one concrete implementation of it, kept out of
//! the library crates so they stay backend-agnostic.

use async_trait::async_trait;
use clipper_intelligence::{CompletionRequest, CompletionResponse, LlmProvider, Role, Usage};
use clipper_types::{ClipperError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// An OpenAI chat-completions-compatible backend, reached over plain
/// HTTP with a bearer token. Works against any endpoint implementing
/// that wire shape (OpenAI itself, a local vLLM/Ollama gateway, etc).
pub struct HttpLlmProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    name: String,
}

impl HttpLlmProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ClipperError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            name: "http-llm".to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let messages = request
            .messages
            .iter()
            .map(|m| ChatMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                },
                content: m.content.clone(),
            })
            .collect();

        let body = ChatRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClipperError::Ai(format!("LLM request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ClipperError::Ai(format!("LLM endpoint returned {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClipperError::Ai(format!("malformed LLM response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClipperError::Ai("LLM response had no choices".to_string()))?
            .message
            .content;

        let usage = parsed.usage.unwrap_or_default();

        Ok(CompletionResponse {
            request_id: request.id,
            content,
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
            .send()
            .await
            .map_err(|e| ClipperError::Ai(format!("LLM health check failed: {e}")))?;
        Ok(())
    }
}
