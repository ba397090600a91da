//! Groq HTTP transport
//!
//! Thin client for the Groq OpenAI-compatible `/v1/chat/completions`
//! endpoint. The wire types mirror the chat-completions contract: text or
//! multimodal messages out, a `choices[0].message.content` envelope back.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Production endpoint base. Tests point the client at a mock server via
/// [`GroqClient::with_base_url`].
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai";

/// Vision-capable model used for receipt scanning.
pub const VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Text model used for intent parsing and advice.
pub const CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Client for the Groq chat-completions API.
///
/// Holds an optional credential; every operation checks it before issuing
/// any network request and fails with [`Error::Configuration`] when absent.
#[derive(Clone)]
pub struct GroqClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GroqClient {
    /// Create a client with an explicit credential (or none).
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: GROQ_API_BASE.to_string(),
            api_key,
        }
    }

    /// Create from the `GROQ_API_KEY` environment variable.
    ///
    /// A missing variable still yields a client; the credential check
    /// happens per call so the absence surfaces as a classified error
    /// rather than a construction failure.
    pub fn from_env() -> Self {
        Self::new(std::env::var("GROQ_API_KEY").ok())
    }

    /// Point the client at a different server (mock server in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Configuration("GROQ_API_KEY is missing.".to_string()))
    }

    /// Issue a chat completion and return the assistant message content.
    ///
    /// Classified failures: missing credential → `Configuration` (before
    /// any I/O), non-2xx → `Api` with the status code and canonical reason,
    /// transport faults → `Processing`, empty envelope → `Processing`.
    pub(crate) async fn chat_completion(&self, request: &ChatCompletionRequest) -> Result<String> {
        let api_key = self.require_api_key()?;

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Processing(format!("Invalid response envelope: {}", e)))?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(Error::Processing(
                "Received empty response from Groq.".to_string(),
            ));
        }

        debug!(model = %request.model, bytes = content.len(), "groq response received");
        Ok(content)
    }
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Text-only request.
    pub(crate) fn text(model: &str, prompt: &str, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: ChatContent::Text(prompt.to_string()),
            }],
            temperature: Some(temperature),
            max_tokens,
            response_format: None,
        }
    }

    /// Multimodal request with a base64 JPEG embedded as a data URL.
    pub(crate) fn vision(model: &str, prompt: &str, image_base64: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: ChatContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", image_base64),
                        },
                    },
                ]),
            }],
            temperature: Some(0.1),
            max_tokens: None,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

/// Response-format hint (`{"type": "json_object"}`).
#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub(crate) format_type: String,
}

/// Chat message
#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub(crate) role: String,
    pub(crate) content: ChatContent,
}

/// Chat message content (text or multimodal)
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal messages
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub(crate) enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image URL for vision requests
#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub(crate) url: String,
}

/// Chat completion response envelope
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
