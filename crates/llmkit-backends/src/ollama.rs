//! Ollama Backend
//!
//! Adapter for a local Ollama server, wire-compatible with `/api/chat`,
//! `/api/generate` and `/api/embeddings`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use llmkit_core::{Backend, Conversation, LlmError, PromptResponse, Result};

use crate::driver::{self, ChatReply, ChatRoundTrip, ToolCallRequest};
use crate::http;

const CHAT_ENDPOINT: &str = "/api/chat";
const GENERATE_ENDPOINT: &str = "/api/generate";
const EMBEDDINGS_ENDPOINT: &str = "/api/embeddings";

/// Backend for interacting with the Ollama API.
pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: Client,
    timeout: Duration,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    ///
    /// `base_url` is the full server URL (e.g. `http://localhost:11434`).
    /// A zero `timeout` selects the 30 second default.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            http::DEFAULT_TIMEOUT
        } else {
            timeout
        };

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: Client::new(),
            timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    // Ollama delivers arguments as a JSON object, not a string
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[async_trait]
impl ChatRoundTrip for OllamaBackend {
    async fn chat_round_trip(
        &self,
        conversation: &mut Conversation,
        disable_tools: bool,
    ) -> Result<PromptResponse> {
        let mut body = json!({
            "model": self.model,
            "messages": conversation.wire_messages(),
            "stream": false,
        });
        if !disable_tools && !conversation.tools().is_empty() {
            body["tools"] = Value::Array(conversation.tools().describe());
        }

        debug!(model = %self.model, disable_tools, "sending chat request to ollama");
        let text = http::post_json(
            &self.client,
            &self.endpoint(CHAT_ENDPOINT),
            &body,
            self.timeout,
            None,
        )
        .await?;

        let decoded: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;

        let tool_calls = decoded
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                let WireFunctionCall { name, arguments } = call.function;
                let envelope = json!({
                    "function": {"name": name, "arguments": Value::Object(arguments.clone())},
                });
                ToolCallRequest {
                    id: None,
                    name,
                    arguments,
                    envelope,
                }
            })
            .collect();

        driver::settle_reply(
            conversation,
            ChatReply {
                content: decoded.message.content,
                tool_calls,
            },
        )
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn converse(&self, conversation: &mut Conversation) -> Result<PromptResponse> {
        driver::drive(self, conversation).await
    }

    async fn generate(&self, conversation: &Conversation) -> Result<String> {
        // The generate endpoint takes a single prompt string, so the
        // conversation is collapsed into "role: content" lines.
        let mut prompt_text = String::new();
        for message in conversation.messages() {
            prompt_text.push_str(&message.role.to_string());
            prompt_text.push_str(": ");
            prompt_text.push_str(&message.content);
            prompt_text.push('\n');
        }

        let params = conversation.parameters();
        let body = json!({
            "model": self.model,
            "prompt": prompt_text,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
            "stream": false,
        });

        debug!(model = %self.model, "sending generate request to ollama");
        let text = http::post_json(
            &self.client,
            &self.endpoint(GENERATE_ENDPOINT),
            &body,
            self.timeout,
            None,
        )
        .await?;

        let decoded: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        Ok(decoded.response)
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.model,
            "prompt": input,
        });

        let text = http::post_json(
            &self.client,
            &self.endpoint(EMBEDDINGS_ENDPOINT),
            &body,
            self.timeout,
            None,
        )
        .await?;

        let decoded: EmbeddingResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        Ok(decoded.embedding)
    }
}
