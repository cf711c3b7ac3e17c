//! OpenAI Backend
//!
//! Adapter for the OpenAI chat completions and embeddings APIs. Tool-call
//! arguments arrive as JSON strings and are parsed before execution; when a
//! tool round is replayed the adapter echoes the provider's call envelope
//! (id, type, function) so the conversation stays valid for the next turn.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use llmkit_core::{Backend, Conversation, LlmError, PromptResponse, Result};

use crate::driver::{self, ChatReply, ChatRoundTrip, ToolCallRequest};
use crate::http;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";
const EMBEDDINGS_ENDPOINT: &str = "/v1/embeddings";

/// Backend for interacting with the OpenAI API.
pub struct OpenAIBackend {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend. A zero `timeout` selects the 30 second
    /// default.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            http::DEFAULT_TIMEOUT
        } else {
            timeout
        };

        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_BASE_URL.into(),
            client: Client::new(),
            timeout,
        }
    }

    /// Point the adapter at a different server (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn chat_completion(&self, body: &Value) -> Result<ResponseMessage> {
        let text = http::post_json(
            &self.client,
            &self.endpoint(CHAT_COMPLETIONS_ENDPOINT),
            body,
            self.timeout,
            Some(&self.api_key),
        )
        .await?;

        let decoded: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        decoded
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::Decode("chat completion contained no choices".into()))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    // OpenAI delivers arguments as a JSON-encoded string
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl ChatRoundTrip for OpenAIBackend {
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

        debug!(model = %self.model, disable_tools, "sending chat request to openai");
        let message = self.chat_completion(&body).await?;

        let mut tool_calls = Vec::with_capacity(message.tool_calls.len());
        for call in message.tool_calls {
            let arguments: Map<String, Value> = serde_json::from_str(&call.function.arguments)
                .map_err(|e| {
                    LlmError::Decode(format!(
                        "tool call arguments for '{}' are not a JSON object: {e}",
                        call.function.name
                    ))
                })?;
            let envelope = json!({
                "id": call.id,
                "type": "function",
                "function": {
                    "name": call.function.name,
                    "arguments": call.function.arguments,
                },
            });
            tool_calls.push(ToolCallRequest {
                id: Some(call.id),
                name: call.function.name,
                arguments,
                envelope,
            });
        }

        driver::settle_reply(
            conversation,
            ChatReply {
                content: message.content.unwrap_or_default(),
                tool_calls,
            },
        )
    }
}

#[async_trait]
impl Backend for OpenAIBackend {
    async fn converse(&self, conversation: &mut Conversation) -> Result<PromptResponse> {
        driver::drive(self, conversation).await
    }

    async fn generate(&self, conversation: &Conversation) -> Result<String> {
        let params = conversation.parameters();
        let body = json!({
            "model": self.model,
            "messages": conversation.wire_messages(),
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
        });

        debug!(model = %self.model, "sending generate request to openai");
        let message = self.chat_completion(&body).await?;
        Ok(message.content.unwrap_or_default())
    }

    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.model,
            "input": input,
        });

        let text = http::post_json(
            &self.client,
            &self.endpoint(EMBEDDINGS_ENDPOINT),
            &body,
            self.timeout,
            Some(&self.api_key),
        )
        .await?;

        let decoded: EmbeddingResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        decoded
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| LlmError::Decode("embedding response contained no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmkit_core::{Role, Tool};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WEATHER_JSON: &str = r#"{"city":"London","temperature":"15°C","conditions":"Rainy"}"#;

    fn weather_tool() -> Tool {
        Tool::new(
            "weather",
            "Get weather report for a city",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string"},
                },
                "required": ["city"],
            }),
            |args| {
                let city = args
                    .get("city")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow::anyhow!("city must be a string"))?;
                match city {
                    "London" => Ok(WEATHER_JSON.to_string()),
                    _ => Err(anyhow::anyhow!("city not found")),
                }
            },
        )
    }

    fn backend_for(server: &MockServer) -> OpenAIBackend {
        OpenAIBackend::new("test-api-key", "gpt-4o-mini", Duration::ZERO)
            .with_base_url(server.uri())
    }

    fn chat_body(message: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": message, "finish_reason": "stop"},
            ],
        })
    }

    #[tokio::test]
    async fn generate_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_ENDPOINT))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(json!({
                "role": "assistant",
                "content": "This is a test response.",
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut conversation = Conversation::new();
        conversation.add_message(Role::User, "Say something");

        let response = backend.generate(&conversation).await.unwrap();
        assert_eq!(response, "This is a test response.");
    }

    #[tokio::test]
    async fn converse_replays_tool_call_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_ENDPOINT))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {
                        "id": "call_abc123",
                        "type": "function",
                        "function": {
                            "name": "weather",
                            "arguments": "{\"city\":\"London\"}",
                        },
                    },
                ],
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut conversation = Conversation::new();
        conversation
            .add_message(Role::System, "You are an AI assistant.")
            .add_message(Role::User, "What's the weather in London?")
            .register_tool(weather_tool());

        let response = backend.converse(&mut conversation).await.unwrap();

        assert_eq!(response.role, Role::Tool);
        assert_eq!(
            response.tool_calls[0].function.result.as_deref(),
            Some(WEATHER_JSON)
        );
        assert_eq!(
            response.tool_calls[0].function.arguments["city"],
            json!("London")
        );

        // system + user + assistant envelope + tool result
        assert_eq!(conversation.len(), 4);
        let messages = conversation.messages();
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(
            messages[2].extra["tool_calls"][0]["id"],
            json!("call_abc123")
        );
        assert_eq!(
            messages[2].extra["tool_calls"][0]["function"]["arguments"],
            json!("{\"city\":\"London\"}")
        );
        assert_eq!(messages[3].role, Role::Tool);
        assert_eq!(messages[3].content, WEATHER_JSON);
        assert_eq!(messages[3].extra["tool_call_id"], json!("call_abc123"));
    }

    #[tokio::test]
    async fn converse_rejects_non_object_tool_arguments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {
                        "id": "call_abc123",
                        "type": "function",
                        "function": {"name": "weather", "arguments": "not json"},
                    },
                ],
            }))))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut conversation = Conversation::new();
        conversation
            .add_message(Role::User, "Weather?")
            .register_tool(weather_tool());
        let before = conversation.len();

        let err = backend.converse(&mut conversation).await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
        assert_eq!(conversation.len(), before);
    }

    #[tokio::test]
    async fn empty_choices_surface_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [],
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut conversation = Conversation::new();
        conversation.add_message(Role::User, "Hi");

        let err = backend.generate(&conversation).await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[tokio::test]
    async fn embed_decodes_first_embedding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBEDDINGS_ENDPOINT))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "input": "Test embedding text.",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "embedding": [0.5, 0.25], "index": 0},
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let embedding = backend.embed("Test embedding text.").await.unwrap();
        assert_eq!(embedding, vec![0.5, 0.25]);
    }

    #[tokio::test]
    async fn unauthorized_status_surfaces_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid api key"}"#),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut conversation = Conversation::new();
        conversation.add_message(Role::User, "Hi");

        let err = backend.converse(&mut conversation).await.unwrap_err();
        assert!(matches!(err, LlmError::Http { status: 401, .. }));
    }
}
