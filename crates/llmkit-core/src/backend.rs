//! Backend Contract
//!
//! The provider-facing trait every LLM adapter implements, plus the
//! response types a `converse` call settles into.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::message::{Conversation, Role};

/// A function invocation resolved during a converse round: the name and
/// arguments the model asked for, and the output the tool produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// One executed tool call in a `PromptResponse`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

/// Terminal result of one `converse` call.
///
/// Either an assistant reply (`role: assistant`, `tool_calls` empty) or the
/// record of a tool round (`role: tool`, one entry per executed call). In
/// the latter case the caller invokes `converse` again to let the model turn
/// the tool outputs into a natural-language answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Interface for interacting with an LLM provider.
///
/// Implementations translate the conversation into the provider's wire
/// format, drive the single tool round trip described in the crate docs,
/// and append the protocol-required messages to the conversation.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Tool-aware chat exchange. On success the conversation has been
    /// extended by exactly the messages the provider protocol requires; an
    /// aborted attempt leaves it untouched.
    async fn converse(&self, conversation: &mut Conversation) -> Result<PromptResponse>;

    /// Single-shot text generation without tool involvement.
    async fn generate(&self, conversation: &Conversation) -> Result<String>;

    /// Produce an embedding vector for the input text.
    async fn embed(&self, input: &str) -> Result<Vec<f32>>;
}
