//! Conversation Model
//!
//! Role-based messages, generation parameters and the `Conversation` that
//! owns them together with its tool registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tool::{Tool, ToolRegistry};

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool result fed back into the conversation
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single message in a conversation.
///
/// `extra` carries provider-specific envelope data (tool-call ids and the
/// like) that must round-trip unchanged; it is flattened into the wire
/// representation next to `role` and `content`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a new message with no extra fields
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool result message
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    /// Attach a provider-specific envelope field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Flatten into the wire shape `{role, content, ...extra}`.
    ///
    /// Extra fields are written last; keys must not collide with `role` or
    /// `content` by construction.
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        map.insert("role".into(), Value::String(self.role.to_string()));
        map.insert("content".into(), Value::String(self.content.clone()));
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// Generation settings sent alongside the conversation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default)]
    pub frequency_penalty: f32,

    #[serde(default)]
    pub presence_penalty: f32,
}

fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// An ordered, append-only message log plus generation parameters and the
/// tool registry for one dialogue.
///
/// The registry is safe to share across threads; the message list is not
/// independently synchronized, so callers must not run `converse` or
/// `generate` concurrently against the same `Conversation`.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    parameters: Parameters,
    tools: ToolRegistry,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain message; chainable
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) -> &mut Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Append a message carrying provider envelope fields; chainable
    pub fn append_message(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    /// Replace the generation parameters wholesale; chainable
    pub fn set_parameters(&mut self, parameters: Parameters) -> &mut Self {
        self.parameters = parameters;
        self
    }

    /// Register a tool with this conversation's registry; chainable
    pub fn register_tool(&mut self, tool: Tool) -> &mut Self {
        self.tools.register(tool);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Flatten every message into its wire shape, in order
    pub fn wire_messages(&self) -> Vec<Value> {
        self.messages.iter().map(Message::to_wire).collect()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_builders_set_role_and_content() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.extra.is_empty());
    }

    #[test]
    fn add_message_chains() {
        let mut conversation = Conversation::new();
        conversation
            .add_message(Role::System, "You are an AI assistant.")
            .add_message(Role::User, "Hi")
            .set_parameters(Parameters {
                max_tokens: 150,
                ..Parameters::default()
            });

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.parameters().max_tokens, 150);
        assert_eq!(conversation.last().unwrap().role, Role::User);
    }

    #[test]
    fn wire_messages_flatten_extra_fields() {
        let mut conversation = Conversation::new();
        conversation.append_message(
            Message::tool("15°C").with_field("tool_call_id", json!("call_123")),
        );

        let wire = conversation.wire_messages();
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0]["role"], "tool");
        assert_eq!(wire[0]["content"], "15°C");
        assert_eq!(wire[0]["tool_call_id"], "call_123");
    }

    #[test]
    fn wire_messages_are_stable_across_calls() {
        let mut conversation = Conversation::new();
        conversation
            .add_message(Role::System, "sys")
            .add_message(Role::User, "hello");

        assert_eq!(conversation.wire_messages(), conversation.wire_messages());
    }

    #[test]
    fn parameters_defaults() {
        let params = Parameters::default();
        assert_eq!(params.max_tokens, 2048);
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn role_display_matches_wire_strings() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::Tool.to_string(), "tool");
    }
}
