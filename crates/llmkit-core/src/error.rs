//! Error Types

use thiserror::Error;

/// Result type alias for llmkit operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors surfaced by backends, the tool registry and configuration loading.
///
/// Only `ToolNotFound` carries retry semantics: a backend's `converse` call
/// re-issues the request once with tool descriptors omitted when the model
/// asks for a tool that was never registered. Every other variant is
/// terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Backend returned a non-success HTTP status
    #[error("backend returned status {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body could not be decoded into the expected shape
    #[error("failed to decode backend response: {0}")]
    Decode(String),

    /// Request body could not be serialized before sending
    #[error("failed to marshal request body: {0}")]
    Marshal(String),

    /// Connection, TLS or timeout failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// Requested tool is not present in the registry
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// A registered tool's executor failed
    #[error("tool '{tool}' failed: {cause}")]
    ToolExecution { tool: String, cause: anyhow::Error },

    /// Backend selection or credential problem
    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// True for the single error class that the converse-level retry policy
    /// recovers from.
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self, LlmError::ToolNotFound(_))
    }
}
