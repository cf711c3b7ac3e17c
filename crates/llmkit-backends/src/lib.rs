//! # llmkit-backends
//!
//! Concrete LLM backend adapters over raw HTTP, wire-compatible with the
//! providers' published chat/completion/embeddings APIs.
//!
//! ## Backends
//!
//! - **Ollama**: local inference via `/api/chat`, `/api/generate` and
//!   `/api/embeddings`
//! - **OpenAI**: chat completions and embeddings with bearer-token auth
//!
//! Both share one conversation driver: ask the model, detect tool calls,
//! execute them against the conversation's registry, feed results back, and
//! recover (exactly once) when the model hallucinates a tool that was never
//! registered.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llmkit_backends::OllamaBackend;
//! use llmkit_core::{Backend, Conversation, Role};
//!
//! let backend = OllamaBackend::new("http://localhost:11434", "qwen2.5", Duration::ZERO);
//! let mut conversation = Conversation::new();
//! conversation
//!     .add_message(Role::System, "You are an AI assistant.")
//!     .add_message(Role::User, "What's the weather in London?");
//! let response = backend.converse(&mut conversation).await?;
//! ```

pub mod config;
mod driver;
mod http;
pub mod ollama;
pub mod openai;

pub use config::{BackendKind, Settings};
pub use ollama::OllamaBackend;
pub use openai::OpenAIBackend;

// Re-export core types for convenience
pub use llmkit_core::{
    Backend, Conversation, LlmError, Message, Parameters, PromptResponse, Result, Role, Tool,
    ToolRegistry,
};
