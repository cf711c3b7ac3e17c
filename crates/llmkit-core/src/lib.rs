//! # llmkit-core
//!
//! Provider-agnostic building blocks for conversational LLM integrations:
//! the conversation model, the tool registry and the `Backend` contract.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Conversation                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │   Messages   │  │  Parameters  │  │  ToolRegistry  │  │
//! │  └──────────────┘  └──────────────┘  └────────────────┘  │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//!                    ┌────────▼────────┐
//!                    │     Backend     │  (Ollama, OpenAI, ...)
//!                    └─────────────────┘
//! ```
//!
//! The `Backend` trait enables swapping between providers without changing
//! application logic; adding a provider means adding an implementation,
//! never branching on a name inside shared code.

pub mod backend;
pub mod error;
pub mod message;
pub mod tool;

pub use backend::{Backend, FunctionCall, PromptResponse, ToolCall};
pub use error::{LlmError, Result};
pub use message::{Conversation, Message, Parameters, Role};
pub use tool::{Tool, ToolRegistry};
