//! Error Types

use thiserror::Error;

use llmkit_core::LlmError;

/// Result type alias for vector-store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Vector-store and pipeline error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Embedding length does not match the store's dimension
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    /// Store-specific failure (connection, query, upsert)
    #[error("vector store error: {0}")]
    Store(String),

    /// Failure from the embedding backend
    #[error(transparent)]
    Backend(#[from] LlmError),
}
