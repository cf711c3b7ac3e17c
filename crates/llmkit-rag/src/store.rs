//! Vector Store Contract
//!
//! The interface every vector database integration implements. Concrete
//! stores (pgvector over a connection pool, Qdrant over gRPC) live outside
//! this crate; the pipeline and tests only ever see this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A single document in the vector store.
///
/// Retrieved text lives under `metadata["content"]`; stores may attach any
/// further metadata they track.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// The stored document text, if present
    pub fn content(&self) -> Option<&str> {
        self.metadata.get("content").and_then(Value::as_str)
    }
}

/// Ranked-query options.
///
/// `selector` names the embedding space to search (a collection or
/// per-backend table in real stores); stores with a single space may
/// ignore it.
#[derive(Clone, Debug)]
pub struct QueryOptions {
    pub limit: usize,
    pub selector: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            selector: None,
        }
    }
}

impl QueryOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

/// Interface implemented by vector database integrations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a document's text and embedding under a generated id.
    async fn insert_document(&self, content: &str, embedding: &[f32]) -> Result<()>;

    /// Return the documents most relevant to the query embedding, best
    /// match first.
    async fn query_relevant_documents(
        &self,
        embedding: &[f32],
        opts: &QueryOptions,
    ) -> Result<Vec<Document>>;

    /// Store an embedding and metadata under an explicit document id.
    async fn save_embeddings(
        &self,
        doc_id: &str,
        embedding: &[f32],
        metadata: Map<String, Value>,
    ) -> Result<()>;
}
