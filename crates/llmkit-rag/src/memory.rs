//! In-Memory Vector Store
//!
//! Cosine-ranked store backed by a plain `Vec`, for tests and demos. The
//! dimension is fixed by the first write; later writes and queries must
//! match it. There is a single embedding space, so `QueryOptions::selector`
//! is ignored.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{Document, QueryOptions, VectorStore};

struct Entry {
    id: String,
    embedding: Vec<f32>,
    metadata: Map<String, Value>,
}

#[derive(Default)]
struct Inner {
    dimension: Option<usize>,
    entries: Vec<Entry>,
}

/// In-memory cosine-similarity vector store
#[derive(Default)]
pub struct MemoryVectorStore {
    inner: Mutex<Inner>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

fn check_dimension(inner: &mut Inner, got: usize) -> Result<()> {
    match inner.dimension {
        Some(expected) if expected != got => Err(StoreError::Dimension { expected, got }),
        Some(_) => Ok(()),
        None => {
            inner.dimension = Some(got);
            Ok(())
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_document(&self, content: &str, embedding: &[f32]) -> Result<()> {
        let doc_id = format!("doc-{}", Uuid::new_v4());
        let mut metadata = Map::new();
        metadata.insert("content".into(), Value::String(content.to_string()));
        self.save_embeddings(&doc_id, embedding, metadata).await
    }

    async fn query_relevant_documents(
        &self,
        embedding: &[f32],
        opts: &QueryOptions,
    ) -> Result<Vec<Document>> {
        let inner = self.lock();
        if let Some(expected) = inner.dimension {
            if expected != embedding.len() {
                return Err(StoreError::Dimension {
                    expected,
                    got: embedding.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &Entry)> = inner
            .entries
            .iter()
            .map(|entry| (cosine_similarity(embedding, &entry.embedding), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(opts.limit)
            .map(|(_, entry)| Document {
                id: entry.id.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect())
    }

    async fn save_embeddings(
        &self,
        doc_id: &str,
        embedding: &[f32],
        metadata: Map<String, Value>,
    ) -> Result<()> {
        let mut inner = self.lock();
        check_dimension(&mut inner, embedding.len())?;

        tracing::debug!(doc_id = %doc_id, "storing embedding");
        inner.entries.push(Entry {
            id: doc_id.to_string(),
            embedding: embedding.to_vec(),
            metadata,
        });
        Ok(())
    }
}
