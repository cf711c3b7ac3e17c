//! RAG Pipeline
//!
//! The straight-line composition: embed the query, fetch the closest
//! documents, and prepend their text to the query as context.

use llmkit_core::Backend;

use crate::error::Result;
use crate::store::{Document, QueryOptions, VectorStore};

/// Combine the query with retrieved document text into a single augmented
/// prompt string.
pub fn augment_query(query: &str, docs: &[Document]) -> String {
    let mut context = String::new();
    for doc in docs {
        if let Some(content) = doc.content() {
            context.push_str(content);
            context.push('\n');
        }
    }
    format!("Context: {context}\nQuery: {query}")
}

/// Embed the query with `backend`, retrieve the most relevant documents
/// from `store`, and return the augmented prompt.
pub async fn retrieve_and_augment(
    backend: &dyn Backend,
    store: &dyn VectorStore,
    query: &str,
    opts: &QueryOptions,
) -> Result<String> {
    let embedding = backend.embed(query).await?;
    let documents = store.query_relevant_documents(&embedding, opts).await?;
    tracing::debug!(retrieved = documents.len(), "augmenting query with retrieved context");
    Ok(augment_query(query, &documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    use llmkit_core::{Conversation, LlmError, PromptResponse};

    use crate::memory::MemoryVectorStore;

    fn doc(content: &str) -> Document {
        let mut metadata = Map::new();
        metadata.insert("content".into(), Value::String(content.into()));
        Document {
            id: "doc-1".into(),
            metadata,
        }
    }

    #[test]
    fn augment_query_prepends_context() {
        let docs = vec![doc("The moon landing occurred on July 20, 2023.")];
        let augmented = augment_query("When was the moon landing?", &docs);
        assert_eq!(
            augmented,
            "Context: The moon landing occurred on July 20, 2023.\n\nQuery: When was the moon landing?"
        );
    }

    #[test]
    fn augment_query_skips_documents_without_content() {
        let docs = vec![Document {
            id: "doc-2".into(),
            metadata: Map::new(),
        }];
        let augmented = augment_query("anything", &docs);
        assert_eq!(augmented, "Context: \nQuery: anything");
    }

    /// Embedding-only backend stub for pipeline tests.
    struct FixedEmbedding(Vec<f32>);

    #[async_trait]
    impl Backend for FixedEmbedding {
        async fn converse(
            &self,
            _conversation: &mut Conversation,
        ) -> llmkit_core::Result<PromptResponse> {
            Err(LlmError::Transport("not wired in tests".into()))
        }

        async fn generate(&self, _conversation: &Conversation) -> llmkit_core::Result<String> {
            Err(LlmError::Transport("not wired in tests".into()))
        }

        async fn embed(&self, _input: &str) -> llmkit_core::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn retrieve_and_augment_uses_closest_document() {
        let store = MemoryVectorStore::new();
        store
            .insert_document("Relevant fact.", &[1.0, 0.0])
            .await
            .unwrap();
        store
            .insert_document("Unrelated fact.", &[0.0, 1.0])
            .await
            .unwrap();

        let backend = FixedEmbedding(vec![1.0, 0.1]);
        let augmented = retrieve_and_augment(
            &backend,
            &store,
            "What is the fact?",
            &QueryOptions::with_limit(1),
        )
        .await
        .unwrap();

        assert_eq!(
            augmented,
            "Context: Relevant fact.\n\nQuery: What is the fact?"
        );
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        struct FailingEmbedding;

        #[async_trait]
        impl Backend for FailingEmbedding {
            async fn converse(
                &self,
                _conversation: &mut Conversation,
            ) -> llmkit_core::Result<PromptResponse> {
                unreachable!("not used")
            }

            async fn generate(&self, _conversation: &Conversation) -> llmkit_core::Result<String> {
                unreachable!("not used")
            }

            async fn embed(&self, _input: &str) -> llmkit_core::Result<Vec<f32>> {
                Err(LlmError::Http {
                    status: 503,
                    body: "overloaded".into(),
                })
            }
        }

        let store = MemoryVectorStore::new();
        let err = retrieve_and_augment(
            &FailingEmbedding,
            &store,
            "anything",
            &QueryOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            crate::error::StoreError::Backend(LlmError::Http { status: 503, .. })
        ));
    }
}
