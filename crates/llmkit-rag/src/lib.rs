//! # llmkit-rag
//!
//! Retrieval-augmented generation support: the `VectorStore` contract that
//! real stores (pgvector, Qdrant, ...) implement, an in-memory store for
//! tests and demos, and the straight-line pipeline that turns a query plus
//! retrieved documents into an augmented prompt.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llmkit_rag::{pipeline, MemoryVectorStore, QueryOptions, VectorStore};
//!
//! let store = MemoryVectorStore::new();
//! let embedding = backend.embed(content).await?;
//! store.insert_document(content, &embedding).await?;
//!
//! let augmented = pipeline::retrieve_and_augment(
//!     backend.as_ref(),
//!     &store,
//!     "When was the moon landing?",
//!     &QueryOptions::default(),
//! ).await?;
//! ```

pub mod error;
pub mod memory;
pub mod pipeline;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryVectorStore;
pub use store::{Document, QueryOptions, VectorStore};
