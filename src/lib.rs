//! # ragweave
//!
//! An event-driven retrieval-augmented generation (RAG) workflow: ingest a
//! corpus of documents into an in-memory vector index, then answer
//! natural-language queries by retrieving the most relevant fragments and
//! synthesizing an answer over them with a language model.
//!
//! The workflow runs as three discrete, event-triggered steps with
//! explicit data contracts between them:
//!
//! - **Ingestion** — load documents, split them into fragments, embed each
//!   fragment, and build a fresh [`VectorIndex`] (swapped in atomically).
//! - **Retrieval** — embed the query and fetch the top-k fragments by
//!   cosine similarity, preserving score order.
//! - **Synthesis** — build the answer incrementally ("compact-and-refine"):
//!   the first fragment seeds an initial answer, each further fragment
//!   refines it, and the final generation can stream token increments.
//!
//! Model access is injected, never ambient: the embedding backend, the
//! language model, and the document source are collaborators passed in as
//! trait objects at construction ([`Embedder`], [`Generator`],
//! [`DocumentLoader`]). The optional `ollama` feature provides reference
//! adapters for a local [Ollama](https://ollama.com) endpoint.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragweave::{RagWorkflow, StaticLoader, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() -> ragweave::Result<()> {
//!     let workflow = RagWorkflow::builder()
//!         .config(WorkflowConfig::builder().top_k(2).build()?)
//!         .loader(Arc::new(StaticLoader::new().with_source("corpus", documents)))
//!         .embedder(Arc::new(my_embedder))
//!         .generator(Arc::new(my_generator))
//!         .build()?;
//!
//!     workflow.ingest_documents("corpus").await?;
//!     let answer = workflow.query("What is Mars?").await?;
//!     println!("{}", answer.text().await?);
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod index;
pub mod ingest;
pub mod loader;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod retrieve;
pub mod synthesize;
pub mod workflow;

pub use chunking::{Chunker, FixedSizeChunker, ParagraphChunker};
pub use config::{WorkflowConfig, WorkflowConfigBuilder};
pub use document::{Document, Fragment, RetrievalResult, ScoredFragment};
pub use embedding::Embedder;
pub use error::{RagError, Result};
pub use generator::{Answer, Generator, TokenStream};
pub use index::VectorIndex;
pub use loader::{DocumentLoader, StaticLoader};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaEmbedder, OllamaGenerator};
pub use workflow::{
    IndexSummary, RagWorkflow, RagWorkflowBuilder, RunOutcome, StartEvent, WorkflowEvent,
};
