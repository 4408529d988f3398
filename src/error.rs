//! Error types for the `ragweave` crate.

use thiserror::Error;

/// Errors that can occur in RAG workflow operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document source reference was invalid or resolved to zero documents.
    #[error("invalid document source '{source_ref}': {message}")]
    InvalidSource {
        /// The source reference that failed to resolve.
        source_ref: String,
        /// A description of the failure.
        message: String,
    },

    /// The query text was empty or whitespace-only.
    #[error("query text is empty")]
    EmptyQuery,

    /// A query was issued before any documents were ingested.
    #[error("no index has been built; ingest documents before querying")]
    NoIndex,

    /// The generator collaborator produced no usable output.
    #[error("generation failed: {0}")]
    Generation(String),

    /// An external collaborator (embedder, generator, or loader) was unreachable.
    #[error("collaborator '{collaborator}' unavailable: {message}")]
    CollaboratorUnavailable {
        /// The collaborator that could not be reached.
        collaborator: String,
        /// A description of the failure.
        message: String,
    },

    /// A fragment violated the index's dimensionality invariant.
    #[error("index error: {0}")]
    Index(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error in workflow orchestration.
    #[error("workflow error: {0}")]
    Workflow(String),
}

/// A convenience result type for RAG workflow operations.
pub type Result<T> = std::result::Result<T, RagError>;
