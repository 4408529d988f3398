//! Document loader trait and an in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::{RagError, Result};

/// A collaborator that resolves a source reference to a set of documents.
///
/// How the reference is interpreted (directory path, bucket name, dataset
/// id) is up to the implementation; the workflow only sees the resulting
/// documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load all documents behind `source_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidSource`] if the reference does not
    /// resolve to a known source.
    async fn load(&self, source_ref: &str) -> Result<Vec<Document>>;
}

/// An in-memory loader serving pre-registered document sets.
///
/// Useful for tests and for callers that already hold their corpus in
/// memory and only need a source reference to hand to the workflow.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::StaticLoader;
///
/// let loader = StaticLoader::new().with_source("corpus", documents);
/// let docs = loader.load("corpus").await?;
/// ```
#[derive(Debug, Default)]
pub struct StaticLoader {
    sources: HashMap<String, Vec<Document>>,
}

impl StaticLoader {
    /// Create a loader with no registered sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document set under a source reference.
    pub fn with_source(mut self, source_ref: impl Into<String>, documents: Vec<Document>) -> Self {
        self.sources.insert(source_ref.into(), documents);
        self
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, source_ref: &str) -> Result<Vec<Document>> {
        self.sources.get(source_ref).cloned().ok_or_else(|| RagError::InvalidSource {
            source_ref: source_ref.to_string(),
            message: "no such source registered".to_string(),
        })
    }
}
