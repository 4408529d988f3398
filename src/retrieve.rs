//! Retrieval step: embed the query and search the index for the top-k fragments.

use std::sync::Arc;

use tracing::info;

use crate::document::RetrievalResult;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// The retrieval step of the workflow.
///
/// Embeds the query text once and asks the index for the `top_k` nearest
/// fragments. No score-threshold filtering happens here: an index full of
/// irrelevant content still returns its k nearest fragments, and judging
/// relevance is left to the generator during synthesis.
pub struct RetrieveStep {
    embedder: Arc<dyn Embedder>,
}

impl RetrieveStep {
    /// Create a retrieval step from its collaborator.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Run retrieval against the given index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] when the query is empty or
    /// whitespace-only, and propagates embedder failures.
    pub async fn run(
        &self,
        query: &str,
        index: &VectorIndex,
        top_k: usize,
    ) -> Result<RetrievalResult> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let query_embedding = self.embedder.embed(query).await?;
        let fragments = index.query(&query_embedding, top_k);

        info!(query, top_k, retrieved = fragments.len(), "retrieved fragments");
        Ok(RetrievalResult { query: query.to_string(), fragments })
    }
}
