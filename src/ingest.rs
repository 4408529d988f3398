//! Ingestion step: load documents, fragment them, embed, and build a fresh index.

use std::sync::Arc;

use tracing::{debug, info};

use crate::chunking::Chunker;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::loader::DocumentLoader;

/// The ingestion step of the workflow.
///
/// Turns a source reference into a newly built [`VectorIndex`]. The index
/// is constructed from scratch on every run; the caller swaps it in only
/// after this step succeeds, so a partial ingestion is never observable.
pub struct IngestStep {
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
}

impl IngestStep {
    /// Create an ingestion step from its collaborators.
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self { loader, chunker, embedder }
    }

    /// Run ingestion: load → fragment → embed → build index.
    ///
    /// Fragment embeddings are requested through
    /// [`Embedder::embed_batch`], which issues the calls concurrently but
    /// returns vectors in fragment order; the index is only built once
    /// every embedding has arrived.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidSource`] when the source resolves to
    /// zero documents, and propagates loader and embedder failures.
    pub async fn run(&self, source_ref: &str) -> Result<VectorIndex> {
        let documents = self.loader.load(source_ref).await?;
        if documents.is_empty() {
            return Err(RagError::InvalidSource {
                source_ref: source_ref.to_string(),
                message: "source resolved to zero documents".to_string(),
            });
        }
        let document_count = documents.len();

        let mut fragments = Vec::new();
        for document in &documents {
            let document_fragments = self.chunker.chunk(document);
            debug!(
                document.id = %document.id,
                fragment_count = document_fragments.len(),
                "fragmented document"
            );
            fragments.extend(document_fragments);
        }

        let mut index = VectorIndex::new(self.embedder.dimensions());
        if fragments.is_empty() {
            info!(source = source_ref, document_count, fragment_count = 0, "ingested source (no fragments)");
            return Ok(index);
        }

        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        for (fragment, embedding) in fragments.iter_mut().zip(embeddings) {
            fragment.embedding = embedding;
        }

        index.insert_all(fragments)?;
        info!(
            source = source_ref,
            document_count,
            fragment_count = index.len(),
            dimensions = index.dimensions(),
            "ingested source"
        );
        Ok(index)
    }
}
