//! Embedder trait: the contract for the external embedding collaborator.

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::Result;

/// A collaborator that turns text into fixed-length embedding vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Every vector produced by one instance has the same length,
/// reported by [`dimensions`](Embedder::dimensions).
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::Embedder;
///
/// let embedder = MyEmbedder::new();
/// let embedding = embedder.embed("hello world").await?;
/// assert_eq!(embedding.len(), embedder.dimensions());
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation issues all [`embed`](Embedder::embed)
    /// calls concurrently and collects the results in input order.
    /// Embedding is stateless, so completion order does not matter, but
    /// the returned vectors always line up with `texts`. Override this
    /// method if the backend supports native batch embedding.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        try_join_all(texts.iter().map(|text| self.embed(text))).await
    }

    /// Return the dimensionality of embeddings produced by this collaborator.
    fn dimensions(&self) -> usize;
}
