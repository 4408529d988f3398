//! In-memory vector index using cosine similarity.
//!
//! [`VectorIndex`] holds embedded fragments in insertion order and answers
//! top-k nearest-neighbor queries. An index is built once per ingestion,
//! queried many times, and discarded when a new ingestion replaces it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::{Fragment, ScoredFragment};
use crate::error::{RagError, Result};

/// An in-memory vector index over document fragments.
///
/// Invariant: every stored fragment has an embedding of the index's
/// dimensionality, checked on insertion. Storage preserves insertion
/// order, which breaks score ties in queries.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::VectorIndex;
///
/// let mut index = VectorIndex::new(384);
/// index.insert_all(fragments)?;
/// let top = index.query(&query_embedding, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    fragments: Vec<Fragment>,
    dimensions: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Create an empty index for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { fragments: Vec::new(), dimensions }
    }

    /// Insert fragments into the index, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if any fragment's embedding does not
    /// match the index dimensionality. Nothing is inserted in that case.
    pub fn insert_all(&mut self, fragments: Vec<Fragment>) -> Result<()> {
        for fragment in &fragments {
            if fragment.embedding.len() != self.dimensions {
                return Err(RagError::Index(format!(
                    "fragment '{}' has embedding of length {}, index expects {}",
                    fragment.id,
                    fragment.embedding.len(),
                    self.dimensions
                )));
            }
        }
        self.fragments.extend(fragments);
        Ok(())
    }

    /// Return the `top_k` fragments most similar to the given embedding.
    ///
    /// Results are ordered by descending cosine similarity; equal scores
    /// keep their insertion order. If the index holds fewer than `top_k`
    /// fragments, all of them are returned. Querying an empty index
    /// returns an empty sequence; callers must treat this as "no
    /// relevant context", not a failure.
    pub fn query(&self, embedding: &[f32], top_k: usize) -> Vec<ScoredFragment> {
        let mut scored: Vec<ScoredFragment> = self
            .fragments
            .iter()
            .map(|fragment| ScoredFragment {
                score: cosine_similarity(&fragment.embedding, embedding),
                fragment: fragment.clone(),
                rank: 0,
            })
            .collect();

        // Stable sort: ties keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        for (rank, result) in scored.iter_mut().enumerate() {
            result.rank = rank;
        }
        scored
    }

    /// Number of fragments stored in the index.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the index holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The dimensionality every stored embedding must have.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of distinct source documents represented in the index.
    pub fn document_count(&self) -> usize {
        self.fragments.iter().map(|f| f.document_id.as_str()).collect::<HashSet<_>>().len()
    }

    /// Iterate over the stored fragments in insertion order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }
}
