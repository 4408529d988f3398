//! Data types for documents, fragments, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Documents are produced by a [`DocumentLoader`](crate::loader::DocumentLoader)
/// and consumed only by ingestion. They are never mutated after loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

/// A span of a [`Document`] with its vector embedding.
///
/// Fragments are created during ingestion and owned exclusively by the
/// [`VectorIndex`](crate::index::VectorIndex) once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    /// Unique identifier for the fragment.
    pub id: String,
    /// The text content of the fragment.
    pub text: String,
    /// The vector embedding for this fragment's text.
    pub embedding: Vec<f32>,
    /// Key-value metadata inherited from the parent document plus fragment-specific fields.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`]. A back-reference, not ownership.
    pub document_id: String,
}

/// A retrieved [`Fragment`] paired with a relevance score and its rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFragment {
    /// The retrieved fragment.
    pub fragment: Fragment,
    /// The similarity score (higher is more relevant).
    pub score: f32,
    /// Zero-based position in the retrieval ordering.
    pub rank: usize,
}

/// The output of the retrieval step: a query plus its scored fragments.
///
/// Fragments are ordered by descending score. The ordering is meaningful
/// and must be preserved downstream; synthesis consumes fragments in
/// exactly this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The query text the fragments were retrieved for.
    pub query: String,
    /// Retrieved fragments, best match first.
    pub fragments: Vec<ScoredFragment>,
}

impl RetrievalResult {
    /// Number of retrieved fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether retrieval found no fragments at all.
    ///
    /// An empty result is a valid input to synthesis ("no relevant
    /// context"), not an error.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
