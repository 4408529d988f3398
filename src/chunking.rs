//! Fragmentation strategies for splitting documents.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — splits by character count with configurable overlap
//! - [`ParagraphChunker`] — splits on blank lines, merging paragraphs up to a size limit
//!
//! All strategies are deterministic: the same document and parameters
//! always produce the same fragments, so re-ingestion is reproducible.

use crate::document::{Document, Fragment};

/// A strategy for splitting a document into fragments.
///
/// Implementations produce [`Fragment`]s with text and metadata but no
/// embeddings. Embeddings are attached later by the ingestion step.
pub trait Chunker: Send + Sync {
    /// Split a document into fragments.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned fragment has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Fragment>;
}

/// Build the fragment for `document` at position `index` with the given text.
fn make_fragment(document: &Document, index: usize, text: String) -> Fragment {
    let mut metadata = document.metadata.clone();
    metadata.insert("fragment_index".to_string(), index.to_string());
    Fragment {
        id: format!("{}_{index}", document.id),
        text,
        embedding: Vec::new(),
        metadata,
        document_id: document.id.clone(),
    }
}

/// Move a byte offset left until it lands on a char boundary.
fn floor_boundary(text: &str, mut at: usize) -> usize {
    while at < text.len() && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Move a byte offset right until it lands on a char boundary.
fn ceil_boundary(text: &str, mut at: usize) -> usize {
    while at < text.len() && !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

/// Splits text into fixed-size windows by character count with configurable overlap.
///
/// Fragment IDs are generated as `{document_id}_{fragment_index}`. Each
/// fragment inherits the parent document's metadata plus a `fragment_index`
/// field.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(256, 50);
/// let fragments = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    fragment_size: usize,
    fragment_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `fragment_size` — maximum number of characters per fragment
    /// * `fragment_overlap` — number of overlapping characters between consecutive fragments
    pub fn new(fragment_size: usize, fragment_overlap: usize) -> Self {
        Self { fragment_size, fragment_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Fragment> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let text = &document.text;
        let mut fragments = Vec::new();
        let mut start = 0;
        let mut index = 0;

        while start < text.len() {
            let end = floor_boundary(text, (start + self.fragment_size).min(text.len()));
            fragments.push(make_fragment(document, index, text[start..end].to_string()));

            index += 1;
            let step = self.fragment_size.saturating_sub(self.fragment_overlap);
            if step == 0 {
                break;
            }
            // Ceiling keeps the window advancing even when the step lands
            // inside a multi-byte character.
            start = ceil_boundary(text, start + step);
        }

        fragments
    }
}

/// Splits text on blank lines, merging consecutive paragraphs into fragments
/// that respect a size limit.
///
/// A single paragraph longer than the limit becomes one oversized fragment
/// rather than being cut mid-sentence.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    max_fragment_size: usize,
}

impl ParagraphChunker {
    /// Create a new `ParagraphChunker` with the given size limit in characters.
    pub fn new(max_fragment_size: usize) -> Self {
        Self { max_fragment_size }
    }
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, document: &Document) -> Vec<Fragment> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let mut fragments = Vec::new();
        let mut current = String::new();
        let mut index = 0;

        for paragraph in document.text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if current.is_empty() {
                current = paragraph.to_string();
            } else if current.len() + 2 + paragraph.len() <= self.max_fragment_size {
                current.push_str("\n\n");
                current.push_str(paragraph);
            } else {
                fragments.push(make_fragment(document, index, std::mem::take(&mut current)));
                index += 1;
                current = paragraph.to_string();
            }
        }

        if !current.is_empty() {
            fragments.push(make_fragment(document, index, current));
        }

        fragments
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn doc(text: &str) -> Document {
        Document {
            id: "doc_1".to_string(),
            text: text.to_string(),
            metadata: HashMap::new(),
            source_uri: None,
        }
    }

    #[test]
    fn fixed_size_windows_overlap() {
        let chunker = FixedSizeChunker::new(10, 4);
        let fragments = chunker.chunk(&doc("abcdefghijklmnopqrst"));

        assert_eq!(fragments[0].text, "abcdefghij");
        assert_eq!(fragments[1].text, "ghijklmnop");
        assert!(fragments.iter().all(|f| f.document_id == "doc_1"));
        assert_eq!(fragments[1].metadata["fragment_index"], "1");
    }

    #[test]
    fn fixed_size_is_deterministic() {
        let chunker = FixedSizeChunker::new(8, 2);
        let document = doc("the quick brown fox jumps over the lazy dog");
        assert_eq!(chunker.chunk(&document), chunker.chunk(&document));
    }

    #[test]
    fn empty_document_yields_no_fragments() {
        assert!(FixedSizeChunker::new(10, 0).chunk(&doc("")).is_empty());
        assert!(ParagraphChunker::new(100).chunk(&doc("")).is_empty());
    }

    #[test]
    fn paragraphs_merge_up_to_limit() {
        let chunker = ParagraphChunker::new(25);
        let fragments = chunker.chunk(&doc("first para\n\nsecond one\n\nthird paragraph here"));

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "first para\n\nsecond one");
        assert_eq!(fragments[1].text, "third paragraph here");
    }
}
