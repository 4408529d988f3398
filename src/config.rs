//! Configuration for the RAG workflow.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    /// Maximum fragment size in characters.
    pub fragment_size: usize,
    /// Number of overlapping characters between consecutive fragments.
    pub fragment_overlap: usize,
    /// Number of top results to return from retrieval.
    pub top_k: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { fragment_size: 512, fragment_overlap: 100, top_k: 2 }
    }
}

impl WorkflowConfig {
    /// Create a new builder for constructing a [`WorkflowConfig`].
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`WorkflowConfig`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfigBuilder {
    config: WorkflowConfig,
}

impl WorkflowConfigBuilder {
    /// Set the maximum fragment size in characters.
    pub fn fragment_size(mut self, size: usize) -> Self {
        self.config.fragment_size = size;
        self
    }

    /// Set the overlap between consecutive fragments in characters.
    pub fn fragment_overlap(mut self, overlap: usize) -> Self {
        self.config.fragment_overlap = overlap;
        self
    }

    /// Set the number of top results to return from retrieval.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`WorkflowConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `fragment_overlap >= fragment_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<WorkflowConfig> {
        if self.config.fragment_overlap >= self.config.fragment_size {
            return Err(RagError::Config(format!(
                "fragment_overlap ({}) must be less than fragment_size ({})",
                self.config.fragment_overlap, self.config.fragment_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
