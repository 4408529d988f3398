//! Reference collaborator adapters for a local Ollama endpoint.
//!
//! This module is only available when the `ollama` feature is enabled.
//! [`OllamaEmbedder`] calls `POST /api/embeddings`; [`OllamaGenerator`]
//! calls `POST /api/generate`, with token streaming over NDJSON.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generator::{Generator, TokenStream};

/// The default Ollama API endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

fn unreachable_err(collaborator: &str, err: &reqwest::Error) -> RagError {
    RagError::CollaboratorUnavailable {
        collaborator: collaborator.to_string(),
        message: err.to_string(),
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
    format!("HTTP {status}: {body}")
}

/// An [`Embedder`] backed by the Ollama embeddings API.
///
/// Ollama does not report embedding dimensionality, so it must be given
/// up front and must match the configured model.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::ollama::OllamaEmbedder;
///
/// let embedder = OllamaEmbedder::new("nomic-embed-text", 768);
/// let embedding = embedder.embed("hello world").await?;
/// ```
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create an embedder for the given model, using the default endpoint.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
            dimensions,
        }
    }

    /// Override the Ollama base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest { model: &self.model, prompt: text };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| unreachable_err("ollama-embedder", &e))?;

        if !response.status().is_success() {
            return Err(RagError::CollaboratorUnavailable {
                collaborator: "ollama-embedder".to_string(),
                message: error_body(response).await,
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RagError::CollaboratorUnavailable {
                collaborator: "ollama-embedder".to_string(),
                message: format!("malformed embedding response: {e}"),
            }
        })?;

        if parsed.embedding.len() != self.dimensions {
            return Err(RagError::Index(format!(
                "model '{}' returned {} dimensions, embedder configured for {}",
                self.model,
                parsed.embedding.len(),
                self.dimensions
            )));
        }
        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`Generator`] backed by the Ollama generate API.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::ollama::OllamaGenerator;
///
/// let generator = OllamaGenerator::new("granite4:350m");
/// let text = generator.generate("Why is the sky blue?").await?;
/// ```
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a generator for the given model, using the default endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
        }
    }

    /// Override the Ollama base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(&self, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest { model: &self.model, prompt, stream };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| unreachable_err("ollama-generator", &e))?;

        if !response.status().is_success() {
            return Err(RagError::Generation(error_body(response).await));
        }
        Ok(response)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.send(prompt, false).await?;
        let parsed: GenerateChunk = response
            .json()
            .await
            .map_err(|e| RagError::Generation(format!("malformed generate response: {e}")))?;
        debug!(model = %self.model, chars = parsed.response.len(), "generated response");
        Ok(parsed.response)
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        let response = self.send(prompt, true).await?;
        let mut bytes = response.bytes_stream();

        // Ollama streams NDJSON: one JSON object per line, `done: true` last.
        let stream = try_stream! {
            let mut buffer = String::new();
            'read: while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| RagError::CollaboratorUnavailable {
                    collaborator: "ollama-generator".to_string(),
                    message: e.to_string(),
                })?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let part: GenerateChunk = serde_json::from_str(line).map_err(|e| {
                        RagError::Generation(format!("malformed stream chunk: {e}"))
                    })?;
                    if !part.response.is_empty() {
                        yield part.response;
                    }
                    if part.done {
                        break 'read;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
