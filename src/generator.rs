//! Generator trait and the answer types produced by synthesis.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::{RagError, Result};

/// A finite, forward-only, single-pass sequence of text increments.
///
/// The consumer pulls increments; the stream ends when the generator
/// signals completion. Dropping the stream abandons any remaining output.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A collaborator that turns a prompt into generated text.
///
/// Implementations wrap a specific language-model backend. The default
/// [`generate_stream`](Generator::generate_stream) falls back to a single
/// increment carrying the complete output; backends with native token
/// streaming should override it.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a complete response for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a response as a stream of text increments.
    ///
    /// The default implementation runs [`generate`](Generator::generate) to
    /// completion and yields the result as one increment.
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        let text = self.generate(prompt).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok::<_, RagError>(text) })))
    }
}

/// The terminal artifact of a pipeline run: a synthesized answer.
///
/// Either the complete text, or a lazy stream of increments when the
/// caller asked for streaming output.
pub enum Answer {
    /// The full answer text.
    Complete(String),
    /// The answer as a pull-based stream of text increments.
    Stream(TokenStream),
}

impl Answer {
    /// Whether this answer streams its text incrementally.
    pub fn is_stream(&self) -> bool {
        matches!(self, Answer::Stream(_))
    }

    /// Consume the answer and return its complete text.
    ///
    /// For a streaming answer this drains the stream, concatenating all
    /// increments. A failed increment surfaces as the stream's error.
    pub async fn text(self) -> Result<String> {
        match self {
            Answer::Complete(text) => Ok(text),
            Answer::Stream(mut stream) => {
                let mut text = String::new();
                while let Some(increment) = stream.next().await {
                    text.push_str(&increment?);
                }
                Ok(text)
            }
        }
    }

    /// Consume the answer and return it as a token stream.
    ///
    /// A complete answer becomes a single-increment stream.
    pub fn into_stream(self) -> TokenStream {
        match self {
            Answer::Complete(text) => {
                Box::pin(futures::stream::once(async move { Ok::<_, RagError>(text) }))
            }
            Answer::Stream(stream) => stream,
        }
    }
}

impl std::fmt::Debug for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Answer::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
