//! Synthesis step: build an answer over retrieved fragments by compact-and-refine.
//!
//! The first fragment seeds an initial answer; each subsequent fragment
//! refines it. Refine calls are strictly sequential, since every call needs
//! the complete previous answer as input, so only the final call may stream
//! its output to the caller.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievalResult;
use crate::error::Result;
use crate::generator::{Answer, Generator};

/// Prompt for answering a query from a single piece of context.
///
/// An empty `context` still produces a well-formed prompt, asking the
/// generator for a best-effort answer with no supporting material.
fn answer_prompt(query: &str, context: &str) -> String {
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Given the context information and not prior knowledge, \
         answer the question.\n\
         Question: {query}\n\
         Answer:"
    )
}

/// Prompt for refining an existing answer in light of additional context.
fn refine_prompt(query: &str, existing_answer: &str, context: &str) -> String {
    format!(
        "The original question is as follows: {query}\n\
         We have provided an existing answer: {existing_answer}\n\
         We have the opportunity to refine the existing answer with some \
         more context below.\n\
         ------------\n\
         {context}\n\
         ------------\n\
         Given the new context, refine the original answer to better answer \
         the question. If the context isn't useful, return the original \
         answer.\n\
         Refined Answer:"
    )
}

/// The synthesis step of the workflow.
///
/// Consumes a [`RetrievalResult`] in its given score-descending order and
/// produces the terminal [`Answer`]. An empty retrieval result is a normal
/// input (the generator is still called once with empty context), so the
/// only failures here are the generator's own.
pub struct SynthesizeStep {
    generator: Arc<dyn Generator>,
}

impl SynthesizeStep {
    /// Create a synthesis step from its collaborator.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Synthesize a complete answer.
    ///
    /// N fragments cost exactly one initial generation plus N-1 refine
    /// calls; zero fragments cost one generation with empty context.
    pub async fn run(&self, result: &RetrievalResult) -> Result<Answer> {
        let Some((first, rest)) = result.fragments.split_first() else {
            debug!(query = %result.query, "synthesizing with empty context");
            let text = self.generator.generate(&answer_prompt(&result.query, "")).await?;
            return Ok(Answer::Complete(text));
        };

        let mut answer =
            self.generator.generate(&answer_prompt(&result.query, &first.fragment.text)).await?;

        for scored in rest {
            debug!(fragment.id = %scored.fragment.id, rank = scored.rank, "refining answer");
            answer = self
                .generator
                .generate(&refine_prompt(&result.query, &answer, &scored.fragment.text))
                .await?;
        }

        info!(query = %result.query, fragment_count = result.len(), "synthesized answer");
        Ok(Answer::Complete(answer))
    }

    /// Synthesize an answer whose final generation streams.
    ///
    /// All calls except the last run to completion internally; the last
    /// call's output is returned as a lazy token stream. With one or zero
    /// fragments the initial call is the last call and streams directly.
    pub async fn run_streaming(&self, result: &RetrievalResult) -> Result<Answer> {
        let Some((last, head)) = result.fragments.split_last() else {
            debug!(query = %result.query, "synthesizing with empty context (streaming)");
            let stream = self.generator.generate_stream(&answer_prompt(&result.query, "")).await?;
            return Ok(Answer::Stream(stream));
        };

        let Some((first, middle)) = head.split_first() else {
            let stream = self
                .generator
                .generate_stream(&answer_prompt(&result.query, &last.fragment.text))
                .await?;
            return Ok(Answer::Stream(stream));
        };

        let mut answer =
            self.generator.generate(&answer_prompt(&result.query, &first.fragment.text)).await?;

        for scored in middle {
            debug!(fragment.id = %scored.fragment.id, rank = scored.rank, "refining answer");
            answer = self
                .generator
                .generate(&refine_prompt(&result.query, &answer, &scored.fragment.text))
                .await?;
        }

        info!(
            query = %result.query,
            fragment_count = result.len(),
            "synthesized answer, streaming final refinement"
        );
        let stream = self
            .generator
            .generate_stream(&refine_prompt(&result.query, &answer, &last.fragment.text))
            .await?;
        Ok(Answer::Stream(stream))
    }
}
