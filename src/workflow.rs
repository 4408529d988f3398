//! Workflow orchestrator: event dispatch, run-scoped state, and entry points.
//!
//! The orchestrator wires the three steps together as an event-driven
//! pipeline. Each step declares which event variant it accepts and which it
//! emits; dispatch is a `match` on the variant tag, not a pub/sub bus. A
//! start signal missing the fields a step requires makes that step decline,
//! and a signal no step accepts ends the run with [`RunOutcome::NoOp`]
//! rather than hanging.
//!
//! State moves `Idle → Ingesting → Idle` for ingestion runs and
//! `Idle → Retrieving → Synthesizing → Idle` for query runs. The
//! orchestrator is reusable across runs; the active index persists in the
//! run context until another ingestion replaces it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::WorkflowConfig;
use crate::document::RetrievalResult;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generator::{Answer, Generator};
use crate::index::VectorIndex;
use crate::ingest::IngestStep;
use crate::loader::DocumentLoader;
use crate::retrieve::RetrieveStep;
use crate::synthesize::SynthesizeStep;

/// The external start signal for a workflow run.
///
/// Carries a document-source reference, a query, or both. Steps accept or
/// decline based on which fields are present, so the same entry point can
/// dispatch conditionally.
#[derive(Debug, Default)]
pub struct StartEvent {
    /// Reference to a document source for ingestion.
    pub source: Option<String>,
    /// Query text for retrieval and synthesis.
    pub query: Option<String>,
    /// Explicit index to query, overriding the run context's current one.
    pub index: Option<Arc<VectorIndex>>,
}

impl StartEvent {
    /// A start signal that ingests documents from a source.
    pub fn ingest(source_ref: impl Into<String>) -> Self {
        Self { source: Some(source_ref.into()), ..Self::default() }
    }

    /// A start signal that answers a query.
    pub fn query(text: impl Into<String>) -> Self {
        Self { query: Some(text.into()), ..Self::default() }
    }

    /// Attach a query, turning an ingest signal into ingest-then-query.
    pub fn with_query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    /// Query against an explicit index instead of the run context's.
    pub fn with_index(mut self, index: Arc<VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }
}

/// A typed event flowing between workflow steps.
///
/// Ingestion and retrieval accept [`Start`](WorkflowEvent::Start);
/// synthesis accepts [`Retrieved`](WorkflowEvent::Retrieved); a
/// [`Stop`](WorkflowEvent::Stop) terminates the run.
#[derive(Debug)]
pub enum WorkflowEvent {
    /// The external start signal.
    Start(StartEvent),
    /// Output of the retrieval step, input to synthesis.
    Retrieved(RetrievalResult),
    /// Terminal event carrying the run's outcome.
    Stop(RunOutcome),
}

/// The terminal result of a workflow run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Ingestion completed and the new index was swapped in.
    Indexed(IndexSummary),
    /// Retrieval and synthesis completed.
    Answered(Answer),
    /// No step accepted the start signal.
    NoOp,
}

/// A summary of the active vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of distinct source documents in the index.
    pub document_count: usize,
    /// Number of fragments in the index.
    pub fragment_count: usize,
    /// Dimensionality of the stored embeddings.
    pub dimensions: usize,
}

impl IndexSummary {
    fn of(index: &VectorIndex) -> Self {
        Self {
            document_count: index.document_count(),
            fragment_count: index.len(),
            dimensions: index.dimensions(),
        }
    }
}

/// Which stage of a run the orchestrator is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Ingesting,
    Retrieving,
    Synthesizing,
}

/// Run-scoped mutable state shared across steps within one run.
struct RunContext {
    index: Option<Arc<VectorIndex>>,
    state: RunState,
}

impl RunContext {
    fn set_state(&mut self, state: RunState) {
        debug!(from = ?self.state, to = ?state, "run state transition");
        self.state = state;
    }
}

/// The event-driven RAG workflow orchestrator.
///
/// Owns the run context (the active index) and sequences the ingestion,
/// retrieval, and synthesis steps. Collaborators are injected at
/// construction via [`RagWorkflow::builder()`]; there is no ambient model
/// configuration. Runs against the same instance are serialized: a run
/// completes, including its index swap, before the next run's steps
/// observe state, and a failed run leaves the previous index intact.
///
/// # Example
///
/// ```rust,ignore
/// use ragweave::{RagWorkflow, StartEvent, WorkflowConfig};
///
/// let workflow = RagWorkflow::builder()
///     .loader(Arc::new(loader))
///     .embedder(Arc::new(embedder))
///     .generator(Arc::new(generator))
///     .build()?;
///
/// workflow.ingest_documents("corpus").await?;
/// let answer = workflow.query("What is Mars?").await?.text().await?;
/// ```
pub struct RagWorkflow {
    config: WorkflowConfig,
    ingest: IngestStep,
    retrieve: RetrieveStep,
    synthesize: SynthesizeStep,
    context: Mutex<RunContext>,
}

impl std::fmt::Debug for RagWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagWorkflow")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagWorkflow {
    /// Create a new [`RagWorkflowBuilder`].
    pub fn builder() -> RagWorkflowBuilder {
        RagWorkflowBuilder::default()
    }

    /// Return a reference to the workflow configuration.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Summary of the active index, if any ingestion has completed.
    pub async fn index_summary(&self) -> Option<IndexSummary> {
        self.context.lock().await.index.as_deref().map(IndexSummary::of)
    }

    /// Ingest documents from a source, replacing the active index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidSource`] for a bad or empty source and
    /// propagates collaborator failures. On failure the previous index
    /// stays active and queryable.
    pub async fn ingest_documents(&self, source_ref: &str) -> Result<IndexSummary> {
        match self.run(StartEvent::ingest(source_ref)).await? {
            RunOutcome::Indexed(summary) => Ok(summary),
            outcome => Err(RagError::Workflow(format!(
                "ingestion run ended with unexpected outcome: {outcome:?}"
            ))),
        }
    }

    /// Answer a query against the active index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoIndex`] before any ingestion,
    /// [`RagError::EmptyQuery`] for blank query text, and propagates
    /// collaborator failures.
    pub async fn query(&self, text: &str) -> Result<Answer> {
        match self.run(StartEvent::query(text)).await? {
            RunOutcome::Answered(answer) => Ok(answer),
            outcome => {
                Err(RagError::Workflow(format!("query run ended with unexpected outcome: {outcome:?}")))
            }
        }
    }

    /// Answer a query, streaming the final synthesis output.
    ///
    /// Intermediate refine calls still run to completion internally; only
    /// the last generation streams.
    pub async fn query_streaming(&self, text: &str) -> Result<Answer> {
        match self.run_streaming(StartEvent::query(text)).await? {
            RunOutcome::Answered(answer) => Ok(answer),
            outcome => {
                Err(RagError::Workflow(format!("query run ended with unexpected outcome: {outcome:?}")))
            }
        }
    }

    /// Run the workflow from a raw start signal.
    ///
    /// Source-only signals end at [`RunOutcome::Indexed`], query-only at
    /// [`RunOutcome::Answered`], signals with both run ingestion then the
    /// query against the fresh index, and signals with neither end at
    /// [`RunOutcome::NoOp`].
    pub async fn run(&self, start: StartEvent) -> Result<RunOutcome> {
        self.run_with_mode(start, false).await
    }

    /// Like [`run`](RagWorkflow::run), but the final synthesis call streams.
    pub async fn run_streaming(&self, start: StartEvent) -> Result<RunOutcome> {
        self.run_with_mode(start, true).await
    }

    async fn run_with_mode(&self, start: StartEvent, streaming: bool) -> Result<RunOutcome> {
        // One run at a time: the guard spans every step and the index swap.
        let mut context = self.context.lock().await;
        let outcome = self.dispatch(&mut context, start, streaming).await;
        context.set_state(RunState::Idle);
        outcome
    }

    /// Drive events through the steps until one emits a terminal outcome.
    async fn dispatch(
        &self,
        context: &mut RunContext,
        start: StartEvent,
        streaming: bool,
    ) -> Result<RunOutcome> {
        let mut event = WorkflowEvent::Start(start);
        loop {
            event = match event {
                WorkflowEvent::Start(ev) => {
                    // Start-accepting steps decline when their required
                    // field is absent; the first acceptor wins.
                    if ev.source.is_some() {
                        self.ingest_step(context, ev).await?
                    } else if ev.query.is_some() {
                        self.retrieve_step(context, ev).await?
                    } else {
                        debug!("start signal carries neither source nor query");
                        WorkflowEvent::Stop(RunOutcome::NoOp)
                    }
                }
                WorkflowEvent::Retrieved(result) => {
                    self.synthesize_step(context, result, streaming).await?
                }
                WorkflowEvent::Stop(outcome) => return Ok(outcome),
            };
        }
    }

    /// Accepts `Start` signals carrying a source; emits `Stop(Indexed)` or,
    /// when a query is also present, re-emits `Start` for retrieval.
    async fn ingest_step(
        &self,
        context: &mut RunContext,
        mut ev: StartEvent,
    ) -> Result<WorkflowEvent> {
        let source = ev
            .source
            .take()
            .ok_or_else(|| RagError::Workflow("ingestion dispatched without a source".to_string()))?;

        context.set_state(RunState::Ingesting);
        let index = self.ingest.run(&source).await?;
        let summary = IndexSummary::of(&index);
        context.index = Some(Arc::new(index));
        info!(
            fragment_count = summary.fragment_count,
            document_count = summary.document_count,
            "index swapped in"
        );

        if ev.query.is_some() {
            // Ingestion-then-query: the remaining fields go back through dispatch.
            Ok(WorkflowEvent::Start(ev))
        } else {
            Ok(WorkflowEvent::Stop(RunOutcome::Indexed(summary)))
        }
    }

    /// Accepts `Start` signals carrying a query; emits `Retrieved`.
    async fn retrieve_step(
        &self,
        context: &mut RunContext,
        mut ev: StartEvent,
    ) -> Result<WorkflowEvent> {
        let query = ev
            .query
            .take()
            .ok_or_else(|| RagError::Workflow("retrieval dispatched without a query".to_string()))?;
        let index = ev.index.take().or_else(|| context.index.clone()).ok_or(RagError::NoIndex)?;

        context.set_state(RunState::Retrieving);
        let result = self.retrieve.run(&query, &index, self.config.top_k).await?;
        Ok(WorkflowEvent::Retrieved(result))
    }

    /// Accepts `Retrieved`; emits `Stop(Answered)`.
    async fn synthesize_step(
        &self,
        context: &mut RunContext,
        result: RetrievalResult,
        streaming: bool,
    ) -> Result<WorkflowEvent> {
        context.set_state(RunState::Synthesizing);
        let answer = if streaming {
            self.synthesize.run_streaming(&result).await?
        } else {
            self.synthesize.run(&result).await?
        };
        Ok(WorkflowEvent::Stop(RunOutcome::Answered(answer)))
    }
}

/// Builder for constructing a [`RagWorkflow`].
///
/// The loader, embedder, and generator are required. The configuration
/// defaults to [`WorkflowConfig::default()`] and the chunker to a
/// [`FixedSizeChunker`] derived from that configuration.
///
/// # Example
///
/// ```rust,ignore
/// let workflow = RagWorkflow::builder()
///     .config(WorkflowConfig::builder().top_k(4).build()?)
///     .loader(Arc::new(loader))
///     .embedder(Arc::new(embedder))
///     .generator(Arc::new(generator))
///     .chunker(Arc::new(ParagraphChunker::new(512)))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagWorkflowBuilder {
    config: Option<WorkflowConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn Generator>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagWorkflowBuilder {
    /// Set the workflow configuration.
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader collaborator.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the embedder collaborator.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generator collaborator.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the fragmentation strategy.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagWorkflow`], validating that required collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the loader, embedder, or generator
    /// is missing.
    pub fn build(self) -> Result<RagWorkflow> {
        let config = self.config.unwrap_or_default();
        let loader =
            self.loader.ok_or_else(|| RagError::Config("loader is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(FixedSizeChunker::new(config.fragment_size, config.fragment_overlap))
        });

        Ok(RagWorkflow {
            ingest: IngestStep::new(loader, chunker, Arc::clone(&embedder)),
            retrieve: RetrieveStep::new(embedder),
            synthesize: SynthesizeStep::new(generator),
            config,
            context: Mutex::new(RunContext { index: None, state: RunState::Idle }),
        })
    }
}
