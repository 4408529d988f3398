//! Tests for compact-and-refine synthesis over retrieval results.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragweave::synthesize::SynthesizeStep;
use ragweave::{
    Answer, Fragment, Generator, RagError, Result, RetrievalResult, ScoredFragment, TokenStream,
};

/// Records every prompt and answers with a call-numbered string; streaming
/// calls are recorded separately and yield two fixed increments.
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
    stream_prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        Ok(format!("ans{}", prompts.len()))
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        self.stream_prompts.lock().unwrap().push(prompt.to_string());
        let increments: Vec<Result<String>> = vec![Ok("streamed ".to_string()), Ok("tail".to_string())];
        Ok(Box::pin(futures::stream::iter(increments)))
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::Generation("model returned no output".to_string()))
    }
}

fn scored(id: &str, text: &str, score: f32, rank: usize) -> ScoredFragment {
    ScoredFragment {
        fragment: Fragment {
            id: id.to_string(),
            text: text.to_string(),
            embedding: Vec::new(),
            metadata: HashMap::new(),
            document_id: "doc".to_string(),
        },
        score,
        rank,
    }
}

fn retrieval(fragments: Vec<ScoredFragment>) -> RetrievalResult {
    RetrievalResult { query: "What is Mars?".to_string(), fragments }
}

#[tokio::test]
async fn refine_chain_feeds_each_answer_into_the_next_prompt() {
    let generator = Arc::new(RecordingGenerator::default());
    let step = SynthesizeStep::new(generator.clone());

    let result = retrieval(vec![
        scored("f0", "Mars is a planet.", 0.9, 0),
        scored("f1", "Mars is red.", 0.5, 1),
        scored("f2", "Mars has two moons.", 0.2, 2),
    ]);

    let answer = step.run(&result).await.unwrap();
    assert_eq!(answer.text().await.unwrap(), "ans3");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    // Initial prompt: query plus the best fragment only.
    assert!(prompts[0].contains("What is Mars?"));
    assert!(prompts[0].contains("Mars is a planet."));
    assert!(!prompts[0].contains("Mars is red."));
    // Each refine prompt carries the previous answer and the next fragment,
    // in score order.
    assert!(prompts[1].contains("ans1"));
    assert!(prompts[1].contains("Mars is red."));
    assert!(prompts[2].contains("ans2"));
    assert!(prompts[2].contains("Mars has two moons."));
}

#[tokio::test]
async fn zero_fragments_still_run_the_generator_once() {
    let generator = Arc::new(RecordingGenerator::default());
    let step = SynthesizeStep::new(generator.clone());

    let answer = step.run(&retrieval(Vec::new())).await.unwrap();

    assert_eq!(answer.text().await.unwrap(), "ans1");
    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("What is Mars?"));
}

#[tokio::test]
async fn streaming_runs_only_the_final_call_as_a_stream() {
    let generator = Arc::new(RecordingGenerator::default());
    let step = SynthesizeStep::new(generator.clone());

    let result = retrieval(vec![
        scored("f0", "Mars is a planet.", 0.9, 0),
        scored("f1", "Mars is red.", 0.5, 1),
        scored("f2", "Mars has two moons.", 0.2, 2),
    ]);

    let answer = step.run_streaming(&result).await.unwrap();
    assert!(answer.is_stream());
    assert_eq!(answer.text().await.unwrap(), "streamed tail");

    // Two full-text calls (initial + middle refine), one streaming tail.
    assert_eq!(generator.prompts.lock().unwrap().len(), 2);
    let stream_prompts = generator.stream_prompts.lock().unwrap();
    assert_eq!(stream_prompts.len(), 1);
    assert!(stream_prompts[0].contains("Mars has two moons."));
    assert!(stream_prompts[0].contains("ans2"));
}

#[tokio::test]
async fn single_fragment_streams_the_initial_call() {
    let generator = Arc::new(RecordingGenerator::default());
    let step = SynthesizeStep::new(generator.clone());

    let answer = step
        .run_streaming(&retrieval(vec![scored("f0", "Mars is a planet.", 0.9, 0)]))
        .await
        .unwrap();

    assert!(answer.is_stream());
    assert!(generator.prompts.lock().unwrap().is_empty());
    assert_eq!(generator.stream_prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn zero_fragments_can_stream_too() {
    let generator = Arc::new(RecordingGenerator::default());
    let step = SynthesizeStep::new(generator.clone());

    let answer = step.run_streaming(&retrieval(Vec::new())).await.unwrap();
    assert!(answer.is_stream());
    assert_eq!(answer.text().await.unwrap(), "streamed tail");
}

#[tokio::test]
async fn generator_failure_surfaces_as_generation_error() {
    let step = SynthesizeStep::new(Arc::new(FailingGenerator));

    let err = step
        .run(&retrieval(vec![scored("f0", "Mars is a planet.", 0.9, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Generation(_)));
}
