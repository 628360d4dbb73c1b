//! Testing utilities for the companion pipeline.
//!
//! This module provides tools for integration testing:
//! - `MockCompletion` for deterministic testing without API calls
//! - `FixedSentiment` to pin the polarity score
//! - `TestHarness` for scripted conversations
//! - Assertion helpers for verifying the transcript

use crate::completion::{Completion, CompletionClient, CompletionError};
use crate::history::HistoryEntry;
use crate::sentiment::{LexiconSentiment, SentimentEstimator};
use crate::session::{ChatSession, Reply, SessionError};
use crate::transcript::{Role, Transcript};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Returned once the scripted outcomes run out.
pub const EXHAUSTED_REPLY: &str = "The mock has no more scripted responses.";

/// One recorded invocation of the completion client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub history: Vec<HistoryEntry>,
    pub message: String,
}

#[derive(Debug, Default)]
struct MockState {
    outcomes: VecDeque<Result<Completion, CompletionError>>,
    calls: Vec<RecordedCall>,
}

/// A completion client that returns scripted outcomes in order.
///
/// Clones share state, so a test can keep a handle after moving the mock
/// into a session and inspect what the session sent.
#[derive(Debug, Clone, Default)]
pub struct MockCompletion {
    state: Arc<Mutex<MockState>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a generated reply.
    pub fn with_generated(self, text: impl Into<String>) -> Self {
        self.push(Ok(Completion::Generated(text.into())));
        self
    }

    /// Queue a filtered outcome.
    pub fn with_filtered(self) -> Self {
        self.push(Ok(Completion::Filtered {
            reason: Some("SAFETY".to_string()),
        }));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, err: CompletionError) -> Self {
        self.push(Err(err));
        self
    }

    /// Queue any outcome.
    pub fn push(&self, outcome: Result<Completion, CompletionError>) {
        self.lock().outcomes.push_back(outcome);
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test may poison the lock; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(
        &self,
        history: &[HistoryEntry],
        message: &str,
    ) -> Result<Completion, CompletionError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            history: history.to_vec(),
            message: message.to_string(),
        });
        state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::Generated(EXHAUSTED_REPLY.to_string())))
    }
}

/// A sentiment estimator that always returns the same score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSentiment(pub f64);

impl SentimentEstimator for FixedSentiment {
    fn score(&self, _text: &str) -> f64 {
        self.0
    }
}

/// Test harness for running conversation scenarios.
pub struct TestHarness {
    /// Handle to the mock the session talks to.
    pub completion: MockCompletion,
    /// The session under test.
    pub session: ChatSession,
}

impl TestHarness {
    /// Create a harness using the bundled lexicon scorer.
    pub fn new() -> Self {
        let completion = MockCompletion::new();
        let session = ChatSession::new(completion.clone(), LexiconSentiment::new());
        Self {
            completion,
            session,
        }
    }

    /// Create a harness whose sentiment score is pinned to `score`.
    pub fn with_sentiment(score: f64) -> Self {
        let completion = MockCompletion::new();
        let session = ChatSession::new(completion.clone(), FixedSentiment(score));
        Self {
            completion,
            session,
        }
    }

    /// Queue a generated reply.
    pub fn expect_generated(&mut self, text: impl Into<String>) -> &mut Self {
        self.completion
            .push(Ok(Completion::Generated(text.into())));
        self
    }

    /// Queue a filtered outcome.
    pub fn expect_filtered(&mut self) -> &mut Self {
        self.completion.push(Ok(Completion::Filtered { reason: None }));
        self
    }

    /// Queue a failure.
    pub fn expect_error(&mut self, err: CompletionError) -> &mut Self {
        self.completion.push(Err(err));
        self
    }

    /// Send a student message through the session.
    pub async fn input(&mut self, text: &str) -> Result<Reply, SessionError> {
        self.session.send(text).await
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    /// Content of the last assistant turn.
    pub fn last_assistant(&self) -> Option<&str> {
        self.transcript()
            .iter()
            .rev()
            .find(|t| t.role() == Role::Assistant)
            .map(|t| t.content())
    }

    /// Number of completion calls made so far.
    pub fn completion_calls(&self) -> usize {
        self.completion.call_count()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the transcript roles, oldest first.
#[track_caller]
pub fn assert_roles(harness: &TestHarness, expected: &[Role]) {
    let actual: Vec<Role> = harness.transcript().iter().map(|t| t.role()).collect();
    assert_eq!(actual, expected, "unexpected transcript roles");
}

/// Assert the completion client was never invoked.
#[track_caller]
pub fn assert_completion_not_called(harness: &TestHarness) {
    assert_eq!(
        harness.completion_calls(),
        0,
        "Expected the completion client to NOT be called"
    );
}

/// Assert the last assistant turn has exactly this content.
#[track_caller]
pub fn assert_last_assistant(harness: &TestHarness, expected: &str) {
    assert_eq!(
        harness.last_assistant(),
        Some(expected),
        "Expected last assistant turn to be {expected:?}"
    );
}
