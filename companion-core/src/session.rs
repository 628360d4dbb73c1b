//! ChatSession - the primary public API for a companion conversation.
//!
//! A session owns the transcript and sequences every message through the
//! pipeline: append the user turn, run the crisis gate, score sentiment,
//! translate prior history, call the completion service, append the reply.

use crate::completion::{Completion, CompletionClient, CompletionError, GeminiCompletion};
use crate::config::CompanionConfig;
use crate::history::translate;
use crate::prefix::select_prefix;
use crate::safety::{crisis_response, CrisisDetector};
use crate::sentiment::{LexiconSentiment, SentimentEstimator};
use crate::transcript::{Transcript, Turn};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Assistant reply stored when the service withholds content.
pub const REFUSAL_RESPONSE: &str = "I'm sorry, but I can't discuss this topic. \
If you'd like, we can talk about something else that's on your mind.";

/// Notice shown to the user when a completion fails. Never stored.
pub const FAILURE_NOTICE: &str =
    "Sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Errors from ChatSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),
}

impl SessionError {
    /// Text suitable for showing to the student.
    pub fn user_message(&self) -> &'static str {
        FAILURE_NOTICE
    }
}

/// Which branch of the pipeline produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// The crisis gate fired; the completion service was not called.
    SafetyIntercept,
    /// The service filtered the content; the refusal was stored.
    ContentFiltered,
    /// Prefix plus generated text.
    Generated,
}

/// Result of processing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    /// Exactly the content of the assistant turn just appended.
    pub content: String,
}

/// A single student's conversation.
pub struct ChatSession {
    completion: Box<dyn CompletionClient>,
    sentiment: Box<dyn SentimentEstimator>,
    detector: CrisisDetector,
    transcript: Transcript,
}

impl ChatSession {
    /// Create a session over the given collaborators with an empty transcript.
    pub fn new(
        completion: impl CompletionClient + 'static,
        sentiment: impl SentimentEstimator + 'static,
    ) -> Self {
        Self {
            completion: Box::new(completion),
            sentiment: Box::new(sentiment),
            detector: CrisisDetector::new(),
            transcript: Transcript::new(),
        }
    }

    /// Create a session talking to Gemini with the bundled lexicon scorer.
    pub fn from_config(config: &CompanionConfig) -> Result<Self, SessionError> {
        let completion = GeminiCompletion::from_config(config)?;
        info!(model = %config.model, "starting companion session");
        Ok(Self::new(completion, LexiconSentiment::new()))
    }

    /// Process one user message and return the assistant reply.
    ///
    /// The user turn is always recorded. On error no assistant turn is
    /// recorded and the transcript ends with the user turn.
    pub async fn send(&mut self, text: &str) -> Result<Reply, SessionError> {
        self.transcript.push(Turn::user(text));

        if let Some(keyword) = self.detector.matched_keyword(text) {
            warn!(keyword, "crisis keyword matched, intercepting");
            return Ok(self.record(ReplyKind::SafetyIntercept, crisis_response().to_string()));
        }

        let score = self.sentiment.score(text);
        let prefix = select_prefix(score);
        debug!(score, has_prefix = !prefix.is_empty(), "sentiment scored");

        let prior = &self.transcript.turns()[..self.transcript.len() - 1];
        let history = translate(prior);
        debug!(history_len = history.len(), "history translated");

        let outcome = self.completion.complete(&history, text).await;
        match outcome {
            Ok(Completion::Generated(generated)) => {
                info!("reply generated");
                Ok(self.record(ReplyKind::Generated, format!("{prefix}{generated}")))
            }
            Ok(Completion::Filtered { reason }) => {
                info!(reason = reason.as_deref().unwrap_or("unspecified"), "content filtered");
                Ok(self.record(ReplyKind::ContentFiltered, REFUSAL_RESPONSE.to_string()))
            }
            Err(err) => {
                warn!(error = %err, "completion failed");
                Err(err.into())
            }
        }
    }

    fn record(&mut self, kind: ReplyKind, content: String) -> Reply {
        self.transcript.push(Turn::assistant(content.clone()));
        Reply { kind, content }
    }

    /// The conversation so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Start over with an empty transcript.
    pub fn reset(&mut self) {
        info!(turns = self.transcript.len(), "session reset");
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedSentiment, MockCompletion};
    use crate::transcript::Role;

    #[tokio::test]
    async fn test_user_turn_always_recorded() {
        let mock = MockCompletion::new().with_error(CompletionError::Timeout);
        let mut session = ChatSession::new(mock, FixedSentiment(0.0));

        assert!(session.send("hello").await.is_err());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().turns()[0].role(), Role::User);
    }

    #[tokio::test]
    async fn test_neutral_reply_has_no_prefix() {
        let mock = MockCompletion::new().with_generated("Tell me more.");
        let mut session = ChatSession::new(mock, FixedSentiment(0.0));

        let reply = session.send("I went to class").await.unwrap();
        assert_eq!(reply.kind, ReplyKind::Generated);
        assert_eq!(reply.content, "Tell me more.");
    }

    #[tokio::test]
    async fn test_heavy_prefix() {
        let mock = MockCompletion::new().with_generated("That's a lot.");
        let mut session = ChatSession::new(mock, FixedSentiment(-0.2));

        let reply = session.send("Exams are piling up").await.unwrap();
        assert_eq!(
            reply.content,
            "It sounds like things are a bit heavy lately. That's a lot."
        );
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let mock = MockCompletion::new().with_generated("Hi!");
        let mut session = ChatSession::new(mock, FixedSentiment(0.0));

        session.send("hello").await.unwrap();
        session.reset();
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_error_user_message() {
        let err = SessionError::from(CompletionError::Transport("reset".into()));
        assert_eq!(err.user_message(), FAILURE_NOTICE);
    }

    #[test]
    fn test_from_config() {
        let session = ChatSession::from_config(&CompanionConfig::new("key")).unwrap();
        assert!(session.transcript().is_empty());
    }
}
