//! Conversation pipeline for a student mental health companion.
//!
//! This crate provides:
//! - A crisis gate that short-circuits with fixed hotline resources
//! - Sentiment scoring and empathetic reply prefixes
//! - Transcript storage and translation into the remote service's history shape
//! - A completion capability with a Gemini-backed implementation
//!
//! # Quick Start
//!
//! ```ignore
//! use companion_core::{ChatSession, CompanionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CompanionConfig::from_env()?;
//!     let mut session = ChatSession::from_config(&config)?;
//!
//!     let reply = session.send("Exams have me really stressed").await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod config;
pub mod history;
pub mod prefix;
pub mod resources;
pub mod safety;
pub mod sentiment;
pub mod session;
pub mod testing;
pub mod transcript;

// Primary public API
pub use completion::{Completion, CompletionClient, CompletionError, GeminiCompletion};
pub use config::{CompanionConfig, ConfigError};
pub use history::{translate, HistoryEntry, HistoryRole};
pub use prefix::select_prefix;
pub use resources::{BreathPhase, BreathingExercise, Hotline, FOUR_SEVEN_EIGHT, HOTLINES};
pub use safety::{crisis_response, CrisisDetector};
pub use sentiment::{LexiconSentiment, SentimentEstimator};
pub use session::{
    ChatSession, Reply, ReplyKind, SessionError, FAILURE_NOTICE, REFUSAL_RESPONSE,
};
pub use testing::{FixedSentiment, MockCompletion, TestHarness};
pub use transcript::{Role, Transcript, Turn};
