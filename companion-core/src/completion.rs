//! The completion capability and its Gemini-backed implementation.

use crate::config::CompanionConfig;
use crate::history::{HistoryEntry, HistoryRole};
use async_trait::async_trait;
use gemini::{Content, Gemini, Request};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Outcome of a successful round-trip to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The model produced text.
    Generated(String),
    /// The service withheld content under its safety policy.
    Filtered { reason: Option<String> },
}

/// Why a completion could not be obtained.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("client misconfigured: {0}")]
    Configuration(String),
}

impl From<gemini::Error> for CompletionError {
    fn from(err: gemini::Error) -> Self {
        match err {
            gemini::Error::Timeout => CompletionError::Timeout,
            gemini::Error::Network(msg) => CompletionError::Transport(msg),
            gemini::Error::Api { status: 429, message } => CompletionError::Quota(message),
            gemini::Error::Api { status, message } => CompletionError::Service { status, message },
            gemini::Error::Parse(msg) => CompletionError::Malformed(msg),
            gemini::Error::NoApiKey => CompletionError::Configuration("missing API key".into()),
            gemini::Error::Config(msg) => CompletionError::Configuration(msg),
        }
    }
}

/// Something that can continue a conversation.
///
/// `history` holds the prior turns only; `message` is the new user text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        history: &[HistoryEntry],
        message: &str,
    ) -> Result<Completion, CompletionError>;
}

/// [`CompletionClient`] backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiCompletion {
    client: Gemini,
    persona: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiCompletion {
    pub fn new(client: Gemini, persona: impl Into<String>) -> Self {
        Self {
            client,
            persona: persona.into(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Build a client from configuration: key, model, endpoint, persona,
    /// generation settings and the optional request timeout.
    pub fn from_config(config: &CompanionConfig) -> Result<Self, CompletionError> {
        let mut client = Gemini::new(config.api_key.clone())
            .with_model(config.model.clone())
            .with_api_base(config.api_base.clone());
        if let Some(secs) = config.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs))?;
        }

        Ok(Self {
            client,
            persona: config.persona.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    fn build_request(&self, history: &[HistoryEntry], message: &str) -> Request {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|entry| match entry.role {
                HistoryRole::User => Content::user(entry.text()),
                HistoryRole::Model => Content::model(entry.text()),
            })
            .collect();
        contents.push(Content::user(message));

        let mut request = Request::new(contents);
        if !self.persona.is_empty() {
            request = request.with_system_instruction(self.persona.clone());
        }
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }
        if let Some(n) = self.max_output_tokens {
            request = request.with_max_output_tokens(n);
        }
        request
    }
}

#[async_trait]
impl CompletionClient for GeminiCompletion {
    async fn complete(
        &self,
        history: &[HistoryEntry],
        message: &str,
    ) -> Result<Completion, CompletionError> {
        let request = self.build_request(history, message);
        let response = self.client.generate(request).await?;

        if let Some(usage) = response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                candidate_tokens = usage.candidate_tokens,
                "completion usage"
            );
        }

        Ok(match response.text() {
            Some(text) => Completion::Generated(text),
            None => Completion::Filtered {
                reason: response.filter_reason(),
            },
        })
    }
}
