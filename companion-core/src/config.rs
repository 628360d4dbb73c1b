//! Companion configuration, read from the environment.

use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// System instruction used when `COMPANION_PERSONA` is not set.
pub const DEFAULT_PERSONA: &str = "You are a compassionate, non-clinical student peer. \
Use supportive language. Keep responses under 3 sentences. Do not give medical advice.";

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "COMPANION_MODEL";
pub const API_BASE_VAR: &str = "COMPANION_API_BASE";
pub const PERSONA_VAR: &str = "COMPANION_PERSONA";
pub const TEMPERATURE_VAR: &str = "COMPANION_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "COMPANION_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "COMPANION_TIMEOUT_SECS";

/// Errors from loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No API key configured - set the GEMINI_API_KEY environment variable")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything needed to build a session against the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionConfig {
    /// Credential for the completion service.
    pub api_key: String,

    /// Model identifier.
    pub model: String,

    /// Service base URL.
    pub api_base: String,

    /// System instruction describing how the companion speaks.
    pub persona: String,

    /// Sampling temperature; service default when unset.
    pub temperature: Option<f32>,

    /// Cap on generated tokens; service default when unset.
    pub max_output_tokens: Option<u32>,

    /// Client-side request deadline. No deadline when unset.
    pub timeout_secs: Option<u64>,
}

impl CompanionConfig {
    /// Config with the given key and every other setting at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            temperature: None,
            max_output_tokens: None,
            timeout_secs: None,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key.trim());

        if let Some(model) = get(MODEL_VAR) {
            config.model = model.trim().to_string();
        }
        if let Some(base) = get(API_BASE_VAR) {
            config.api_base = base.trim().to_string();
        }
        if let Some(persona) = get(PERSONA_VAR) {
            config.persona = persona;
        }
        config.temperature = parse_opt(TEMPERATURE_VAR, get(TEMPERATURE_VAR))?;
        config.max_output_tokens = parse_opt(MAX_TOKENS_VAR, get(MAX_TOKENS_VAR))?;
        config.timeout_secs = parse_opt(TIMEOUT_VAR, get(TIMEOUT_VAR))?;

        if let Some(t) = config.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid {
                    key: TEMPERATURE_VAR,
                    value: t.to_string(),
                });
            }
        }
        if config.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                key: TIMEOUT_VAR,
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

fn parse_opt<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
