//! Minimal Gemini API client.
//!
//! This crate provides a focused client for the `generateContent` endpoint with:
//! - Multi-turn conversations (`user` / `model` roles)
//! - System instructions and generation settings
//! - Safety-block detection on responses

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else if e.is_decode() {
            Error::Parse(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    ///
    /// The underlying HTTP client has no request deadline; use
    /// [`Gemini::with_timeout`] to add one.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API base URL (proxies, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Rebuild the HTTP client with a total request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    /// The model requests are sent to when [`Request::model`] is unset.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a generateContent request and return the full response.
    pub async fn generate(&self, request: Request) -> Result<Response, Error> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = build_api_request(&request);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.api_base))
            .headers(headers)
            .json(&api_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: api_error_message(&body),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        if self.api_key.is_empty() {
            return Err(Error::NoApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A generateContent request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub model: Option<String>,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Request {
    /// Create a new request with the given conversation contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// One turn of the conversation as the API sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model turn with text content.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }
}

/// The role of a content author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A text part of a content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A generateContent response.
#[derive(Debug, Clone)]
pub struct Response {
    pub candidates: Vec<Candidate>,
    pub block_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl Response {
    /// Text of the first candidate, concatenated across its parts.
    ///
    /// Returns `None` when the service produced no text at all (blocked
    /// prompt, safety stop, or an empty candidate list).
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        if candidate.parts.is_empty() {
            return None;
        }
        let text: String = candidate.parts.iter().map(|p| p.text.as_str()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why no content was produced, if the service said so.
    pub fn filter_reason(&self) -> Option<String> {
        if let Some(ref reason) = self.block_reason {
            return Some(reason.clone());
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason)
            .filter(|r| r.is_filter())
            .map(|r| format!("{r:?}"))
    }
}

/// A single generated candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Other,
}

impl FinishReason {
    /// Whether this reason means the content was withheld by a filter.
    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
        )
    }

    fn parse(s: &str) -> Self {
        match s {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" => FinishReason::Safety,
            "RECITATION" => FinishReason::Recitation,
            "BLOCKLIST" => FinishReason::Blocklist,
            "PROHIBITED_CONTENT" => FinishReason::ProhibitedContent,
            _ => FinishReason::Other,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub candidate_tokens: usize,
    pub total_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction>,
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn build_api_request(request: &Request) -> ApiRequest {
    let contents = request
        .contents
        .iter()
        .map(|c| ApiContent {
            role: Some(c.role.as_str().to_string()),
            parts: c
                .parts
                .iter()
                .map(|p| ApiPart {
                    text: Some(p.text.clone()),
                })
                .collect(),
        })
        .collect();

    let generation_config =
        if request.temperature.is_some() || request.max_output_tokens.is_some() {
            Some(ApiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            })
        } else {
            None
        };

    ApiRequest {
        system_instruction: request.system_instruction.as_ref().map(|s| {
            ApiSystemInstruction {
                parts: vec![ApiPart {
                    text: Some(s.clone()),
                }],
            }
        }),
        contents,
        generation_config,
    }
}

fn parse_response(body: &str) -> Result<Response, Error> {
    let api_response: ApiResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;

    let candidates = api_response
        .candidates
        .into_iter()
        .map(|c| Candidate {
            parts: c
                .content
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .filter_map(|p| p.text.map(Part::text))
                        .collect()
                })
                .unwrap_or_default(),
            finish_reason: c.finish_reason.as_deref().map(FinishReason::parse),
        })
        .collect();

    Ok(Response {
        candidates,
        block_reason: api_response.prompt_feedback.and_then(|f| f.block_reason),
        usage: api_response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            candidate_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }),
    })
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.api_base, API_BASE);
    }

    #[test]
    fn test_client_with_model_and_base() {
        let client = Gemini::new("test-key")
            .with_model("gemini-1.5-pro")
            .with_api_base("http://localhost:8080/v1beta/");
        assert_eq!(client.model(), "gemini-1.5-pro");
        assert_eq!(client.api_base, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_empty_key_rejected_at_request_time() {
        let client = Gemini::new("");
        assert!(matches!(client.build_headers(), Err(Error::NoApiKey)));
    }

    #[test]
    fn test_request_serialization() {
        let request = Request::new(vec![
            Content::user("hi"),
            Content::model("hello!"),
            Content::user("how are you?"),
        ])
        .with_system_instruction("Be kind.")
        .with_temperature(0.5);

        let value = serde_json::to_value(build_api_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "systemInstruction": { "parts": [{ "text": "Be kind." }] },
                "contents": [
                    { "role": "user", "parts": [{ "text": "hi" }] },
                    { "role": "model", "parts": [{ "text": "hello!" }] },
                    { "role": "user", "parts": [{ "text": "how are you?" }] }
                ],
                "generationConfig": { "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn test_request_without_settings_omits_config() {
        let value = serde_json::to_value(build_api_request(&Request::new(vec![Content::user(
            "hi",
        )])))
        .unwrap();
        assert!(value.get("generationConfig").is_none());
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_generated_response() {
        let body = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Glad " }, { "text": "to hear it!" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17 }
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Glad to hear it!"));
        assert_eq!(response.filter_reason(), None);
        assert_eq!(response.usage.unwrap().total_tokens, 17);
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let body = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        let response = parse_response(body).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.filter_reason().as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_parse_safety_finish_without_parts() {
        let body = r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#;
        let response = parse_response(body).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.filter_reason().as_deref(), Some("Safety"));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(parse_response("<html>"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{ "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" } }"#;
        assert_eq!(api_error_message(body), "Quota exceeded");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_generate() {
        let Ok(client) = Gemini::from_env() else {
            eprintln!("Skipping test: GEMINI_API_KEY not set");
            return;
        };
        let response = client
            .generate(Request::new(vec![Content::user("Say hello in one word.")]))
            .await
            .unwrap();
        assert!(response.text().is_some());
    }
}
