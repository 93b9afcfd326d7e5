//! Pluggable analysis backends.
//!
//! Every backend implements [`AnalysisProvider`]. Backends only differ in
//! the transport call, the model identifier and how the reply envelope is
//! unwrapped; the prompt, the expected JSON shape and the error taxonomy are
//! shared and live here.
//!
//! Backends are looked up by name through the [`ProviderRegistry`], which is
//! built once at startup from the compiled-in registrations.

mod anthropic;
mod http;
mod openai;
mod registry;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use registry::{ProviderRegistration, ProviderRegistry};

/// Default completion budget sent to every backend.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Structured summary returned by an analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub narrative: String,
    pub key_events: Vec<String>,
}

impl AnalysisResult {
    pub fn new(narrative: impl Into<String>, key_events: Vec<String>) -> Self {
        Self {
            narrative: narrative.into(),
            key_events,
        }
    }

    /// Result shown when the run had nothing to send.
    pub fn no_messages() -> Self {
        Self::new("No messages found to analyze.", Vec::new())
    }

    /// Degraded result carrying a provider failure as data.
    pub fn failed(error: &ProviderError) -> Self {
        Self::new(format!("Analysis failed: {}", error), Vec::new())
    }
}

/// Errors that can occur while resolving or calling a backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} support is not available in this build (rebuild with the `{feature}` feature)")]
    Unavailable {
        provider: &'static str,
        feature: &'static str,
    },

    #[error("{var} environment variable not set")]
    MissingCredential { var: &'static str },

    #[error("Unsupported API provider: {0}")]
    Unsupported(String),

    #[error("{provider} request failed: {message}")]
    Backend {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned a reply that could not be parsed: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// True for faults detected before any network activity.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::MissingCredential { .. } | Self::Unsupported(_)
        )
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Per-backend overrides, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    /// No timeout is applied unless set.
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// A text-analysis backend.
///
/// Implementors supply the transport and the envelope unwrapping; the
/// provided [`analyze`](AnalysisProvider::analyze) ties them to the shared
/// prompt and response parsing.
pub trait AnalysisProvider {
    /// Registry name, e.g. `"openai"`.
    fn name(&self) -> &'static str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Send `prompt` and return the raw reply body.
    fn complete(&self, prompt: &str) -> ProviderResult<String>;

    /// Extract the model's text from a raw reply body.
    fn unwrap_reply(&self, body: &str) -> ProviderResult<String>;

    /// Analyze anonymized conversation text.
    fn analyze(&self, request_text: &str) -> ProviderResult<AnalysisResult> {
        let prompt = build_prompt(request_text);
        tracing::debug!(
            provider = self.name(),
            model = self.model(),
            prompt_bytes = prompt.len(),
            "sending analysis request"
        );
        let body = self.complete(&prompt)?;
        let reply = self.unwrap_reply(&body)?;
        parse_analysis(self.name(), &reply)
    }
}

/// The prompt every backend receives around the request text.
pub fn build_prompt(request_text: &str) -> String {
    format!(
        r#"Analyze the following text messages and provide:
1. A 300-word narrative summary of the user's general life/activities
2. A list of special one-off events or notable moments

Messages:
{request_text}

Format your response as JSON, and respond with only this JSON object:
{{
    "narrative": "300-word summary here...",
    "key_events": ["event 1", "event 2", "event 3"]
}}
"#
    )
}

#[derive(Deserialize)]
struct WireAnalysis {
    narrative: String,
    key_events: Vec<String>,
}

impl From<WireAnalysis> for AnalysisResult {
    fn from(wire: WireAnalysis) -> Self {
        Self::new(wire.narrative, wire.key_events)
    }
}

/// Parse a model reply into an [`AnalysisResult`].
///
/// Accepts the JSON object on its own, inside a fenced code block, or
/// embedded in surrounding prose.
pub fn parse_analysis(provider: &'static str, reply: &str) -> ProviderResult<AnalysisResult> {
    let mut last_error = match serde_json::from_str::<WireAnalysis>(reply.trim()) {
        Ok(wire) => return Ok(wire.into()),
        Err(e) => e.to_string(),
    };

    for candidate in [fenced_block(reply), brace_span(reply)].into_iter().flatten() {
        match serde_json::from_str::<WireAnalysis>(candidate) {
            Ok(wire) => return Ok(wire.into()),
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(ProviderError::MalformedResponse {
        provider,
        message: last_error,
    })
}

/// Body of the first ``` fenced block, with an optional language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Span from the first `{` to the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
