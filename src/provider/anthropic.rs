//! Anthropic messages backend.

use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{build_client, endpoint, send};
use super::registry::ProviderRegistration;
use super::{AnalysisProvider, ProviderError, ProviderResult, ProviderSettings};

const NAME: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const CREDENTIAL_VAR: &str = "ANTHROPIC_API_KEY";
const API_VERSION: &str = "2023-06-01";

pub(crate) fn registration() -> ProviderRegistration {
    ProviderRegistration {
        name: NAME,
        feature: "anthropic",
        credential_var: CREDENTIAL_VAR,
        #[cfg(feature = "anthropic")]
        constructor: Some(construct),
        #[cfg(not(feature = "anthropic"))]
        constructor: None,
    }
}

#[cfg(feature = "anthropic")]
fn construct(
    api_key: String,
    settings: &ProviderSettings,
) -> ProviderResult<Box<dyn AnalysisProvider>> {
    Ok(Box::new(AnthropicProvider::new(api_key, settings)?))
}

/// Backend for `POST /v1/messages`.
///
/// The reply carries a list of content blocks; the first text block holds
/// the analysis.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: String, settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self {
            client: build_client(NAME, settings)?,
            api_key,
            model: settings.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: settings.max_tokens(),
        })
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}

impl AnalysisProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        });

        let request = self
            .client
            .post(endpoint(&self.base_url, "/v1/messages"))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload);
        send(NAME, request)
    }

    fn unwrap_reply(&self, body: &str) -> ProviderResult<String> {
        let response: MessagesResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
                provider: NAME,
                message: format!("unexpected response envelope: {}", e),
            })?;

        response
            .content
            .into_iter()
            .filter(|block| block.kind.as_deref().map_or(true, |k| k == "text"))
            .find_map(|block| block.text)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: NAME,
                message: "response has no text content".to_string(),
            })
    }
}
