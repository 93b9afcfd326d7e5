//! OpenAI chat-completions backend.

use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{build_client, endpoint, send};
use super::registry::ProviderRegistration;
use super::{AnalysisProvider, ProviderError, ProviderResult, ProviderSettings};

const NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4";
const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

/// Registration entry for the registry.
pub(crate) fn registration() -> ProviderRegistration {
    ProviderRegistration {
        name: NAME,
        feature: "openai",
        credential_var: CREDENTIAL_VAR,
        #[cfg(feature = "openai")]
        constructor: Some(construct),
        #[cfg(not(feature = "openai"))]
        constructor: None,
    }
}

#[cfg(feature = "openai")]
fn construct(
    api_key: String,
    settings: &ProviderSettings,
) -> ProviderResult<Box<dyn AnalysisProvider>> {
    Ok(Box::new(OpenAiProvider::new(api_key, settings)?))
}

/// Backend for `POST /v1/chat/completions`.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiProvider {
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
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl AnalysisProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": self.max_tokens,
        });

        let request = self
            .client
            .post(endpoint(&self.base_url, "/v1/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&payload);
        send(NAME, request)
    }

    fn unwrap_reply(&self, body: &str) -> ProviderResult<String> {
        let response: ChatResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
                provider: NAME,
                message: format!("unexpected response envelope: {}", e),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: NAME,
                message: "response has no message content".to_string(),
            })
    }
}
