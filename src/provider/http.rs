//! Blocking HTTP plumbing shared by the remote backends.

use reqwest::blocking::{Client, RequestBuilder};

use super::{ProviderError, ProviderResult, ProviderSettings};

/// Build a blocking client honouring the configured timeout.
///
/// reqwest applies a 30s default; without a configured timeout the request
/// may block indefinitely.
pub(crate) fn build_client(
    provider: &'static str,
    settings: &ProviderSettings,
) -> ProviderResult<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| ProviderError::Backend {
            provider,
            message: format!("failed to initialize HTTP client: {}", e),
        })
}

/// Send a prepared request and return the body of a successful response.
///
/// Transport failures and non-success statuses both map to
/// [`ProviderError::Backend`]; the error body is kept for diagnosis.
pub(crate) fn send(provider: &'static str, request: RequestBuilder) -> ProviderResult<String> {
    let response = request.send().map_err(|e| ProviderError::Backend {
        provider,
        message: format!("network error: {}", e),
    })?;

    let status = response.status();
    let body = response.text().map_err(|e| ProviderError::Backend {
        provider,
        message: format!("failed to read response body: {}", e),
    })?;

    if !status.is_success() {
        tracing::warn!(provider, %status, "backend returned an error status");
        return Err(ProviderError::Backend {
            provider,
            message: format!("HTTP {}: {}", status, body.trim()),
        });
    }

    Ok(body)
}

/// Join a base URL and an API path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
