//! Shared HTTP plumbing for the shipped adapters

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};

use super::unified_provider::ProviderError;

/// User agent sent with every provider request
pub const USER_AGENT: &str = concat!("llm-batch/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client an adapter keeps for its lifetime
pub fn build_http_client(
    provider: &'static str,
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<Client, ProviderError> {
    ClientBuilder::new()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::configuration(provider, format!("Failed to create HTTP client: {}", e)))
}

/// Join a base URL and an endpoint path without doubling the slash
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// The configured API key, or an authentication error when there is none
pub fn require_api_key<'a>(
    provider: &'static str,
    api_key: Option<&'a str>,
) -> Result<&'a str, ProviderError> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ProviderError::authentication(
            provider,
            "API key is not configured",
        )),
    }
}

/// Map a transport-level failure
pub fn map_send_error(provider: &'static str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, err.to_string())
    } else {
        ProviderError::network(provider, format!("Network error: {}", err))
    }
}

/// Read the response body, turning any non-success status into an error
pub async fn read_body(provider: &'static str, response: Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(provider, format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(ProviderError::from_http_status(provider, status.as_u16(), &body));
    }
    Ok(body)
}
