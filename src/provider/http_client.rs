//! Shared HTTP policy for provider clients.
//!
//! Every provider builds its client here so connect timeouts, compression and
//! the User-Agent stay consistent, and every call goes through
//! [`fetch_json`], which applies the per-call time box and the
//! status/garbage/embedded-error checks.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::user_agent;

use super::ProviderError;

/// Per-call bound applied to every provider request.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Builds a provider HTTP client using shared project policy.
///
/// `provider` is only used for error messages.
///
/// # Errors
///
/// Returns [`ProviderError::ClientSetup`] when client construction fails.
pub fn build_provider_http_client(
    provider: &str,
    call_timeout: Duration,
) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(call_timeout))
        // Backstop only; `fetch_json` enforces the real bound.
        .timeout(call_timeout.saturating_add(Duration::from_secs(1)))
        .user_agent(user_agent::default_provider_user_agent())
        .gzip(true)
        .build()
        .map_err(|e| ProviderError::client_setup(provider, &e.to_string()))
}

/// Rejects base URLs that are not absolute http(s) URLs.
///
/// # Errors
///
/// Returns [`ProviderError::ClientSetup`] naming the offending value.
pub fn check_base_url(provider: &str, base_url: &str) -> Result<(), ProviderError> {
    match Url::parse(base_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ProviderError::client_setup(
            provider,
            &format!("unsupported scheme '{}' in '{base_url}'", url.scheme()),
        )),
        Err(e) => Err(ProviderError::client_setup(
            provider,
            &format!("invalid base URL '{base_url}': {e}"),
        )),
    }
}

/// Builds `{base}{path}?k=v&...` with percent-encoded values.
///
/// # Errors
///
/// Returns [`ProviderError::ClientSetup`] when the result is not a valid URL
/// (a misconfigured base URL).
pub fn endpoint_url(
    provider: &str,
    base_url: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, ProviderError> {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let raw = format!("{}{path}?{query}", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| {
        ProviderError::client_setup(provider, &format!("invalid endpoint '{base_url}': {e}"))
    })
}

/// GETs `url` and returns the parsed JSON body.
///
/// # Errors
///
/// - [`ProviderError::Timeout`] if the call exceeds `call_timeout`
/// - [`ProviderError::Network`] on transport failure
/// - [`ProviderError::HttpStatus`] on a non-success status
/// - [`ProviderError::Malformed`] if the body is not JSON
/// - [`ProviderError::Upstream`] if the JSON embeds an `error` field
pub async fn fetch_json(
    client: &Client,
    provider: &str,
    url: Url,
    call_timeout: Duration,
) -> Result<Value, ProviderError> {
    let host = url.host_str().unwrap_or_default().to_string();
    debug!(provider, host = %host, path = url.path(), "Calling provider");

    let call = async {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::network(provider, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::http_status(provider, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::network(provider, &e.to_string()))
    };

    let body = tokio::time::timeout(call_timeout, call)
        .await
        .map_err(|_| ProviderError::timeout(provider, call_timeout))??;

    let value: Value = serde_json::from_str(&body)
        .map_err(|e| ProviderError::malformed(provider, &format!("body is not JSON: {e}")))?;

    if let Some(message) = upstream_error(&value) {
        return Err(ProviderError::upstream(provider, &message));
    }
    Ok(value)
}

/// Extracts the message of an `{ "error": ... }` payload, if present.
///
/// Mirrors answer HTTP 200 with an error object when their own upstream is
/// blocked; the official API nests `{ error: { message } }`.
#[must_use]
pub fn upstream_error(value: &Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), ToString::to_string),
        ),
        other => Some(other.to_string()),
    }
}
