//! HTTP plumbing shared by the request/response adapters.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::{Result, VoxError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Base headers every JSON request carries.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Anthropic-style headers (`x-api-key` plus a version marker).
pub fn anthropic_headers(api_key: &str, version: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    headers.insert("x-api-key", header_value(api_key)?);
    headers.insert("anthropic-version", header_value(version)?);
    Ok(headers)
}

/// Merge caller-configured headers; configured values win over built-ins.
pub fn apply_extra_headers(headers: &mut HeaderMap, extra: &HashMap<String, String>) -> Result<()> {
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| VoxError::Configuration(format!("Invalid header name '{name}': {e}")))?;
        headers.insert(name, header_value(value)?);
    }
    Ok(())
}

/// Build a client with fixed default headers. No network traffic happens here.
pub fn build_client(headers: HeaderMap) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(VoxError::from)
}

/// Map a non-success HTTP status into an error.
pub fn status_to_error(status: u16, body: &str) -> VoxError {
    match status {
        401 | 403 => VoxError::Authentication(body.to_string()),
        _ => VoxError::api(status, body),
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| VoxError::Configuration(format!("Invalid header value: {e}")))
}
