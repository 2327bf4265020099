//! State and request plumbing shared by the request/response adapters.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::http::{apply_extra_headers, build_client, status_to_error};
use super::{require_connected, require_initialized, AdapterSession, CallbackSet};
use crate::config::{default_model_name, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};

/// Generic message reported when a 200 response body cannot be understood.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response";

/// "Connected" here only means a client with fixed headers exists; no request
/// is made until the first `send_text`.
pub(crate) struct UnaryState {
    provider: ProviderKind,
    pub(crate) config: ProviderConfig,
    initialized: bool,
    session: AdapterSession,
    pub(crate) callbacks: CallbackSet,
    client: Option<reqwest::Client>,
}

impl UnaryState {
    pub(crate) fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            config: ProviderConfig::default(),
            initialized: false,
            session: AdapterSession::new(),
            callbacks: CallbackSet::new(),
            client: None,
        }
    }

    pub(crate) fn initialize(&mut self, mut config: ProviderConfig, vendor: &str) -> Result<()> {
        if config.api_key.trim().is_empty() {
            return Err(VoxError::Configuration(format!("{vendor} API key is required")));
        }
        if config.model_name.is_empty() {
            config.model_name = default_model_name(self.provider)
                .unwrap_or_default()
                .to_string();
        }
        self.config = config;
        self.initialized = true;
        Ok(())
    }

    pub(crate) fn connect(&mut self, mut headers: HeaderMap, status: &str) -> Result<()> {
        require_initialized(self.initialized, self.provider)?;
        if self.session.is_connected() {
            return Ok(());
        }
        apply_extra_headers(&mut headers, &self.config.extra_headers)?;
        self.client = Some(build_client(headers)?);
        self.session.mark_connected();
        tracing::info!(provider = %self.provider, model = %self.config.model_name, "adapter ready");
        self.callbacks.emit_status(status);
        Ok(())
    }

    pub(crate) fn disconnect(&mut self) {
        self.client = None;
        self.session.reset();
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// The request client, provided the adapter is connected.
    pub(crate) fn client(&self) -> Result<&reqwest::Client> {
        require_connected(&self.session, self.provider)?;
        self.client.as_ref().ok_or_else(|| {
            VoxError::NotConnected(format!("{} adapter has no request client", self.provider))
        })
    }

    /// These backends take no audio: warn, report a status, and refuse.
    pub(crate) fn reject_audio(&self, vendor: &str) -> VoxError {
        let message = format!("{vendor} does not support real-time audio");
        tracing::warn!(provider = %self.provider, "{message}");
        self.callbacks.emit_status(message.clone());
        VoxError::UnsupportedOperation(message)
    }
}

/// Issue one request; anything but HTTP 200 is an error.
///
/// Transport errors lose their URL: some endpoints carry the credential in
/// the query string.
pub(crate) async fn send_checked(request: reqwest::RequestBuilder) -> Result<String> {
    let resp = request.send().await.map_err(redact)?;
    let status = resp.status().as_u16();
    if status != 200 {
        let body_text = resp.text().await.unwrap_or_default();
        tracing::error!(status, "request failed");
        return Err(status_to_error(status, &body_text));
    }
    resp.text().await.map_err(redact)
}

fn redact(error: reqwest::Error) -> VoxError {
    VoxError::Network(error.without_url())
}

/// Decode a 200 response body into the vendor's response shape.
pub(crate) fn parse_body<T: DeserializeOwned>(vendor: &str, body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|error| VoxError::ProtocolParse(format!("{vendor} response: {error}")))
}
