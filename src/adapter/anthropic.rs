//! Anthropic Claude chat-completion adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::http::anthropic_headers;
use super::unary::{parse_body, send_checked, UnaryState, PARSE_FAILURE_MESSAGE};
use super::{CallbackSet, ProviderAdapter};
use crate::config::{ModelKind, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};

const VENDOR: &str = "Anthropic Claude";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Adapter for the Claude Messages API. Each `send_text` is one independent
/// single-turn request; no history is kept between calls.
pub struct ClaudeAdapter {
    state: UnaryState,
}

impl Default for ClaudeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeAdapter {
    pub fn new() -> Self {
        Self {
            state: UnaryState::new(ProviderKind::Anthropic),
        }
    }

    fn process_response(&self, body: &str) {
        let response: ClaudeResponse = match parse_body("Claude", body) {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "failed to parse response");
                self.state.callbacks.emit_error(PARSE_FAILURE_MESSAGE);
                return;
            }
        };

        if let Some(block) = response.content.first() {
            if let Some(text) = &block.text {
                self.state.callbacks.emit_text(text.clone());
            }
        } else if let Some(message) = response.error.and_then(|error| error.message) {
            tracing::warn!(%message, "Claude reported an error");
            self.state.callbacks.emit_error(message);
        }
    }
}

/// Request body for a single user turn.
pub fn build_request_body(model: &str, text: &str, system_prompt: &str) -> Value {
    let mut body = json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "messages": [{ "role": "user", "content": text }],
    });
    if !system_prompt.is_empty() {
        body["system"] = Value::String(system_prompt.to_string());
    }
    body
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model_kind(&self) -> ModelKind {
        ModelKind::ChatCompletion
    }

    fn config(&self) -> &ProviderConfig {
        &self.state.config
    }

    fn callbacks(&self) -> &CallbackSet {
        &self.state.callbacks
    }

    fn initialize(&mut self, config: ProviderConfig) -> Result<()> {
        self.state.initialize(config, "Anthropic")
    }

    async fn connect(&mut self) -> Result<()> {
        let headers = anthropic_headers(&self.state.config.api_key, API_VERSION)?;
        self.state.connect(headers, "Connected to Anthropic Claude")
    }

    async fn disconnect(&mut self) {
        self.state.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let client = self.state.client()?;
        let config = &self.state.config;
        let body = build_request_body(&config.model_name, text, &config.system_prompt);

        debug!(model = %config.model_name, "Claude messages request");
        let request = client
            .post(config.endpoint_url())
            .query(&config.extra_parameters)
            .json(&body);
        let response = send_checked(request).await?;

        self.process_response(&response);
        Ok(())
    }

    async fn send_audio(&self, _audio: &[u8]) -> Result<()> {
        Err(self.state.reject_audio(VENDOR))
    }

    async fn start_voice_session(&mut self) -> Result<()> {
        Err(VoxError::UnsupportedOperation(format!(
            "{VENDOR} has no realtime voice session"
        )))
    }

    async fn stop_voice_session(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: Option<String>,
}
