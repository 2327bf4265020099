//! Google Gemini chat-completion adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::http::json_headers;
use super::unary::{parse_body, send_checked, UnaryState, PARSE_FAILURE_MESSAGE};
use super::{CallbackSet, ProviderAdapter};
use crate::config::{ModelKind, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};

const VENDOR: &str = "Google Gemini";

/// Adapter for the Gemini `generateContent` endpoint.
pub struct GeminiAdapter {
    state: UnaryState,
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self {
            state: UnaryState::new(ProviderKind::Google),
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.state.config.base_url.trim_end_matches('/'),
            self.state.config.model_name
        )
    }

    fn process_response(&self, body: &str) {
        let response: GeminiResponse = match parse_body("Gemini", body) {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "failed to parse response");
                self.state.callbacks.emit_error(PARSE_FAILURE_MESSAGE);
                return;
            }
        };

        if let Some(candidate) = response.candidates.first() {
            let text = candidate
                .content
                .as_ref()
                .and_then(|content| content.parts.first())
                .and_then(|part| part.text.clone());
            if let Some(text) = text {
                self.state.callbacks.emit_text(text);
            }
        } else if let Some(message) = response.error.and_then(|error| error.message) {
            tracing::warn!(%message, "Gemini reported an error");
            self.state.callbacks.emit_error(message);
        }
    }
}

/// Request body: one user turn plus an optional system instruction.
pub fn build_request_body(text: &str, system_prompt: &str) -> Value {
    let mut body = json!({
        "contents": [{ "parts": [{ "text": text }] }],
    });
    if !system_prompt.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system_prompt }] });
    }
    body
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
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
        self.state.initialize(config, "Google")
    }

    async fn connect(&mut self) -> Result<()> {
        self.state
            .connect(json_headers(), "Connected to Google Gemini")
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
        let body = build_request_body(text, &config.system_prompt);

        debug!(model = %config.model_name, "Gemini generateContent");
        let request = client
            .post(self.request_url())
            .query(&[("key", config.api_key.as_str())])
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
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: Option<String>,
}
