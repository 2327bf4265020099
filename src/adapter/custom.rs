//! Placeholder adapter for self-hosted endpoints.
//!
//! Connection bookkeeping works, but no wire protocol is attached yet: both
//! send paths refuse with [`VoxError::UnsupportedOperation`] instead of
//! pretending to deliver.

use async_trait::async_trait;

use super::{require_connected, require_initialized, AdapterSession, CallbackSet, ProviderAdapter};
use crate::config::{ModelKind, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};

pub struct CustomAdapter {
    config: ProviderConfig,
    initialized: bool,
    session: AdapterSession,
    callbacks: CallbackSet,
}

impl Default for CustomAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomAdapter {
    pub fn new() -> Self {
        Self {
            config: ProviderConfig::default(),
            initialized: false,
            session: AdapterSession::new(),
            callbacks: CallbackSet::new(),
        }
    }

    fn not_wired(&self, operation: &str) -> Result<()> {
        require_connected(&self.session, ProviderKind::Custom)?;
        tracing::warn!(url = %self.config.endpoint_url(), "custom endpoint {operation} is not implemented");
        Err(VoxError::UnsupportedOperation(format!(
            "custom endpoint {operation} is not implemented"
        )))
    }
}

#[async_trait]
impl ProviderAdapter for CustomAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    /// Socket-style URLs imply a realtime backend.
    fn model_kind(&self) -> ModelKind {
        let url = self.config.base_url.as_str();
        if url.contains("websocket") || url.starts_with("ws://") || url.starts_with("wss://") {
            ModelKind::Realtime
        } else {
            ModelKind::ChatCompletion
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn callbacks(&self) -> &CallbackSet {
        &self.callbacks
    }

    fn initialize(&mut self, config: ProviderConfig) -> Result<()> {
        if config.base_url.trim().is_empty() {
            return Err(VoxError::Configuration("Custom server URL is required".into()));
        }
        self.config = config;
        self.initialized = true;
        Ok(())
    }

    async fn connect(&mut self) -> Result<()> {
        require_initialized(self.initialized, ProviderKind::Custom)?;
        if self.session.is_connected() {
            return Ok(());
        }
        self.session.mark_connected();
        self.callbacks.emit_status("Connected to custom server");
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.session.reset();
    }

    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    async fn send_text(&self, _text: &str) -> Result<()> {
        self.not_wired("text sending")
    }

    async fn send_audio(&self, _audio: &[u8]) -> Result<()> {
        self.not_wired("audio sending")
    }

    async fn start_voice_session(&mut self) -> Result<()> {
        require_connected(&self.session, ProviderKind::Custom)?;
        self.session.set_voice_session_active(true);
        Ok(())
    }

    async fn stop_voice_session(&mut self) -> Result<()> {
        self.session.set_voice_session_active(false);
        Ok(())
    }
}
