//! Provider adapters: one uniform connect/send/receive contract over very
//! different backends.
//!
//! Each adapter follows the same lifecycle: `initialize` validates the
//! configuration, `connect` makes the adapter ready to send, and `disconnect`
//! releases everything. `connect` and `disconnect` are idempotent.
//! Asynchronous results (replies, errors, status) arrive through the
//! callbacks registered with the `set_on_*` methods; register them before
//! `connect` so no early event is missed.

pub mod callbacks;
pub mod custom;
pub mod http;
pub mod session;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "openai")]
pub mod realtime_events;
#[cfg(any(feature = "google", feature = "anthropic"))]
mod unary;

pub use callbacks::{
    AudioCallback, CallbackSet, CallbackSlot, ErrorCallback, StatusCallback, TextCallback,
};
pub use custom::CustomAdapter;
pub use session::AdapterSession;

#[cfg(feature = "anthropic")]
pub use anthropic::ClaudeAdapter;
#[cfg(feature = "google")]
pub use google::GeminiAdapter;
#[cfg(feature = "openai")]
pub use openai::OpenAiRealtimeAdapter;

use std::fmt;

use async_trait::async_trait;

use crate::config::{ModelKind, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};

/// Uniform contract every backend adapter implements.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Which send paths are legal: realtime adapters accept audio,
    /// chat-completion adapters accept text only.
    fn model_kind(&self) -> ModelKind;

    fn config(&self) -> &ProviderConfig;

    fn callbacks(&self) -> &CallbackSet;

    /// Validate and adopt `config`. Fails with a configuration error when a
    /// required field is missing.
    fn initialize(&mut self, config: ProviderConfig) -> Result<()>;

    async fn connect(&mut self) -> Result<()>;

    /// Release the connection, clear the session id and voice-session flag.
    /// Safe to call at any time.
    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_audio(&self, audio: &[u8]) -> Result<()>;

    async fn start_voice_session(&mut self) -> Result<()>;

    async fn stop_voice_session(&mut self) -> Result<()>;

    fn set_on_text(&self, callback: TextCallback) {
        self.callbacks().set_text(callback);
    }

    fn set_on_audio(&self, callback: AudioCallback) {
        self.callbacks().set_audio(callback);
    }

    fn set_on_error(&self, callback: ErrorCallback) {
        self.callbacks().set_error(callback);
    }

    fn set_on_status(&self, callback: StatusCallback) {
        self.callbacks().set_status(callback);
    }
}

/// Outcome of adapter selection. `Native` means the device keeps its own
/// protocol and no adapter is involved; it is not an error.
pub enum AdapterSelection {
    Native,
    Adapter(Box<dyn ProviderAdapter>),
}

impl fmt::Debug for AdapterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("Native"),
            Self::Adapter(adapter) => f.debug_tuple("Adapter").field(&adapter.provider()).finish(),
        }
    }
}

/// Create the (uninitialized) adapter for `provider`.
pub fn create_adapter(provider: ProviderKind) -> Result<AdapterSelection> {
    let adapter: Box<dyn ProviderAdapter> = match provider {
        ProviderKind::Native => return Ok(AdapterSelection::Native),
        #[cfg(feature = "openai")]
        ProviderKind::OpenAi => Box::new(OpenAiRealtimeAdapter::new()),
        #[cfg(feature = "google")]
        ProviderKind::Google => Box::new(GeminiAdapter::new()),
        #[cfg(feature = "anthropic")]
        ProviderKind::Anthropic => Box::new(ClaudeAdapter::new()),
        ProviderKind::Custom => Box::new(CustomAdapter::new()),
        #[allow(unreachable_patterns)]
        other => {
            return Err(VoxError::Configuration(format!(
                "Provider '{other}' is not enabled in this build"
            )))
        }
    };
    Ok(AdapterSelection::Adapter(adapter))
}

pub(crate) fn require_initialized(initialized: bool, provider: ProviderKind) -> Result<()> {
    if initialized {
        Ok(())
    } else {
        Err(VoxError::NotInitialized(format!("{provider} adapter is not initialized")))
    }
}

pub(crate) fn require_connected(session: &AdapterSession, provider: ProviderKind) -> Result<()> {
    if session.is_connected() {
        Ok(())
    } else {
        Err(VoxError::NotConnected(format!("{provider} adapter is not connected")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_selects_no_adapter() {
        assert!(matches!(
            create_adapter(ProviderKind::Native).unwrap(),
            AdapterSelection::Native
        ));
    }

    #[test]
    fn each_provider_gets_its_own_adapter() {
        let mut providers = vec![ProviderKind::Custom];
        if cfg!(feature = "openai") {
            providers.push(ProviderKind::OpenAi);
        }
        if cfg!(feature = "google") {
            providers.push(ProviderKind::Google);
        }
        if cfg!(feature = "anthropic") {
            providers.push(ProviderKind::Anthropic);
        }

        for provider in providers {
            match create_adapter(provider).unwrap() {
                AdapterSelection::Adapter(adapter) => {
                    assert_eq!(adapter.provider(), provider);
                    assert!(!adapter.is_connected());
                }
                AdapterSelection::Native => panic!("{provider} should not be native"),
            }
        }
    }
}
