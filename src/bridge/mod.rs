//! Protocol bridge: exposes one provider adapter through the device's generic
//! duplex conversation channel.

pub mod packet;

pub use packet::{ConversationPacket, SYNTHETIC_FRAME_DURATION_MS};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::{create_adapter, AdapterSelection, CallbackSlot, ProviderAdapter};
use crate::config::{load_config, ModelKind, ProviderConfig, ProviderDefaults, SettingsStore};
use crate::error::{Result, VoxError};

/// Callback type for inbound audio packets.
pub type IncomingAudioCallback = Arc<dyn Fn(ConversationPacket) + Send + Sync>;

/// Callback type for inbound text.
pub type IncomingTextCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback type for out-of-band control messages.
pub type ControlMessageCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback type for network/backend errors.
pub type NetworkErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

/// The duplex conversation contract the rest of the device talks to.
///
/// Opening and closing take `&mut self`, so at most one transition is in
/// flight per channel.
#[async_trait]
pub trait ConversationChannel: Send + Sync {
    async fn open_channel(&mut self) -> Result<()>;

    /// Best-effort teardown. Idempotent.
    async fn close_channel(&mut self);

    fn is_channel_open(&self) -> bool;

    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_audio(&self, packet: ConversationPacket) -> Result<()>;

    async fn send_control(&self, payload: &str) -> Result<()>;

    fn on_incoming_audio(&self, callback: IncomingAudioCallback);

    fn on_incoming_text(&self, callback: IncomingTextCallback);

    fn on_control_message(&self, callback: ControlMessageCallback);

    fn on_network_error(&self, callback: NetworkErrorCallback);
}

#[derive(Default)]
struct BridgeCallbacks {
    audio: CallbackSlot<IncomingAudioCallback>,
    text: CallbackSlot<IncomingTextCallback>,
    control: CallbackSlot<ControlMessageCallback>,
    error: CallbackSlot<NetworkErrorCallback>,
}

/// [`ConversationChannel`] backed by exactly one provider adapter, chosen once
/// at construction.
pub struct ProtocolBridge {
    config: ProviderConfig,
    backend: AdapterSelection,
    channel_open: bool,
    voice_session_active: bool,
    callbacks: Arc<BridgeCallbacks>,
}

impl fmt::Debug for ProtocolBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolBridge")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .field("channel_open", &self.channel_open)
            .field("voice_session_active", &self.voice_session_active)
            .finish()
    }
}

impl ProtocolBridge {
    /// Load configuration, then select and initialize the matching adapter.
    ///
    /// A native provider produces a bridge without an adapter. Configuration
    /// problems (for example a missing credential) are returned here.
    pub fn from_store(defaults: &ProviderDefaults, store: &dyn SettingsStore) -> Result<Self> {
        let config = load_config(defaults, store)?;
        let backend = create_adapter(config.provider)?;
        Self::with_backend(config, backend)
    }

    /// Bridge around an explicit adapter, initialized with `config`.
    pub fn with_adapter(config: ProviderConfig, adapter: Box<dyn ProviderAdapter>) -> Result<Self> {
        Self::with_backend(config, AdapterSelection::Adapter(adapter))
    }

    pub fn with_backend(config: ProviderConfig, mut backend: AdapterSelection) -> Result<Self> {
        let callbacks = Arc::new(BridgeCallbacks::default());
        if let AdapterSelection::Adapter(adapter) = &mut backend {
            adapter.initialize(config.clone()).map_err(|error| {
                tracing::error!(%error, provider = %config.provider, "failed to initialize adapter");
                error
            })?;
            wire_adapter_callbacks(&**adapter, &callbacks, config.sample_rate_hz);
        } else {
            tracing::info!("native protocol selected; bridge has no adapter");
        }

        Ok(Self {
            config,
            backend,
            channel_open: false,
            voice_session_active: false,
            callbacks,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Whether the bridge defers to the device's native protocol.
    pub fn is_native(&self) -> bool {
        matches!(self.backend, AdapterSelection::Native)
    }

    pub fn adapter(&self) -> Option<&dyn ProviderAdapter> {
        match &self.backend {
            AdapterSelection::Adapter(adapter) => Some(&**adapter),
            AdapterSelection::Native => None,
        }
    }

    pub fn is_voice_session_active(&self) -> bool {
        self.voice_session_active
    }

    fn require_adapter(&self) -> Result<&dyn ProviderAdapter> {
        self.adapter()
            .ok_or_else(|| VoxError::NotInitialized("AI model adapter not initialized".into()))
    }
}

fn wire_adapter_callbacks(adapter: &dyn ProviderAdapter, callbacks: &Arc<BridgeCallbacks>, sample_rate_hz: u32) {
    let audio_slots = Arc::clone(callbacks);
    adapter.set_on_audio(Arc::new(move |audio: Vec<u8>| {
        if let Some(callback) = audio_slots.audio.get() {
            callback(ConversationPacket::from_adapter_audio(audio, sample_rate_hz));
        }
    }));

    let text_slots = Arc::clone(callbacks);
    adapter.set_on_text(Arc::new(move |text: String| {
        if let Some(callback) = text_slots.text.get() {
            callback(text);
        }
    }));

    let error_slots = Arc::clone(callbacks);
    adapter.set_on_error(Arc::new(move |message: String| {
        tracing::error!(%message, "AI model adapter error");
        if let Some(callback) = error_slots.error.get() {
            callback(message);
        }
    }));

    adapter.set_on_status(Arc::new(|status: String| {
        tracing::info!(%status, "AI model adapter status");
    }));
}

#[async_trait]
impl ConversationChannel for ProtocolBridge {
    async fn open_channel(&mut self) -> Result<()> {
        if self.is_channel_open() {
            return Ok(());
        }
        let AdapterSelection::Adapter(adapter) = &mut self.backend else {
            return Err(VoxError::NotInitialized("AI model adapter not initialized".into()));
        };
        // A channel whose adapter lost its connection is reopened from scratch.
        self.channel_open = false;
        self.voice_session_active = false;

        if let Err(error) = adapter.connect().await {
            tracing::error!(%error, "failed to connect to AI model");
            return Err(error);
        }

        if adapter.model_kind() == ModelKind::Realtime {
            if let Err(error) = adapter.start_voice_session().await {
                tracing::error!(%error, "failed to start voice session");
                adapter.disconnect().await;
                return Err(error);
            }
            self.voice_session_active = true;
        }

        self.channel_open = true;
        tracing::info!(provider = %adapter.provider(), "audio channel opened");
        Ok(())
    }

    async fn close_channel(&mut self) {
        if !self.channel_open && !self.voice_session_active {
            return;
        }
        if let AdapterSelection::Adapter(adapter) = &mut self.backend {
            if self.voice_session_active {
                if let Err(error) = adapter.stop_voice_session().await {
                    tracing::warn!(%error, "failed to stop voice session");
                }
            }
            adapter.disconnect().await;
        }
        self.voice_session_active = false;
        self.channel_open = false;
        tracing::info!("audio channel closed");
    }

    fn is_channel_open(&self) -> bool {
        self.channel_open && self.adapter().is_some_and(|adapter| adapter.is_connected())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let adapter = self.require_adapter()?;
        if !adapter.is_connected() {
            return Err(VoxError::NotConnected("Not connected to AI model".into()));
        }
        adapter.send_text(text).await
    }

    async fn send_audio(&self, packet: ConversationPacket) -> Result<()> {
        if !self.is_channel_open() {
            return Err(VoxError::NotConnected("Audio channel not opened".into()));
        }
        let adapter = self.require_adapter()?;
        match adapter.model_kind() {
            ModelKind::Realtime => adapter.send_audio(&packet.into_adapter_audio()).await,
            kind => {
                tracing::warn!(%kind, "audio input is not supported for this model kind");
                Err(VoxError::UnsupportedOperation(format!(
                    "audio input is not supported for {kind} models"
                )))
            }
        }
    }

    async fn send_control(&self, _payload: &str) -> Result<()> {
        tracing::warn!("control messages are not supported by AI model backends");
        Err(VoxError::UnsupportedOperation(
            "control messages are not supported by AI model backends".into(),
        ))
    }

    fn on_incoming_audio(&self, callback: IncomingAudioCallback) {
        self.callbacks.audio.set(callback);
    }

    fn on_incoming_text(&self, callback: IncomingTextCallback) {
        self.callbacks.text.set(callback);
    }

    /// Stored for contract completeness; no backend produces control messages.
    fn on_control_message(&self, callback: ControlMessageCallback) {
        self.callbacks.control.set(callback);
    }

    fn on_network_error(&self, callback: NetworkErrorCallback) {
        self.callbacks.error.set(callback);
    }
}
