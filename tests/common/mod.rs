//! Shared test helpers and a scripted provider adapter.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use voxlink::adapter::{CallbackSet, ProviderAdapter};
use voxlink::config::{ModelKind, ProviderConfig, ProviderKind};
use voxlink::error::{Result, VoxError};

/// Counters and captured traffic, shared with the test after the adapter is
/// moved into a bridge.
#[derive(Debug, Default)]
pub struct MockLedger {
    pub connected: AtomicBool,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub voice_starts: AtomicUsize,
    pub voice_stops: AtomicUsize,
    pub sent_text: Mutex<Vec<String>>,
    pub sent_audio: Mutex<Vec<Vec<u8>>>,
}

impl MockLedger {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Simulate the transport dying underneath an open adapter.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// A provider adapter whose behavior is fixed up front.
pub struct MockAdapter {
    kind: ModelKind,
    fail_initialize: bool,
    fail_voice_start: bool,
    config: ProviderConfig,
    callbacks: CallbackSet,
    ledger: Arc<MockLedger>,
}

impl MockAdapter {
    pub fn new(kind: ModelKind) -> (Self, Arc<MockLedger>) {
        let ledger = Arc::new(MockLedger::default());
        let adapter = Self {
            kind,
            fail_initialize: false,
            fail_voice_start: false,
            config: ProviderConfig::default(),
            callbacks: CallbackSet::new(),
            ledger: Arc::clone(&ledger),
        };
        (adapter, ledger)
    }

    pub fn failing_voice_start(mut self) -> Self {
        self.fail_voice_start = true;
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn model_kind(&self) -> ModelKind {
        self.kind
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn callbacks(&self) -> &CallbackSet {
        &self.callbacks
    }

    fn initialize(&mut self, config: ProviderConfig) -> Result<()> {
        if self.fail_initialize {
            return Err(VoxError::Configuration("mock credential missing".into()));
        }
        self.config = config;
        Ok(())
    }

    async fn connect(&mut self) -> Result<()> {
        self.ledger.connects.fetch_add(1, Ordering::SeqCst);
        self.ledger.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.ledger.disconnects.fetch_add(1, Ordering::SeqCst);
        self.ledger.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.ledger.connected.load(Ordering::SeqCst)
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.ledger.sent_text.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_audio(&self, audio: &[u8]) -> Result<()> {
        self.ledger.sent_audio.lock().unwrap().push(audio.to_vec());
        Ok(())
    }

    async fn start_voice_session(&mut self) -> Result<()> {
        self.ledger.voice_starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_voice_start {
            return Err(VoxError::Transport("voice session refused".into()));
        }
        Ok(())
    }

    async fn stop_voice_session(&mut self) -> Result<()> {
        self.ledger.voice_stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn realtime_config() -> ProviderConfig {
    ProviderConfig {
        provider: ProviderKind::Custom,
        model_kind: ModelKind::Realtime,
        sample_rate_hz: 24_000,
        ..Default::default()
    }
}
