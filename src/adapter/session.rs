//! Runtime state owned by one adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Connection state shared between an adapter and its background tasks.
#[derive(Debug, Default)]
pub struct AdapterSession {
    connected: AtomicBool,
    voice_session_active: AtomicBool,
    session_id: Mutex<Option<String>>,
}

impl AdapterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn mark_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Mark disconnected. Returns whether the session was connected, so a
    /// failure path can report itself exactly once.
    pub fn mark_disconnected(&self) -> bool {
        self.voice_session_active.store(false, Ordering::SeqCst);
        self.connected.swap(false, Ordering::SeqCst)
    }

    pub fn is_voice_session_active(&self) -> bool {
        self.voice_session_active.load(Ordering::SeqCst)
    }

    pub fn set_voice_session_active(&self, active: bool) {
        self.voice_session_active.store(active, Ordering::SeqCst);
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_session_id(&self, id: impl Into<String>) {
        *self
            .session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id.into());
    }

    /// Tear down everything: disconnected, no session id, no voice session.
    pub fn reset(&self) {
        self.mark_disconnected();
        *self
            .session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
