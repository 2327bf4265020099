//! Per-adapter inbound event slots.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Callback type for text replies.
pub type TextCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback type for raw audio replies.
pub type AudioCallback = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Callback type for error descriptions.
pub type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback type for informational status updates.
pub type StatusCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Four independently settable handler slots.
///
/// At most one handler per slot; registering again replaces the previous one.
/// Events emitted into an empty slot are dropped. Handlers are invoked outside
/// the slot lock, so a handler may re-register itself.
#[derive(Default)]
pub struct CallbackSet {
    text: CallbackSlot<TextCallback>,
    audio: CallbackSlot<AudioCallback>,
    error: CallbackSlot<ErrorCallback>,
    status: CallbackSlot<StatusCallback>,
}

impl CallbackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&self, callback: TextCallback) {
        self.text.set(callback);
    }

    pub fn set_audio(&self, callback: AudioCallback) {
        self.audio.set(callback);
    }

    pub fn set_error(&self, callback: ErrorCallback) {
        self.error.set(callback);
    }

    pub fn set_status(&self, callback: StatusCallback) {
        self.status.set(callback);
    }

    pub fn emit_text(&self, text: impl Into<String>) {
        if let Some(callback) = self.text.get() {
            callback(text.into());
        }
    }

    pub fn emit_audio(&self, audio: Vec<u8>) {
        if let Some(callback) = self.audio.get() {
            callback(audio);
        }
    }

    pub fn emit_error(&self, message: impl Into<String>) {
        if let Some(callback) = self.error.get() {
            callback(message.into());
        }
    }

    pub fn emit_status(&self, status: impl Into<String>) {
        if let Some(callback) = self.status.get() {
            callback(status.into());
        }
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("text", &self.text.is_set())
            .field("audio", &self.audio.is_set())
            .field("error", &self.error.is_set())
            .field("status", &self.status.is_set())
            .finish()
    }
}

/// A single replaceable handler.
pub struct CallbackSlot<T> {
    inner: RwLock<Option<T>>,
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl<T: Clone> CallbackSlot<T> {
    pub fn set(&self, value: T) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(value);
    }

    /// Clone the current handler out so it can run without holding the lock.
    pub fn get(&self) -> Option<T> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn empty_slots_drop_events() {
        let callbacks = CallbackSet::new();
        callbacks.emit_text("ignored");
        callbacks.emit_audio(vec![1, 2, 3]);
        callbacks.emit_error("ignored");
        callbacks.emit_status("ignored");
    }

    #[test]
    fn last_registration_wins() {
        let callbacks = CallbackSet::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        callbacks.set_text(Arc::new(move |text: String| first.lock().unwrap().push(format!("first:{text}"))));
        let second = Arc::clone(&seen);
        callbacks.set_text(Arc::new(move |text: String| second.lock().unwrap().push(format!("second:{text}"))));

        callbacks.emit_text("hi");

        assert_eq!(*seen.lock().unwrap(), vec!["second:hi".to_string()]);
    }

    #[test]
    fn slots_are_independent() {
        let callbacks = CallbackSet::new();
        let audio = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&audio);
        callbacks.set_audio(Arc::new(move |bytes: Vec<u8>| sink.lock().unwrap().extend(bytes)));

        callbacks.emit_text("not audio");
        callbacks.emit_audio(vec![7, 8]);

        assert_eq!(*audio.lock().unwrap(), vec![7, 8]);
    }
}
