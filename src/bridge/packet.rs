//! Audio packets crossing the device boundary.

use serde::{Deserialize, Serialize};

/// Backend audio arrives unframed, so inbound packets carry this fixed value.
pub const SYNTHETIC_FRAME_DURATION_MS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPacket {
    pub payload: Vec<u8>,
    pub sample_rate_hz: u32,
    pub frame_duration_ms: u32,
}

impl ConversationPacket {
    pub fn new(payload: Vec<u8>, sample_rate_hz: u32, frame_duration_ms: u32) -> Self {
        Self {
            payload,
            sample_rate_hz,
            frame_duration_ms,
        }
    }

    /// Wrap raw adapter audio using the configured sample rate.
    pub fn from_adapter_audio(payload: Vec<u8>, sample_rate_hz: u32) -> Self {
        Self::new(payload, sample_rate_hz, SYNTHETIC_FRAME_DURATION_MS)
    }

    /// Raw bytes for the adapter; framing metadata is dropped.
    pub fn into_adapter_audio(self) -> Vec<u8> {
        self.payload
    }
}
