//! Wire messages exchanged with the realtime speech endpoint.

use serde_json::{json, Value};

use crate::config::ProviderConfig;

/// Fixed audio format negotiated for both directions.
pub const REALTIME_AUDIO_FORMAT: &str = "g711_ulaw";
pub const REALTIME_SAMPLE_RATE_HZ: u32 = 8_000;

/// Inbound server message, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    SessionCreated { session_id: String },
    /// Base64 audio chunk.
    AudioDelta { delta: String },
    TextDelta { text: String },
    Error { message: String },
    Unknown { event_type: String },
}

impl RealtimeEvent {
    /// Parse a server payload. Returns `None` when the payload has no `type`
    /// or lacks the field its type requires.
    pub fn from_server_payload(payload: &Value) -> Option<Self> {
        let event_type = payload.get("type")?.as_str()?;
        match event_type {
            "session.created" => string_at(payload, &["session", "id"])
                .map(|session_id| Self::SessionCreated { session_id }),
            "response.audio.delta" => {
                string_field(payload, "delta").map(|delta| Self::AudioDelta { delta })
            }
            "response.text.delta" => {
                string_field(payload, "delta").map(|text| Self::TextDelta { text })
            }
            "error" => string_at(payload, &["error", "message"])
                .map(|message| Self::Error { message }),
            _ => Some(Self::Unknown {
                event_type: event_type.to_string(),
            }),
        }
    }
}

/// `session.update` sent right after the socket opens.
pub fn session_update_payload(config: &ProviderConfig) -> Value {
    let audio_format = json!({
        "type": REALTIME_AUDIO_FORMAT,
        "sample_rate": REALTIME_SAMPLE_RATE_HZ,
    });
    json!({
        "type": "session.update",
        "session": {
            "modalities": "text,audio",
            "instructions": config.system_prompt,
            "voice": { "voice": config.voice_name },
            "input_audio_format": audio_format,
            "output_audio_format": audio_format,
        },
    })
}

/// User text turn.
pub fn text_item_payload(text: &str) -> Value {
    json!({
        "type": "conversation.item.create",
        "item": {
            "type": "message",
            "role": "user",
            "content": [{ "type": "input_text", "text": text }],
        },
    })
}

/// Append already-encoded audio to the input buffer.
pub fn audio_append_payload(encoded_audio: &str) -> Value {
    json!({
        "type": "input_audio_buffer.append",
        "audio": encoded_audio,
    })
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_known_event_types() {
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "session.created", "session": {"id": "sess_1"}})),
            Some(RealtimeEvent::SessionCreated { session_id: "sess_1".into() })
        );
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "response.text.delta", "delta": "hi"})),
            Some(RealtimeEvent::TextDelta { text: "hi".into() })
        );
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "response.audio.delta", "delta": "AAE="})),
            Some(RealtimeEvent::AudioDelta { delta: "AAE=".into() })
        );
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "error", "error": {"message": "bad"}})),
            Some(RealtimeEvent::Error { message: "bad".into() })
        );
    }

    #[test]
    fn malformed_payloads_yield_nothing() {
        assert_eq!(RealtimeEvent::from_server_payload(&json!({"delta": "hi"})), None);
        assert_eq!(RealtimeEvent::from_server_payload(&json!({"type": 7})), None);
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "response.text.delta"})),
            None
        );
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "error", "error": {}})),
            None
        );
    }

    #[test]
    fn unknown_types_are_tagged() {
        assert_eq!(
            RealtimeEvent::from_server_payload(&json!({"type": "rate_limits.updated"})),
            Some(RealtimeEvent::Unknown { event_type: "rate_limits.updated".into() })
        );
    }

    #[test]
    fn session_update_uses_fixed_ulaw_format() {
        let config = ProviderConfig {
            voice_name: "verse".into(),
            system_prompt: "Be brief.".into(),
            ..Default::default()
        };

        assert_eq!(
            session_update_payload(&config),
            json!({
                "type": "session.update",
                "session": {
                    "modalities": "text,audio",
                    "instructions": "Be brief.",
                    "voice": {"voice": "verse"},
                    "input_audio_format": {"type": "g711_ulaw", "sample_rate": 8000},
                    "output_audio_format": {"type": "g711_ulaw", "sample_rate": 8000},
                },
            })
        );
    }

    #[test]
    fn text_item_wraps_input_text() {
        assert_eq!(
            text_item_payload("hello"),
            json!({
                "type": "conversation.item.create",
                "item": {
                    "type": "message",
                    "role": "user",
                    "content": [{"type": "input_text", "text": "hello"}],
                },
            })
        );
    }
}
