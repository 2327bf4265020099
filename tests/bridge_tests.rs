//! Tests for the protocol bridge over a scripted adapter.

mod common;

use std::sync::{Arc, Mutex};

use common::{realtime_config, MockAdapter, MockLedger};
use voxlink::adapter::AdapterSelection;
use voxlink::bridge::{ConversationChannel, ConversationPacket, ProtocolBridge, SYNTHETIC_FRAME_DURATION_MS};
use voxlink::config::{MemorySettingsStore, ModelKind, ProviderConfig, ProviderDefaults};
use voxlink::error::VoxError;

fn bridge_with(kind: ModelKind) -> (ProtocolBridge, Arc<MockLedger>) {
    let (adapter, ledger) = MockAdapter::new(kind);
    let bridge = ProtocolBridge::with_adapter(realtime_config(), Box::new(adapter))
        .expect("bridge should build");
    (bridge, ledger)
}

#[tokio::test]
async fn realtime_open_starts_voice_session_and_close_stops_it() {
    let (mut bridge, ledger) = bridge_with(ModelKind::Realtime);

    bridge.open_channel().await.unwrap();
    assert!(bridge.is_channel_open());
    assert!(bridge.is_voice_session_active());
    assert_eq!(MockLedger::count(&ledger.voice_starts), 1);

    bridge.open_channel().await.unwrap();
    assert_eq!(MockLedger::count(&ledger.connects), 1);

    bridge.close_channel().await;
    assert!(!bridge.is_channel_open());
    assert!(!bridge.is_voice_session_active());
    assert_eq!(MockLedger::count(&ledger.voice_stops), 1);
    assert_eq!(MockLedger::count(&ledger.disconnects), 1);
}

#[tokio::test]
async fn voice_start_failure_leaves_channel_closed() {
    let (adapter, ledger) = MockAdapter::new(ModelKind::Realtime);
    let mut bridge =
        ProtocolBridge::with_adapter(realtime_config(), Box::new(adapter.failing_voice_start())).unwrap();

    let err = bridge.open_channel().await.unwrap_err();

    assert!(matches!(err, VoxError::Transport(_)));
    assert!(!bridge.is_channel_open());
    assert!(!bridge.is_voice_session_active());
    assert_eq!(MockLedger::count(&ledger.disconnects), 1);
    assert!(bridge.adapter().is_some_and(|adapter| !adapter.is_connected()));
}

#[tokio::test]
async fn channel_reopens_after_the_adapter_loses_its_connection() {
    let (mut bridge, ledger) = bridge_with(ModelKind::Realtime);
    bridge.open_channel().await.unwrap();

    ledger.drop_connection();
    assert!(!bridge.is_channel_open());
    let packet = ConversationPacket::new(vec![1, 2], 16_000, 60);
    assert!(matches!(
        bridge.send_audio(packet.clone()).await,
        Err(VoxError::NotConnected(_))
    ));

    bridge.open_channel().await.unwrap();

    assert!(bridge.is_channel_open());
    assert!(bridge.is_voice_session_active());
    assert_eq!(MockLedger::count(&ledger.connects), 2);
    assert_eq!(MockLedger::count(&ledger.voice_starts), 2);
    bridge.send_audio(packet).await.unwrap();
    assert_eq!(*ledger.sent_audio.lock().unwrap(), vec![vec![1u8, 2]]);
}

#[tokio::test]
async fn close_is_safe_before_open_and_when_repeated() {
    let (mut bridge, ledger) = bridge_with(ModelKind::Realtime);

    bridge.close_channel().await;
    assert_eq!(MockLedger::count(&ledger.disconnects), 0);

    bridge.open_channel().await.unwrap();
    bridge.close_channel().await;
    bridge.close_channel().await;
    assert_eq!(MockLedger::count(&ledger.disconnects), 1);
}

#[tokio::test]
async fn native_bridge_refuses_channel_operations() {
    let mut bridge = ProtocolBridge::with_backend(ProviderConfig::default(), AdapterSelection::Native).unwrap();

    assert!(bridge.is_native());
    assert!(matches!(
        bridge.open_channel().await,
        Err(VoxError::NotInitialized(_))
    ));
    assert!(matches!(
        bridge.send_text("hello").await,
        Err(VoxError::NotInitialized(_))
    ));
    assert!(!bridge.is_channel_open());
    bridge.close_channel().await;
}

#[tokio::test]
async fn native_provider_from_store_has_no_adapter() {
    let store = MemorySettingsStore::new();
    let bridge = ProtocolBridge::from_store(&ProviderDefaults::default(), &store).unwrap();
    assert!(bridge.is_native());
    assert!(bridge.adapter().is_none());
}

#[tokio::test]
async fn initialize_failure_is_returned_from_construction() {
    let (adapter, _ledger) = MockAdapter::new(ModelKind::Realtime);
    let result = ProtocolBridge::with_adapter(realtime_config(), Box::new(adapter.failing_initialize()));
    assert!(matches!(result, Err(VoxError::Configuration(_))));
}

#[tokio::test]
async fn audio_is_forwarded_only_for_realtime_backends() {
    let (mut realtime, realtime_ledger) = bridge_with(ModelKind::Realtime);
    let packet = ConversationPacket::new(vec![7, 8, 9], 16_000, 60);

    assert!(matches!(
        realtime.send_audio(packet.clone()).await,
        Err(VoxError::NotConnected(_))
    ));

    realtime.open_channel().await.unwrap();
    realtime.send_audio(packet.clone()).await.unwrap();
    assert_eq!(*realtime_ledger.sent_audio.lock().unwrap(), vec![vec![7u8, 8, 9]]);

    let (mut chat, chat_ledger) = bridge_with(ModelKind::ChatCompletion);
    chat.open_channel().await.unwrap();
    assert!(!chat.is_voice_session_active());
    assert!(matches!(
        chat.send_audio(packet).await,
        Err(VoxError::UnsupportedOperation(_))
    ));
    assert!(chat_ledger.sent_audio.lock().unwrap().is_empty());
}

#[tokio::test]
async fn text_requires_connection_and_is_forwarded() {
    let (mut bridge, ledger) = bridge_with(ModelKind::ChatCompletion);

    assert!(matches!(
        bridge.send_text("early").await,
        Err(VoxError::NotConnected(_))
    ));

    bridge.open_channel().await.unwrap();
    bridge.send_text("hello").await.unwrap();
    assert_eq!(*ledger.sent_text.lock().unwrap(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn control_messages_are_unsupported() {
    let (mut bridge, _ledger) = bridge_with(ModelKind::Realtime);
    bridge.open_channel().await.unwrap();

    assert!(matches!(
        bridge.send_control(r#"{"type":"abort"}"#).await,
        Err(VoxError::UnsupportedOperation(_))
    ));
}

#[tokio::test]
async fn inbound_adapter_events_reach_bridge_callbacks() {
    let (bridge, _ledger) = bridge_with(ModelKind::Realtime);
    let packets = Arc::new(Mutex::new(Vec::new()));
    let texts = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&packets);
    bridge.on_incoming_audio(Arc::new(move |packet: ConversationPacket| sink.lock().unwrap().push(packet)));
    let sink = Arc::clone(&texts);
    bridge.on_incoming_text(Arc::new(move |text: String| sink.lock().unwrap().push(text)));
    let sink = Arc::clone(&errors);
    bridge.on_network_error(Arc::new(move |message: String| sink.lock().unwrap().push(message)));

    let callbacks = bridge.adapter().unwrap().callbacks();
    callbacks.emit_audio(vec![1, 2, 3, 4]);
    callbacks.emit_text("hi");
    callbacks.emit_error("socket reset");
    callbacks.emit_status("Connected");

    let packets = packets.lock().unwrap();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].payload, vec![1, 2, 3, 4]);
    assert_eq!(packets[0].sample_rate_hz, 24_000);
    assert_eq!(packets[0].frame_duration_ms, SYNTHETIC_FRAME_DURATION_MS);
    assert_eq!(*texts.lock().unwrap(), vec!["hi".to_string()]);
    assert_eq!(*errors.lock().unwrap(), vec!["socket reset".to_string()]);
}

#[tokio::test]
async fn events_without_registered_callbacks_are_dropped() {
    let (bridge, _ledger) = bridge_with(ModelKind::Realtime);
    let callbacks = bridge.adapter().unwrap().callbacks();
    callbacks.emit_audio(vec![1]);
    callbacks.emit_text("ignored");
    callbacks.emit_error("ignored");
}
