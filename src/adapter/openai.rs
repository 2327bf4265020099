//! Realtime speech adapter over a persistent WebSocket.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    net::TcpStream,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{HeaderName, HeaderValue},
        Error as WsError, Message,
    },
    MaybeTlsStream, WebSocketStream,
};

use super::realtime_events::{
    audio_append_payload, session_update_payload, text_item_payload, RealtimeEvent,
};
use super::{require_connected, require_initialized, AdapterSession, CallbackSet, ProviderAdapter};
use crate::config::{default_model_name, default_voice_name, ModelKind, ProviderConfig, ProviderKind};
use crate::error::{Result, VoxError};
use crate::transcode;

type RealtimeWebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct RealtimeRuntime {
    outbound_tx: mpsc::UnboundedSender<Message>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Adapter for the OpenAI realtime API.
///
/// `connect` opens the socket, sends `session.update` and hands the socket to
/// a background task. That task writes queued outbound frames and dispatches
/// inbound ones to the callbacks. A transport failure marks the adapter
/// disconnected and reports one error; nothing reconnects automatically.
pub struct OpenAiRealtimeAdapter {
    config: ProviderConfig,
    initialized: bool,
    session: Arc<AdapterSession>,
    callbacks: Arc<CallbackSet>,
    runtime: Option<RealtimeRuntime>,
}

impl Default for OpenAiRealtimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiRealtimeAdapter {
    pub fn new() -> Self {
        Self {
            config: ProviderConfig::default(),
            initialized: false,
            session: Arc::new(AdapterSession::new()),
            callbacks: Arc::new(CallbackSet::new()),
            runtime: None,
        }
    }

    /// Identifier from the server's `session.created`, once received.
    pub fn session_id(&self) -> Option<String> {
        self.session.session_id()
    }

    /// Feed one raw server payload through inbound dispatch, exactly as the
    /// socket task does.
    pub fn handle_server_payload(&self, payload: &str) {
        dispatch_server_payload(payload, &self.session, &self.callbacks);
    }

    fn queue(&self, operation: &str, payload: Value) -> Result<()> {
        require_connected(&self.session, ProviderKind::OpenAi)?;
        let runtime = self.runtime.as_ref().ok_or_else(|| {
            VoxError::NotConnected(format!("{operation}: realtime connection is not running"))
        })?;
        runtime
            .outbound_tx
            .send(Message::Text(payload.to_string().into()))
            .map_err(|_| {
                self.session.mark_disconnected();
                VoxError::Transport(format!("{operation}: realtime connection task has stopped"))
            })
    }

    async fn stop_runtime(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = runtime.shutdown_tx.send(true);
            if let Err(error) = runtime.task.await {
                tracing::warn!(%error, "realtime connection task ended abnormally");
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiRealtimeAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model_kind(&self) -> ModelKind {
        if self.config.model_name.contains("realtime") {
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

    fn initialize(&mut self, mut config: ProviderConfig) -> Result<()> {
        if config.api_key.trim().is_empty() {
            return Err(VoxError::Configuration("OpenAI API key is required".into()));
        }
        if config.model_name.is_empty() {
            config.model_name = default_model_name(ProviderKind::OpenAi)
                .unwrap_or_default()
                .to_string();
        }
        if config.voice_name.is_empty() {
            config.voice_name = default_voice_name(ProviderKind::OpenAi)
                .unwrap_or_default()
                .to_string();
        }
        self.config = config;
        self.initialized = true;
        Ok(())
    }

    async fn connect(&mut self) -> Result<()> {
        require_initialized(self.initialized, ProviderKind::OpenAi)?;
        if self.session.is_connected() && self.runtime.is_some() {
            return Ok(());
        }
        // A previous connection may have died on its own; reap its task first.
        self.stop_runtime().await;
        self.session.reset();

        let url = build_realtime_url(&self.config)?;
        tracing::info!(%url, "connecting to OpenAI realtime API");
        let mut socket = connect_realtime_socket(&url, &self.config).await?;

        let bootstrap = session_update_payload(&self.config).to_string();
        send_bootstrap_message(&mut socket, &bootstrap).await?;
        self.session.mark_connected();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_connection(
            socket,
            outbound_rx,
            shutdown_rx,
            Arc::clone(&self.session),
            Arc::clone(&self.callbacks),
        ));
        self.runtime = Some(RealtimeRuntime {
            outbound_tx,
            shutdown_tx,
            task,
        });

        self.callbacks.emit_status("Connected to OpenAI");
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.stop_runtime().await;
        self.session.reset();
    }

    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.queue("send_text", text_item_payload(text))
    }

    async fn send_audio(&self, audio: &[u8]) -> Result<()> {
        let encoded = transcode::encode(audio);
        tracing::debug!(bytes = audio.len(), "queueing realtime audio");
        self.queue("send_audio", audio_append_payload(&encoded))
    }

    async fn start_voice_session(&mut self) -> Result<()> {
        // The server starts the voice session implicitly on connect.
        require_connected(&self.session, ProviderKind::OpenAi)?;
        self.session.set_voice_session_active(true);
        Ok(())
    }

    async fn stop_voice_session(&mut self) -> Result<()> {
        self.session.set_voice_session_active(false);
        Ok(())
    }
}

impl Drop for OpenAiRealtimeAdapter {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = runtime.shutdown_tx.send(true);
            runtime.task.abort();
        }
    }
}

async fn run_connection(
    mut socket: RealtimeWebSocket,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
    session: Arc<AdapterSession>,
    callbacks: Arc<CallbackSet>,
) {
    let failure = loop {
        tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
            }
            outbound = outbound_rx.recv() => {
                let Some(message) = outbound else {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                };
                if let Err(error) = socket.send(message).await {
                    break format!("Realtime websocket send failed: {error}");
                }
            }
            frame = socket.next() => {
                match frame {
                    Some(Ok(message)) => {
                        if let Err(error) = handle_server_message(&mut socket, &session, &callbacks, message).await {
                            break format!("Realtime websocket closed: {error}");
                        }
                    }
                    Some(Err(error)) => break format!("Realtime websocket receive failed: {error}"),
                    None => break "Realtime websocket stream ended".to_string(),
                }
            }
        }
    };

    if *shutdown_rx.borrow() {
        return;
    }
    tracing::error!(%failure, "realtime connection lost");
    if session.mark_disconnected() {
        callbacks.emit_error(failure);
    }
}

async fn handle_server_message(
    socket: &mut RealtimeWebSocket,
    session: &AdapterSession,
    callbacks: &CallbackSet,
    message: Message,
) -> std::result::Result<(), WsError> {
    match message {
        Message::Text(text) => dispatch_server_payload(text.as_ref(), session, callbacks),
        Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => dispatch_server_payload(&text, session, callbacks),
            Err(_) => tracing::warn!("ignoring non-UTF-8 binary realtime frame"),
        },
        Message::Ping(payload) => socket.send(Message::Pong(payload)).await?,
        Message::Pong(_) | Message::Frame(_) => {}
        Message::Close(_) => return Err(WsError::ConnectionClosed),
    }
    Ok(())
}

fn dispatch_server_payload(payload: &str, session: &AdapterSession, callbacks: &CallbackSet) {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "ignoring malformed realtime payload");
            return;
        }
    };
    match RealtimeEvent::from_server_payload(&value) {
        Some(RealtimeEvent::SessionCreated { session_id }) => {
            tracing::info!(%session_id, "realtime session created");
            session.set_session_id(session_id);
        }
        Some(RealtimeEvent::AudioDelta { delta }) => callbacks.emit_audio(transcode::decode(&delta)),
        Some(RealtimeEvent::TextDelta { text }) => callbacks.emit_text(text),
        Some(RealtimeEvent::Error { message }) => {
            tracing::warn!(%message, "realtime server reported an error");
            callbacks.emit_error(message);
        }
        Some(RealtimeEvent::Unknown { event_type }) => {
            tracing::debug!(%event_type, "ignoring realtime event");
        }
        None => tracing::warn!("ignoring realtime payload without a usable type"),
    }
}

fn build_realtime_url(config: &ProviderConfig) -> Result<String> {
    let trimmed = config.base_url.trim();
    if trimmed.is_empty() {
        return Err(VoxError::Configuration(
            "Realtime base URL cannot be empty".into(),
        ));
    }
    let mut url = reqwest::Url::parse(trimmed)
        .map_err(|error| VoxError::Configuration(format!("Invalid realtime URL: {error}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("model", &config.model_name);
        let extra: BTreeMap<_, _> = config.extra_parameters.iter().collect();
        for (key, value) in extra {
            query.append_pair(key, value);
        }
    }
    Ok(url.into())
}

async fn connect_realtime_socket(url: &str, config: &ProviderConfig) -> Result<RealtimeWebSocket> {
    let mut request = url.into_client_request().map_err(|error| {
        VoxError::Configuration(format!("Invalid realtime websocket URL: {error}"))
    })?;
    let headers = request.headers_mut();
    let auth_value = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
        .map_err(|error| VoxError::Configuration(format!("Invalid realtime auth header: {error}")))?;
    headers.insert("Authorization", auth_value);
    headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));
    for (name, value) in &config.extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|error| VoxError::Configuration(format!("Invalid header name '{name}': {error}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|error| VoxError::Configuration(format!("Invalid header value: {error}")))?;
        headers.insert(name, value);
    }

    connect_async(request)
        .await
        .map(|(socket, _)| socket)
        .map_err(map_connect_error)
}

async fn send_bootstrap_message(socket: &mut RealtimeWebSocket, payload: &str) -> Result<()> {
    socket
        .send(Message::Text(payload.into()))
        .await
        .map_err(|error| VoxError::Transport(format!("Realtime bootstrap send failed: {error}")))
}

fn map_connect_error(error: WsError) -> VoxError {
    match error {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            if matches!(status, 401 | 403) {
                VoxError::Authentication(format!(
                    "Realtime websocket authentication failed with status {status}"
                ))
            } else {
                VoxError::api(
                    status,
                    format!("Realtime websocket handshake failed with status {status}"),
                )
            }
        }
        WsError::Io(error) => VoxError::Io(error),
        WsError::Url(error) => {
            VoxError::Configuration(format!("Invalid realtime websocket URL: {error}"))
        }
        other => VoxError::Transport(format!("Realtime websocket connect failed: {other}")),
    }
}
