//! voxlink: provider adapters and a duplex protocol bridge for voice-assistant
//! devices.
//!
//! A device speaks one conversation contract ([`bridge::ConversationChannel`]).
//! The [`bridge::ProtocolBridge`] satisfies it by delegating to exactly one
//! [`adapter::ProviderAdapter`], picked from the persisted
//! [`config::ProviderConfig`]: the OpenAI realtime WebSocket API, Google
//! Gemini, Anthropic Claude, or a custom server. The `native` provider keeps
//! the device on its own protocol and needs no adapter.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use voxlink::prelude::*;
//!
//! # async fn example() -> voxlink::error::Result<()> {
//! let defaults = ProviderDefaults::from_env();
//! let store = FileSettingsStore::new_default();
//! let mut bridge = ProtocolBridge::from_store(&defaults, &store)?;
//! bridge.on_incoming_text(Arc::new(|text: String| println!("{text}")));
//! bridge.open_channel().await?;
//! bridge.send_text("Hello!").await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod error;
pub mod prelude;
pub mod tools;
pub mod transcode;

#[cfg(feature = "cli")]
pub mod cli;
