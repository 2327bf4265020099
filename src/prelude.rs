//! Convenience re-exports for common use.

pub use crate::adapter::{create_adapter, AdapterSelection, ProviderAdapter};
pub use crate::bridge::{ConversationChannel, ConversationPacket, ProtocolBridge};
pub use crate::config::{
    load_config, save_config, FileSettingsStore, MemorySettingsStore, ModelKind, ProviderConfig,
    ProviderDefaults, ProviderKind, SettingsStore,
};
pub use crate::error::{ErrorCategory, Result, VoxError};
pub use crate::tools::{settings_tools, Tool, ToolArguments};
