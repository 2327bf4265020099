//! Provider configuration: compiled defaults layered under persisted overrides.

pub mod defaults;
pub mod store;

pub use defaults::ProviderDefaults;
pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;

/// Settings namespace holding the provider configuration.
pub const SETTINGS_NAMESPACE: &str = "ai_model";

pub const KEY_PROVIDER: &str = "provider";
pub const KEY_API_KEY: &str = "api_key";
pub const KEY_MODEL_NAME: &str = "model_name";
pub const KEY_BASE_URL: &str = "base_url";
pub const KEY_VOICE_NAME: &str = "voice_name";
pub const KEY_SYSTEM_PROMPT: &str = "system_prompt";

/// Every key written by [`save_config`].
pub const PERSISTED_KEYS: [&str; 6] = [
    KEY_PROVIDER,
    KEY_API_KEY,
    KEY_MODEL_NAME,
    KEY_BASE_URL,
    KEY_VOICE_NAME,
    KEY_SYSTEM_PROMPT,
];

pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
pub const DEFAULT_AUDIO_FORMAT: &str = "opus";

/// Conversational backend selected for the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProviderKind {
    /// The device's own protocol; no adapter is involved.
    #[default]
    Native,
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    Google,
    Anthropic,
    Custom,
}

/// Interaction style a backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelKind {
    /// Request/response text only.
    #[default]
    ChatCompletion,
    /// Persistent bidirectional audio and text.
    Realtime,
    Multimodal,
}

/// The single authoritative description of which backend is active and how to reach it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub model_kind: ModelKind,
    pub api_key: String,
    pub model_name: String,
    pub base_url: String,
    /// Path appended to `base_url` by endpoints that need one.
    pub endpoint: String,
    pub extra_headers: HashMap<String, String>,
    pub extra_parameters: HashMap<String, String>,
    pub voice_name: String,
    pub sample_rate_hz: u32,
    pub audio_format: String,
    pub system_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Native,
            model_kind: ModelKind::ChatCompletion,
            api_key: String::new(),
            model_name: String::new(),
            base_url: String::new(),
            endpoint: String::new(),
            extra_headers: HashMap::new(),
            extra_parameters: HashMap::new(),
            voice_name: String::new(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            audio_format: DEFAULT_AUDIO_FORMAT.to_string(),
            system_prompt: String::new(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model_kind", &self.model_kind)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("extra_headers", &self.extra_headers.keys().collect::<Vec<_>>())
            .field("extra_parameters", &self.extra_parameters)
            .field("voice_name", &self.voice_name)
            .field("sample_rate_hz", &self.sample_rate_hz)
            .field("audio_format", &self.audio_format)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl ProviderConfig {
    /// Fill the provider-specific constants (model name, base URL, kind, voice)
    /// for `provider`, keeping any non-empty model name and base URL already set.
    pub fn apply_provider_defaults(&mut self, provider: ProviderKind) {
        self.provider = provider;
        if self.model_name.is_empty() {
            if let Some(model) = default_model_name(provider) {
                self.model_name = model.to_string();
            }
        }
        if self.base_url.is_empty() {
            if let Some(url) = default_base_url(provider) {
                self.base_url = url.to_string();
            }
        }
        if self.voice_name.is_empty() {
            if let Some(voice) = default_voice_name(provider) {
                self.voice_name = voice.to_string();
            }
        }
        self.model_kind = default_model_kind(provider);
    }

    /// Base URL joined with `endpoint`, if any.
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = self.endpoint.trim_start_matches('/');
        if endpoint.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

pub fn default_model_name(provider: ProviderKind) -> Option<&'static str> {
    match provider {
        ProviderKind::OpenAi => Some("gpt-4o-realtime-preview"),
        ProviderKind::Google => Some("gemini-2.0-flash-exp"),
        ProviderKind::Anthropic => Some("claude-3-5-sonnet-20241022"),
        ProviderKind::Native | ProviderKind::Custom => None,
    }
}

pub fn default_base_url(provider: ProviderKind) -> Option<&'static str> {
    match provider {
        ProviderKind::OpenAi => Some("wss://api.openai.com/v1/realtime"),
        ProviderKind::Google => Some("https://generativelanguage.googleapis.com/v1beta/models"),
        ProviderKind::Anthropic => Some("https://api.anthropic.com/v1/messages"),
        ProviderKind::Native | ProviderKind::Custom => None,
    }
}

pub fn default_voice_name(provider: ProviderKind) -> Option<&'static str> {
    match provider {
        ProviderKind::OpenAi => Some("alloy"),
        _ => None,
    }
}

pub fn default_model_kind(provider: ProviderKind) -> ModelKind {
    match provider {
        ProviderKind::OpenAi => ModelKind::Realtime,
        _ => ModelKind::ChatCompletion,
    }
}

/// Default assistant preamble for a UI language.
pub fn default_system_prompt(language: &str) -> String {
    format!("You are a helpful AI assistant. Please respond in {language}.")
}

/// Resolve the active configuration.
///
/// Starts from the compiled defaults for the selected provider, then overlays
/// every persisted field that is present and non-empty. Nothing is validated
/// here; a missing credential only surfaces when an adapter initializes.
pub fn load_config(defaults: &ProviderDefaults, store: &dyn SettingsStore) -> Result<ProviderConfig> {
    let provider = match non_empty(store.get_string(KEY_PROVIDER)?) {
        Some(raw) => match raw.parse::<ProviderKind>() {
            Ok(provider) => provider,
            Err(_) => {
                tracing::warn!(provider = %raw, "ignoring unknown persisted provider");
                defaults.provider
            }
        },
        None => defaults.provider,
    };

    let mut config = defaults.config_for(provider);

    if let Some(api_key) = non_empty(store.get_string(KEY_API_KEY)?) {
        config.api_key = api_key;
    }
    if let Some(model_name) = non_empty(store.get_string(KEY_MODEL_NAME)?) {
        config.model_name = model_name;
    }
    if let Some(base_url) = non_empty(store.get_string(KEY_BASE_URL)?) {
        config.base_url = base_url;
    }
    if let Some(voice_name) = non_empty(store.get_string(KEY_VOICE_NAME)?) {
        config.voice_name = voice_name;
    }
    if let Some(system_prompt) = non_empty(store.get_string(KEY_SYSTEM_PROMPT)?) {
        config.system_prompt = system_prompt;
    }

    tracing::debug!(provider = %config.provider, model = %config.model_name, "loaded provider config");
    Ok(config)
}

/// Persist every mutable field in one store update, overwriting whatever
/// was stored.
pub fn save_config(config: &ProviderConfig, store: &dyn SettingsStore) -> Result<()> {
    let provider = config.provider.to_string();
    store.set_many(&[
        (KEY_PROVIDER, provider.as_str()),
        (KEY_API_KEY, config.api_key.as_str()),
        (KEY_MODEL_NAME, config.model_name.as_str()),
        (KEY_BASE_URL, config.base_url.as_str()),
        (KEY_VOICE_NAME, config.voice_name.as_str()),
        (KEY_SYSTEM_PROMPT, config.system_prompt.as_str()),
    ])
}

/// Erase every persisted override so the compiled defaults apply again.
pub fn reset_config(store: &dyn SettingsStore) -> Result<()> {
    store.erase_many(&PERSISTED_KEYS)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
