//! Build-time and environment defaults for each provider.

use bon::Builder;

use super::{default_system_prompt, ProviderConfig, ProviderKind};

const DEFAULT_LANGUAGE: &str = "English";

/// Values baked in at build time (or read from the environment) that seed
/// [`ProviderConfig`] before persisted overrides are applied.
///
/// ```
/// use voxlink::config::{ProviderDefaults, ProviderKind};
///
/// let defaults = ProviderDefaults::builder()
///     .provider(ProviderKind::Anthropic)
///     .anthropic_api_key("sk-ant-test")
///     .build();
/// let config = defaults.config_for(ProviderKind::Anthropic);
/// assert_eq!(config.base_url, "https://api.anthropic.com/v1/messages");
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct ProviderDefaults {
    #[builder(default)]
    pub provider: ProviderKind,
    #[builder(into)]
    pub openai_api_key: Option<String>,
    #[builder(into)]
    pub openai_model: Option<String>,
    #[builder(into)]
    pub google_api_key: Option<String>,
    #[builder(into)]
    pub google_model: Option<String>,
    #[builder(into)]
    pub anthropic_api_key: Option<String>,
    #[builder(into)]
    pub anthropic_model: Option<String>,
    #[builder(into)]
    pub custom_server_url: Option<String>,
    /// UI language named in the default system prompt.
    #[builder(into)]
    pub language: Option<String>,
}

impl ProviderDefaults {
    /// Defaults captured from `VOXLINK_*` variables at compile time.
    pub fn compiled() -> Self {
        Self {
            provider: option_env!("VOXLINK_PROVIDER")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
            openai_api_key: compiled(option_env!("VOXLINK_OPENAI_API_KEY")),
            openai_model: compiled(option_env!("VOXLINK_OPENAI_MODEL")),
            google_api_key: compiled(option_env!("VOXLINK_GOOGLE_API_KEY")),
            google_model: compiled(option_env!("VOXLINK_GOOGLE_MODEL")),
            anthropic_api_key: compiled(option_env!("VOXLINK_ANTHROPIC_API_KEY")),
            anthropic_model: compiled(option_env!("VOXLINK_ANTHROPIC_MODEL")),
            custom_server_url: compiled(option_env!("VOXLINK_CUSTOM_SERVER_URL")),
            language: compiled(option_env!("VOXLINK_LANGUAGE")),
        }
    }

    /// Compiled defaults overlaid with the same variables read at runtime
    /// (a `.env` file is loaded first if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut defaults = Self::compiled();

        if let Some(raw) = env_value("VOXLINK_PROVIDER") {
            match raw.parse() {
                Ok(provider) => defaults.provider = provider,
                Err(_) => tracing::warn!(provider = %raw, "ignoring unknown VOXLINK_PROVIDER"),
            }
        }

        let overlays = [
            ("VOXLINK_OPENAI_API_KEY", &mut defaults.openai_api_key),
            ("VOXLINK_OPENAI_MODEL", &mut defaults.openai_model),
            ("VOXLINK_GOOGLE_API_KEY", &mut defaults.google_api_key),
            ("VOXLINK_GOOGLE_MODEL", &mut defaults.google_model),
            ("VOXLINK_ANTHROPIC_API_KEY", &mut defaults.anthropic_api_key),
            ("VOXLINK_ANTHROPIC_MODEL", &mut defaults.anthropic_model),
            ("VOXLINK_CUSTOM_SERVER_URL", &mut defaults.custom_server_url),
            ("VOXLINK_LANGUAGE", &mut defaults.language),
        ];
        for (var, slot) in overlays {
            if let Some(value) = env_value(var) {
                *slot = Some(value);
            }
        }

        defaults
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// The configuration `provider` starts from before persisted overrides.
    pub fn config_for(&self, provider: ProviderKind) -> ProviderConfig {
        let mut config = ProviderConfig {
            system_prompt: default_system_prompt(self.language()),
            ..Default::default()
        };

        let (api_key, model_name) = match provider {
            ProviderKind::OpenAi => (self.openai_api_key.as_deref(), self.openai_model.as_deref()),
            ProviderKind::Google => (self.google_api_key.as_deref(), self.google_model.as_deref()),
            ProviderKind::Anthropic => (
                self.anthropic_api_key.as_deref(),
                self.anthropic_model.as_deref(),
            ),
            ProviderKind::Custom | ProviderKind::Native => (None, None),
        };
        config.api_key = api_key.unwrap_or_default().to_string();
        config.model_name = model_name.unwrap_or_default().to_string();
        if provider == ProviderKind::Custom {
            config.base_url = self.custom_server_url.clone().unwrap_or_default();
        }

        config.apply_provider_defaults(provider);
        config
    }
}

fn compiled(value: Option<&'static str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelKind;

    #[test]
    fn openai_defaults_fill_realtime_fields() {
        let defaults = ProviderDefaults::builder()
            .openai_api_key("sk-test")
            .build();

        let config = defaults.config_for(ProviderKind::OpenAi);

        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model_name, "gpt-4o-realtime-preview");
        assert_eq!(config.base_url, "wss://api.openai.com/v1/realtime");
        assert_eq!(config.voice_name, "alloy");
        assert_eq!(config.model_kind, ModelKind::Realtime);
        assert_eq!(config.sample_rate_hz, 16_000);
        assert_eq!(config.audio_format, "opus");
    }

    #[test]
    fn compiled_model_wins_over_builtin_model() {
        let defaults = ProviderDefaults::builder()
            .anthropic_model("claude-3-haiku-20240307")
            .build();

        let config = defaults.config_for(ProviderKind::Anthropic);

        assert_eq!(config.model_name, "claude-3-haiku-20240307");
        assert_eq!(config.api_key, "");
    }

    #[test]
    fn custom_uses_server_url() {
        let defaults = ProviderDefaults::builder()
            .custom_server_url("https://voice.example.com")
            .build();

        let config = defaults.config_for(ProviderKind::Custom);

        assert_eq!(config.base_url, "https://voice.example.com");
        assert_eq!(config.model_kind, ModelKind::ChatCompletion);
        assert!(config.model_name.is_empty());
    }

    #[test]
    fn system_prompt_names_language() {
        let config = ProviderDefaults::default().config_for(ProviderKind::Native);
        assert_eq!(
            config.system_prompt,
            "You are a helpful AI assistant. Please respond in English."
        );
    }
}
