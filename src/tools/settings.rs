//! Tools that read and rewrite the persisted provider configuration.
//!
//! Every setter loads the current configuration, changes one field and saves
//! the whole record back, so the store never holds a partial update.

use std::sync::Arc;

use serde_json::{json, Value};

use super::arguments::ToolArguments;
use super::tool::{ArgumentSpec, SettingsTool, Tool};
use crate::adapter::{create_adapter, AdapterSelection};
use crate::config::{load_config, reset_config, save_config, ProviderConfig, ProviderDefaults, ProviderKind, SettingsStore};
use crate::error::{Result, VoxError};

pub const CONNECTION_TEST_SUCCESS: &str = "Connection test successful";
pub const RESET_MESSAGE: &str = "AI model configuration reset to defaults";
const PROVIDER_NAMES: &[&str] = &["native", "openai", "google", "anthropic", "custom"];
const NATIVE_TEST_MESSAGE: &str = "Native provider uses the device protocol, no test needed";

/// Shared handles every settings tool operates on.
#[derive(Clone)]
pub struct SettingsContext {
    pub store: Arc<dyn SettingsStore>,
    pub defaults: Arc<ProviderDefaults>,
}

impl SettingsContext {
    pub fn new(store: Arc<dyn SettingsStore>, defaults: Arc<ProviderDefaults>) -> Self {
        Self { store, defaults }
    }

    fn load(&self) -> Result<ProviderConfig> {
        load_config(&self.defaults, self.store.as_ref())
    }

    fn save(&self, config: &ProviderConfig) -> Result<()> {
        save_config(config, self.store.as_ref())
    }
}

/// The ten reconfiguration tools, bound to one store.
pub fn settings_tools(store: Arc<dyn SettingsStore>, defaults: Arc<ProviderDefaults>) -> Vec<Arc<dyn Tool>> {
    let ctx = SettingsContext::new(store, defaults);
    vec![
        get_config_tool(ctx.clone()),
        set_provider_tool(ctx.clone()),
        field_setter_tool(
            ctx.clone(),
            "set_api_key",
            "Set the API key used by the active provider",
            "api_key",
            |config, value| config.api_key = value,
            |_| "API key updated".to_string(),
        ),
        field_setter_tool(
            ctx.clone(),
            "set_model_name",
            "Set the model name used by the active provider",
            "model_name",
            |config, value| config.model_name = value,
            |value| format!("Model name set to {value}"),
        ),
        field_setter_tool(
            ctx.clone(),
            "set_base_url",
            "Set the base URL of the active provider",
            "base_url",
            |config, value| config.base_url = value,
            |value| format!("Base URL set to {value}"),
        ),
        field_setter_tool(
            ctx.clone(),
            "set_voice_name",
            "Set the synthesized voice used by realtime providers",
            "voice_name",
            |config, value| config.voice_name = value,
            |value| format!("Voice set to {value}"),
        ),
        field_setter_tool(
            ctx.clone(),
            "set_system_prompt",
            "Set the system prompt sent with every request",
            "system_prompt",
            |config, value| config.system_prompt = value,
            |_| "System prompt updated".to_string(),
        ),
        test_connection_tool(ctx.clone()),
        reset_tool(ctx),
        supported_models_tool(),
    ]
}

/// Look up a tool by name.
pub fn find_tool<'a>(tools: &'a [Arc<dyn Tool>], name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|tool| tool.name() == name)
}

fn get_config_tool(ctx: SettingsContext) -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        "get_ai_model_config",
        "Get the current AI model configuration",
        Vec::new(),
        move |_args| {
            let ctx = ctx.clone();
            async move {
                let config = ctx.load()?;
                Ok(config_summary(&config))
            }
        },
    ))
}

fn set_provider_tool(ctx: SettingsContext) -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        "set_ai_model_provider",
        "Switch the conversational backend",
        vec![ArgumentSpec::one_of("provider", "Provider to switch to", PROVIDER_NAMES)],
        move |args: ToolArguments| {
            let ctx = ctx.clone();
            async move {
                let raw = args.get_str("provider")?;
                let provider: ProviderKind = raw
                    .parse()
                    .map_err(|_| VoxError::InvalidArgument(format!("Unknown provider: {raw}")))?;

                let current = ctx.load()?;
                let config = if current.provider == provider {
                    let mut config = current;
                    config.apply_provider_defaults(provider);
                    config
                } else {
                    let mut config = ctx.defaults.config_for(provider);
                    config.system_prompt = current.system_prompt;
                    config
                };
                ctx.save(&config)?;

                tracing::info!(provider = %provider, model = %config.model_name, "switched provider");
                Ok(json!(format!("AI model provider set to {provider}")))
            }
        },
    ))
}

fn field_setter_tool(
    ctx: SettingsContext,
    name: &'static str,
    description: &'static str,
    field: &'static str,
    apply: fn(&mut ProviderConfig, String),
    reply: fn(&str) -> String,
) -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        name,
        description,
        vec![ArgumentSpec::text(field, description)],
        move |args: ToolArguments| {
            let ctx = ctx.clone();
            async move {
                let value = args.get_str(field)?.to_string();
                let mut config = ctx.load()?;
                let message = reply(&value);
                apply(&mut config, value);
                ctx.save(&config)?;
                tracing::debug!(field, "updated provider setting");
                Ok(json!(message))
            }
        },
    ))
}

fn test_connection_tool(ctx: SettingsContext) -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        "test_ai_model_connection",
        "Connect to the configured provider and disconnect again",
        Vec::new(),
        move |_args| {
            let ctx = ctx.clone();
            async move {
                let config = ctx.load()?;
                Ok(run_connection_test(config).await)
            }
        },
    ))
}

async fn run_connection_test(config: ProviderConfig) -> Value {
    let provider = config.provider;
    let mut adapter = match create_adapter(provider) {
        Ok(AdapterSelection::Native) => {
            return json!({"success": true, "message": NATIVE_TEST_MESSAGE});
        }
        Ok(AdapterSelection::Adapter(adapter)) => adapter,
        Err(e) => return failed_step("create", &e),
    };

    if let Err(e) = adapter.initialize(config) {
        return failed_step("initialize", &e);
    }
    if let Err(e) = adapter.connect().await {
        return failed_step("connect", &e);
    }
    adapter.disconnect().await;

    tracing::info!(provider = %provider, "connection test passed");
    json!({"success": true, "message": CONNECTION_TEST_SUCCESS})
}

fn failed_step(step: &str, error: &VoxError) -> Value {
    tracing::warn!(step, error = %error, "connection test failed");
    json!({
        "success": false,
        "step": step,
        "message": format!("Connection test failed during {step}: {error}"),
    })
}

fn reset_tool(ctx: SettingsContext) -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        "reset_ai_model_config",
        "Erase persisted overrides and return to the built-in defaults",
        Vec::new(),
        move |_args| {
            let ctx = ctx.clone();
            async move {
                reset_config(ctx.store.as_ref())?;
                Ok(json!(RESET_MESSAGE))
            }
        },
    ))
}

fn supported_models_tool() -> Arc<dyn Tool> {
    Arc::new(SettingsTool::new(
        "get_supported_models",
        "List the providers and models this device can use",
        Vec::new(),
        |_args| async move { Ok(supported_models()) },
    ))
}

fn config_summary(config: &ProviderConfig) -> Value {
    json!({
        "provider": config.provider.to_string(),
        "model_type": config.model_kind.to_string(),
        "model_name": config.model_name,
        "base_url": config.base_url,
        "voice_name": config.voice_name,
        "system_prompt": config.system_prompt,
        "sample_rate": config.sample_rate_hz,
        "audio_format": config.audio_format,
        "api_key_set": !config.api_key.is_empty(),
    })
}

fn supported_models() -> Value {
    json!([
        {
            "provider": "native",
            "description": "Device's own conversation protocol",
            "type": "realtime",
        },
        {
            "provider": "openai",
            "description": "OpenAI Realtime API",
            "type": "realtime",
            "models": ["gpt-4o-realtime-preview", "gpt-4o-mini-realtime-preview"],
        },
        {
            "provider": "google",
            "description": "Google Gemini",
            "type": "chat_completion",
            "models": ["gemini-2.0-flash-exp", "gemini-1.5-pro", "gemini-1.5-flash"],
        },
        {
            "provider": "anthropic",
            "description": "Anthropic Claude",
            "type": "chat_completion",
            "models": ["claude-3-5-sonnet-20241022", "claude-3-5-haiku-20241022", "claude-3-opus-20240229"],
        },
        {
            "provider": "custom",
            "description": "Custom server at a configured URL",
            "type": "custom",
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySettingsStore;

    fn tools_with_store() -> (Vec<Arc<dyn Tool>>, Arc<MemorySettingsStore>) {
        let store = Arc::new(MemorySettingsStore::new());
        let defaults = ProviderDefaults::builder()
            .provider(ProviderKind::Google)
            .google_api_key("compiled-key")
            .build();
        let tools = settings_tools(store.clone(), Arc::new(defaults));
        (tools, store)
    }

    #[test]
    fn exposes_ten_uniquely_named_tools() {
        let (tools, _) = tools_with_store();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), 10);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[tokio::test]
    async fn config_summary_hides_the_key() {
        let (tools, _) = tools_with_store();
        let tool = find_tool(&tools, "get_ai_model_config").unwrap();

        let value = tool.execute(&ToolArguments::empty()).await.unwrap();

        assert_eq!(value["provider"], "google");
        assert_eq!(value["api_key_set"], true);
        assert!(!value.to_string().contains("compiled-key"));
    }

    #[tokio::test]
    async fn setter_requires_its_argument() {
        let (tools, _) = tools_with_store();
        let tool = find_tool(&tools, "set_model_name").unwrap();

        let err = tool.execute(&ToolArguments::empty()).await.unwrap_err();
        assert!(matches!(err, VoxError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn native_connection_test_needs_no_network() {
        let store = Arc::new(MemorySettingsStore::new());
        let tools = settings_tools(store, Arc::new(ProviderDefaults::default()));
        let tool = find_tool(&tools, "test_ai_model_connection").unwrap();

        let value = tool.execute(&ToolArguments::empty()).await.unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], NATIVE_TEST_MESSAGE);
    }

    #[tokio::test]
    async fn supported_models_lists_every_provider() {
        let (tools, _) = tools_with_store();
        let tool = find_tool(&tools, "get_supported_models").unwrap();

        let value = tool.execute(&ToolArguments::empty()).await.unwrap();
        let providers: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["provider"].as_str().unwrap())
            .collect();
        assert_eq!(providers, vec!["native", "openai", "google", "anthropic", "custom"]);
    }
}
