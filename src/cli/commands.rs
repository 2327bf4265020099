//! CLI command handlers. Configuration commands go through the settings tools.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use super::{ChatArgs, ConfigCommands};
use crate::bridge::{ConversationChannel, ProtocolBridge};
use crate::config::{ProviderDefaults, SettingsStore};
use crate::error::{Result, VoxError};
use crate::tools::{find_tool, settings_tools, Tool, ToolArguments};

const SETTABLE_FIELDS: [&str; 5] = ["api_key", "model_name", "base_url", "voice_name", "system_prompt"];

/// Handle `voxlink config ...`.
pub async fn handle_config(
    command: ConfigCommands,
    store: Arc<dyn SettingsStore>,
    defaults: Arc<ProviderDefaults>,
) -> Result<()> {
    let tools = settings_tools(store, defaults);
    let output = match command {
        ConfigCommands::Show => run_tool(&tools, "get_ai_model_config", ToolArguments::empty()).await?,
        ConfigCommands::Reset => run_tool(&tools, "reset_ai_model_config", ToolArguments::empty()).await?,
        ConfigCommands::Provider { provider } => {
            run_tool(&tools, "set_ai_model_provider", ToolArguments::new(json!({ "provider": provider })))
                .await?
        }
        ConfigCommands::Set { field, value } => {
            if !SETTABLE_FIELDS.contains(&field.as_str()) {
                return Err(VoxError::InvalidArgument(format!(
                    "Unknown field: {field} (expected one of {})",
                    SETTABLE_FIELDS.join(", ")
                )));
            }
            let mut values = serde_json::Map::new();
            values.insert(field.clone(), json!(value));
            let args = ToolArguments::new(serde_json::Value::Object(values));
            run_tool(&tools, &format!("set_{field}"), args).await?
        }
    };
    print_value(&output)
}

/// Handle `voxlink models`.
pub async fn handle_models(store: Arc<dyn SettingsStore>, defaults: Arc<ProviderDefaults>) -> Result<()> {
    let tools = settings_tools(store, defaults);
    let output = run_tool(&tools, "get_supported_models", ToolArguments::empty()).await?;
    print_value(&output)
}

/// Handle `voxlink tools`.
pub fn handle_tools(store: Arc<dyn SettingsStore>, defaults: Arc<ProviderDefaults>) -> Result<()> {
    let descriptors: Vec<serde_json::Value> = settings_tools(store, defaults)
        .iter()
        .map(|tool| tool.descriptor())
        .collect();
    print_value(&serde_json::Value::Array(descriptors))
}

/// Handle `voxlink test`. Fails when the connection test does.
pub async fn handle_test(store: Arc<dyn SettingsStore>, defaults: Arc<ProviderDefaults>) -> Result<()> {
    let tools = settings_tools(store, defaults);
    let output = run_tool(&tools, "test_ai_model_connection", ToolArguments::empty()).await?;
    let message = output["message"].as_str().unwrap_or_default().to_string();
    if output["success"].as_bool() == Some(true) {
        println!("{message}");
        Ok(())
    } else {
        Err(VoxError::Transport(message))
    }
}

/// Handle `voxlink chat <prompt>`.
pub async fn handle_chat(
    args: ChatArgs,
    store: Arc<dyn SettingsStore>,
    defaults: Arc<ProviderDefaults>,
) -> Result<()> {
    let mut bridge = ProtocolBridge::from_store(&defaults, store.as_ref())?;
    if bridge.is_native() {
        return Err(VoxError::NotInitialized(
            "native provider selected; switch with `voxlink config provider <name>`".into(),
        ));
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<std::result::Result<String, String>>();
    let text_tx = tx.clone();
    bridge.on_incoming_text(Arc::new(move |text: String| {
        let _ = text_tx.send(Ok(text));
    }));
    bridge.on_network_error(Arc::new(move |message: String| {
        let _ = tx.send(Err(message));
    }));

    bridge.open_channel().await?;
    let sent = bridge.send_text(&args.prompt).await;
    let reply = match sent {
        Ok(()) => tokio::time::timeout(Duration::from_secs(args.timeout), rx.recv()).await,
        Err(e) => {
            bridge.close_channel().await;
            return Err(e);
        }
    };
    bridge.close_channel().await;

    match reply {
        Ok(Some(Ok(text))) => {
            println!("{text}");
            Ok(())
        }
        Ok(Some(Err(message))) => Err(VoxError::Transport(message)),
        Ok(None) => Err(VoxError::Transport("reply channel closed".into())),
        Err(_) => Err(VoxError::Transport(format!(
            "no reply within {} seconds",
            args.timeout
        ))),
    }
}

async fn run_tool(tools: &[Arc<dyn Tool>], name: &str, args: ToolArguments) -> Result<serde_json::Value> {
    let tool = find_tool(tools, name)
        .ok_or_else(|| VoxError::InvalidArgument(format!("Unknown command: {name}")))?;
    tool.execute(&args).await
}

fn print_value(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
