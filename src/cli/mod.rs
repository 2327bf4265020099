//! Command-line front end for inspecting and switching the active provider.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// voxlink CLI
#[derive(Parser, Debug)]
#[command(name = "voxlink", version, about = "Voice-assistant provider configuration and testing")]
pub struct Cli {
    /// Emit debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or change the persisted provider configuration
    Config(ConfigArgs),
    /// List supported providers and models
    Models,
    /// Print the settings tools with their argument schemas
    Tools,
    /// Connect to the configured provider and disconnect again
    Test,
    /// Send one prompt through the bridge and print the reply
    Chat(ChatArgs),
}

/// Arguments for the `config` subcommand group.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the active configuration (the API key is never shown)
    Show,
    /// Erase persisted overrides
    Reset,
    /// Switch to another provider (native, openai, google, anthropic, custom)
    Provider { provider: String },
    /// Set one field: api_key, model_name, base_url, voice_name or system_prompt
    Set { field: String, value: String },
}

/// Arguments for the `chat` subcommand.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Seconds to wait for the first reply
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,

    /// User prompt (positional)
    pub prompt: String,
}
