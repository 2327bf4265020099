//! voxlink CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxlink::cli::commands;
use voxlink::cli::{Cli, Commands};
use voxlink::config::{FileSettingsStore, ProviderDefaults, SettingsStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let defaults = Arc::new(ProviderDefaults::from_env());
    let store: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::new_default());
    tracing::debug!(provider = %defaults.provider, "defaults loaded");

    let result = match cli.command {
        Commands::Config(args) => commands::handle_config(args.command, store, defaults).await,
        Commands::Models => commands::handle_models(store, defaults).await,
        Commands::Tools => commands::handle_tools(store, defaults),
        Commands::Test => commands::handle_test(store, defaults).await,
        Commands::Chat(args) => commands::handle_chat(args, store, defaults).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
