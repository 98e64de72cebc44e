// Quill notebook assistant
// Main entry point for the quill binary

use clap::Parser;
use quill_engine::cli::{Cli, Command};
use quill_engine::config::Config;
use quill_engine::handlers::{
    handle_ask, handle_audit, handle_chat, handle_config, handle_render, handle_run, handle_token,
    OutputFormat,
};
use quill_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log overrides the configured level; RUST_LOG overrides both
    let level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");
    tracing::info!("Quill v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Run { file, mode } => {
            tracing::info!("Running directives in {}", file.display());
            handle_run(&file, mode, &config, format).await
        }
        Command::Ask { text } => handle_ask(text, &config, format).await,
        Command::Audit { file } => {
            tracing::info!("Auditing {}", file.display());
            handle_audit(&file, &config, format).await
        }
        Command::Chat { room } => handle_chat(room, &config, format).await,
        Command::Render { file } => handle_render(&file, format).await,
        Command::Config { action } => {
            tracing::info!("Config management: {:?}", action);
            handle_config(action, &config, format).await
        }
        Command::Token { action } => {
            tracing::info!("Token management: {:?}", action);
            handle_token(action, &config, format).await
        }
    }
}
