//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - run: Answer every directive in a notebook
//! - ask: Send a free-form question
//! - audit: Check a notebook for errors
//! - chat: Interactive chat room on the terminal
//! - render: Render Markdown + LaTeX to HTML
//! - config / token: Settings and credential management

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use sdk::errors::{EngineError, QuillErrorExt};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chat::ChatPanel;
use crate::cli::{ConfigAction, TokenAction};
use crate::config::Config;
use crate::document::TextDocument;
use crate::orchestrator::{AuditOutcome, Orchestrator, RunOutcome};
use crate::presentation::{CloseReason, ModalEvent, ModalKind};
use crate::relay::chat::HttpChatChannel;
use crate::relay::HttpRelay;
use crate::render::render_latex;
use crate::secrets::{SecretManager, RELAY_TOKEN_KEY};
use crate::settings::{FileStore, ProcessingMode, Settings};
use crate::terminal::TerminalView;

/// Keychain service name
const SERVICE_NAME: &str = "quill";

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

fn open_settings(config: &Config) -> Result<Settings> {
    let store = FileStore::open(config.settings_path()).context("Failed to open settings")?;
    Ok(Settings::new(Arc::new(store)))
}

fn build_orchestrator(config: &Config, view: Arc<TerminalView>) -> Result<Orchestrator> {
    let settings = open_settings(config)?;
    let token = SecretManager::new(SERVICE_NAME).relay_token();
    let relay = HttpRelay::new(config.relay.base_url.clone(), token);
    Ok(Orchestrator::new(
        Arc::new(relay),
        view,
        settings,
        config.ai.clone(),
    ))
}

fn load_document(path: &Path) -> Result<TextDocument> {
    TextDocument::load(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Answer every directive in a notebook file
pub async fn handle_run(
    file: &Path,
    mode: Option<String>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let document = load_document(file)?;
    let view = Arc::new(TerminalView::new(format));
    let mut orchestrator = build_orchestrator(config, Arc::clone(&view))?;

    let outcome = match mode {
        Some(mode) => {
            let mode: ProcessingMode = mode.parse()?;
            orchestrator.run_directives_in(&document, mode).await
        }
        None => orchestrator.run_directives(&document).await,
    };

    // A terminal has no buttons: page through the carousel, then close it
    if orchestrator.modals().results.is_open() {
        while orchestrator.handle_modal_event(ModalKind::Results, ModalEvent::Next) {}
        orchestrator.handle_modal_event(
            ModalKind::Results,
            ModalEvent::Close(CloseReason::CloseButton),
        );
    }

    match (format, outcome) {
        (OutputFormat::Text, RunOutcome::Completed { answered, failed }) => {
            println!();
            println!("✓ {} answered, {} failed", answered, failed);
        }
        (OutputFormat::Json, RunOutcome::Completed { answered, failed }) => {
            let output = json!({ "status": "completed", "answered": answered, "failed": failed });
            println!("{}", serde_json::to_string(&output)?);
        }
        _ => {}
    }
    Ok(())
}

/// Send a free-form question
pub async fn handle_ask(text: String, config: &Config, format: OutputFormat) -> Result<()> {
    let view = Arc::new(TerminalView::new(format));
    let orchestrator = build_orchestrator(config, view)?;

    let Some(html) = orchestrator.ask(&text).await else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => println!("{}", html),
        OutputFormat::Json => {
            let output = json!({ "status": "answered", "html": html });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Audit a notebook file
pub async fn handle_audit(file: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    let document = load_document(file)?;
    let view = Arc::new(TerminalView::new(format));
    let mut orchestrator = build_orchestrator(config, view)?;

    let outcome = orchestrator.audit(&document).await;
    if let AuditOutcome::Findings(count) = outcome {
        while orchestrator.handle_modal_event(ModalKind::Audit, ModalEvent::Next) {}
        orchestrator
            .handle_modal_event(ModalKind::Audit, ModalEvent::Close(CloseReason::CloseButton));

        if let OutputFormat::Text = format {
            println!();
            println!("{} finding(s)", count);
        }
    }
    Ok(())
}

/// Render a file to HTML
pub async fn handle_render(file: &Path, format: OutputFormat) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let html = render_latex(&text);

    match format {
        OutputFormat::Text => println!("{}", html),
        OutputFormat::Json => println!("{}", serde_json::to_string(&json!({ "html": html }))?),
    }
    Ok(())
}

/// Interactive chat on the terminal
///
/// Plain lines are sent as messages. Commands: `/join <room>`, `/leave`,
/// `/attach <file>`, `/auto on|off`, `/quit`.
pub async fn handle_chat(room: Option<String>, config: &Config, format: OutputFormat) -> Result<()> {
    let settings = open_settings(config)?;
    let view = Arc::new(TerminalView::new(format));
    let channel = Arc::new(HttpChatChannel::new(config.chat.base_url.clone()));

    let mut panel = ChatPanel::open(channel, view, settings, config.chat.clone()).await;
    if let Some(room) = room {
        panel.join(&room).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        let result = match command {
            "" => Ok(()),
            "/quit" | "/exit" => break,
            "/join" => panel.join(argument).await.map(|_| ()),
            "/leave" => panel.leave().await,
            "/attach" => match TextDocument::load(Path::new(argument)) {
                Ok(document) => panel.attach(&document).await.map(|_| ()),
                Err(e) => Err(e),
            },
            "/auto" => panel.set_auto_scroll(argument != "off").await,
            _ => panel.send(line).await.map(|_| ()),
        };

        if let Err(e) = result {
            report_recoverable(&e);
        }
    }

    panel.close();
    Ok(())
}

fn report_recoverable(error: &EngineError) {
    tracing::debug!("Chat action failed: {}", error);
    eprintln!("! {}", error.user_hint());
}

/// Manage configuration and persisted settings
pub async fn handle_config(
    action: ConfigAction,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let settings = open_settings(config)?;

    match action {
        ConfigAction::Show => {
            let model = settings.model(&config.ai);
            let identity = settings.chat_identity();
            let room = settings.last_room();
            match format {
                OutputFormat::Text => {
                    println!("Configuration:");
                    println!("{}", toml::to_string_pretty(config)?);
                    println!("Settings:");
                    println!("  Processing mode: {}", settings.processing_mode());
                    println!("  Model:           {}", model);
                    println!(
                        "  Chat identity:   {}",
                        identity.as_deref().unwrap_or("(not set)")
                    );
                    println!("  Last room:       {}", room.as_deref().unwrap_or("(none)"));
                    println!("  Auto-scroll:     {}", settings.auto_scroll());
                }
                OutputFormat::Json => {
                    let output = json!({
                        "config": config,
                        "settings": {
                            "processing_mode": settings.processing_mode(),
                            "model": model,
                            "chat_identity": identity,
                            "last_room": room,
                            "auto_scroll": settings.auto_scroll(),
                        }
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        ConfigAction::SetMode { mode } => {
            let mode: ProcessingMode = mode.parse()?;
            settings.set_processing_mode(mode)?;
            println!("Processing mode set to {}", mode);
        }
        ConfigAction::SetModel { model } => {
            settings.set_model(&config.ai, &model)?;
            println!("Model set to {}", model);
        }
        ConfigAction::SetIdentity { name } => {
            if name.trim().is_empty() {
                anyhow::bail!("Chat identity cannot be empty");
            }
            settings.set_chat_identity(&name)?;
            println!("Chat identity set to {}", name.trim());
        }
    }
    Ok(())
}

/// Manage the relay token
pub async fn handle_token(action: TokenAction, config: &Config, format: OutputFormat) -> Result<()> {
    let secrets = SecretManager::new(SERVICE_NAME);

    match action {
        TokenAction::Set => {
            let token = rpassword::prompt_password_stderr("Relay token: ")
                .context("Failed to read token from terminal")?;
            secrets.set_secret(RELAY_TOKEN_KEY, token.trim())?;
            println!("✓ Relay token stored");
        }
        TokenAction::Validate => {
            let relay = HttpRelay::new(config.relay.base_url.clone(), secrets.relay_token());
            let result = relay
                .check_token(config.relay.token_validation_timeout())
                .await;
            let valid = matches!(result, Ok(true));
            match format {
                OutputFormat::Text => match result {
                    Ok(true) => println!("✓ Relay token is valid"),
                    Ok(false) => println!("✗ Relay token was rejected"),
                    Err(e) => println!("✗ Relay token could not be validated: {}", e.user_hint()),
                },
                OutputFormat::Json => {
                    let reason = result.err().map(|e| e.to_string());
                    let output = json!({ "valid": valid, "error": reason });
                    println!("{}", serde_json::to_string(&output)?);
                }
            }
        }
        TokenAction::Clear => {
            secrets.delete_secret(RELAY_TOKEN_KEY)?;
            println!("Relay token removed");
        }
    }
    Ok(())
}
