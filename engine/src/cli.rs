//! CLI interface for Quill
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill notebook assistant
///
/// Answers inline [Math:], [Wolfram:] and [Explain:] directives in a text
/// notebook, audits notebooks for errors and chats in shared rooms.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer every directive in a notebook file
    Run {
        /// Notebook file (cells are separated by blank lines)
        file: PathBuf,

        /// Processing mode: v1 (per-anchor popups) or v2 (batch carousel)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Ask a free-form question
    Ask {
        /// The question
        text: String,
    },

    /// Check a notebook for errors
    Audit {
        /// Notebook file
        file: PathBuf,
    },

    /// Open a chat room
    Chat {
        /// Room to join; defaults to the last joined room
        room: Option<String>,
    },

    /// Render a file of Markdown and LaTeX to HTML
    Render {
        /// Input file
        file: PathBuf,
    },

    /// Manage configuration and persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage the relay token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration and settings
    Show,

    /// Set the processing mode (v1 or v2)
    SetMode {
        mode: String,
    },

    /// Select the AI model
    SetModel {
        model: String,
    },

    /// Set the chat identity
    SetIdentity {
        name: String,
    },
}

/// Relay token actions
#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store a relay token in the OS keychain (read from the terminal)
    Set,

    /// Check the stored token against the relay
    Validate,

    /// Remove the stored token
    Clear,
}
