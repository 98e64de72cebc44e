//! Quill Engine Library
//!
//! This library provides the core functionality of Quill: directive
//! extraction, the Markdown + LaTeX rendering pipeline, AI orchestration,
//! result presentation and the polling chat engine.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Persisted user settings
pub mod settings;

/// Secret management module
pub mod secrets;

/// Read-only document sources and anchors
pub mod document;

/// Directive extraction
pub mod directive;

/// Markdown + LaTeX rendering pipeline
pub mod render;

/// AI relay and chat resource channels
pub mod relay;

/// AI request orchestration and audit workflow
pub mod orchestrator;

/// Popups, carousels and notices
pub mod presentation;

/// Polling chat engine
pub mod chat;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

/// Terminal implementations of the view seams
pub mod terminal;
