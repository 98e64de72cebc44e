//! Terminal host for the CLI
//!
//! Implements the notebook and chat view seams by writing rendered markup to
//! stdout, either as-is or as one JSON event per line with `--json`.
//! Notices and the loading indicator go to stderr.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde_json::json;

use crate::chat::ChatView;
use crate::directive::DirectiveKind;
use crate::document::Anchor;
use crate::handlers::OutputFormat;
use crate::presentation::{ListenerId, ModalHost, ModalKind, NotebookView, Notice};

pub struct TerminalView {
    format: OutputFormat,
    next_listener: AtomicU64,
    loading: AtomicBool,
}

impl TerminalView {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            next_listener: AtomicU64::new(1),
            loading: AtomicBool::new(false),
        }
    }

    fn emit(&self, event: &str, label: &str, html: &str) {
        match self.format {
            OutputFormat::Text => {
                if !label.is_empty() {
                    println!("--- {} ---", label);
                }
                println!("{}", html);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({ "event": event, "label": label, "html": html })
                );
            }
        }
    }

    fn notice(&self, notice: &Notice) {
        match self.format {
            OutputFormat::Text => eprintln!("! {}", notice),
            OutputFormat::Json => {
                println!("{}", json!({ "event": "notice", "message": notice.to_string() }));
            }
        }
    }
}

impl ModalHost for TerminalView {
    fn mount(&self, kind: ModalKind, html: &str) {
        self.emit("modal", &kind.to_string(), html);
    }

    fn update(&self, kind: ModalKind, html: &str) {
        self.emit("modal", &kind.to_string(), html);
    }

    fn unmount(&self, kind: ModalKind) {
        tracing::debug!("Unmounted {} modal", kind);
    }

    fn attach_dismiss_listeners(&self, _kind: ModalKind) -> ListenerId {
        ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed))
    }

    fn detach_listeners(&self, id: ListenerId) {
        tracing::trace!("Detached listeners {}", id.0);
    }
}

impl NotebookView for TerminalView {
    fn show_loading(&self) {
        if !self.loading.swap(true, Ordering::Relaxed) && matches!(self.format, OutputFormat::Text)
        {
            eprintln!("Working...");
        }
    }

    fn hide_loading(&self) {
        self.loading.store(false, Ordering::Relaxed);
    }

    fn show_popup(&self, anchor: &Anchor, kind: DirectiveKind, html: &str) {
        self.emit("popup", &format!("{} at {}", kind, anchor), html);
    }

    fn notify(&self, notice: &Notice) {
        self.notice(notice);
    }
}

impl ChatView for TerminalView {
    fn show_landing(&self) {
        if matches!(self.format, OutputFormat::Text) {
            eprintln!("No room joined. Type /join <room> to enter one.");
        }
    }

    fn render_messages(&self, room: &str, html: &str) {
        self.emit("messages", room, html);
    }

    fn clear(&self) {}

    fn scroll_to_bottom(&self) {}

    fn apply_scroll_offset(&self, offset: f64) {
        tracing::trace!("Scroll offset {} restored", offset);
    }

    fn set_send_enabled(&self, enabled: bool) {
        tracing::trace!("Send controls enabled: {}", enabled);
    }

    fn notify(&self, notice: &Notice) {
        self.notice(notice);
    }

    fn supports_room_switch(&self) -> bool {
        false
    }
}
