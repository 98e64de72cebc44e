//! Result and error presentation
//!
//! The visible surface belongs to the host page. This module defines what
//! Quill asks of it (`NotebookView`, `ModalHost`) and owns the state that
//! drives it: the modal carousels and the loading indicator.

pub mod carousel;
pub mod markup;
pub mod modal;

pub use carousel::Carousel;
pub use modal::{CloseReason, ListenerId, ModalEvent, ModalHost, ModalItem, ModalKind, ModalSlot};

use std::fmt;
use std::sync::Arc;

use crate::directive::DirectiveKind;
use crate::document::Anchor;
use crate::orchestrator::{AuditFinding, ResultItem};

/// Transient, user-visible notices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The document contains no directives
    NoDirectives,
    /// A request failed at the channel or was rejected by the relay
    ChannelFailure { context: String },
    /// The model did not answer in the requested structure
    FormatError,
    /// The audit found nothing to fix
    NoFindings,
    /// A credential is missing; names what is missing
    CredentialMissing(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDirectives => write!(f, "No [Math:], [Wolfram:] or [Explain:] directives found"),
            Self::ChannelFailure { context } => {
                write!(f, "Could not get an answer for {}. Try again", context)
            }
            Self::FormatError => write!(f, "The audit response was not in the expected format"),
            Self::NoFindings => write!(f, "No errors found"),
            Self::CredentialMissing(what) => {
                write!(f, "Missing {}. Set it in the configuration first", what)
            }
        }
    }
}

/// The host surface the orchestrator draws on
pub trait NotebookView: ModalHost {
    /// Show the shared loading indicator
    fn show_loading(&self);

    /// Hide the shared loading indicator
    fn hide_loading(&self);

    /// Show a popup next to the directive at `anchor`
    fn show_popup(&self, anchor: &Anchor, kind: DirectiveKind, html: &str);

    /// Show a transient notice
    fn notify(&self, notice: &Notice);
}

/// Shows the loading indicator for as long as it is alive
///
/// Dropping the guard hides the indicator, so every exit path of the scope
/// that created it releases it.
pub struct LoadingGuard<V: NotebookView + ?Sized> {
    view: Arc<V>,
}

impl<V: NotebookView + ?Sized> LoadingGuard<V> {
    pub fn new(view: Arc<V>) -> Self {
        view.show_loading();
        Self { view }
    }
}

impl<V: NotebookView + ?Sized> Drop for LoadingGuard<V> {
    fn drop(&mut self) {
        self.view.hide_loading();
    }
}

/// The two modal slots of a notebook
pub struct ModalManager {
    pub results: ModalSlot<ResultItem>,
    pub audit: ModalSlot<AuditFinding>,
}

impl Default for ModalManager {
    fn default() -> Self {
        Self {
            results: ModalSlot::new(ModalKind::Results),
            audit: ModalSlot::new(ModalKind::Audit),
        }
    }
}

impl ModalManager {
    /// Route a host event to the slot of `kind`
    pub fn dispatch<H: ModalHost + ?Sized>(
        &mut self,
        host: &H,
        kind: ModalKind,
        event: ModalEvent,
    ) -> bool {
        match kind {
            ModalKind::Results => self.results.handle(host, event),
            ModalKind::Audit => self.audit.handle(host, event),
        }
    }

    /// Close both slots
    pub fn close_all<H: ModalHost + ?Sized>(&mut self, host: &H, reason: CloseReason) {
        self.results.close(host, reason);
        self.audit.close(host, reason);
    }
}
