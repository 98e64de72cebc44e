//! Polling group chat
//!
//! A panel joins one room at a time and polls the room resource on a fixed
//! cadence. Each poll fetches the full snapshot; a snapshot whose signature
//! matches the one on screen is discarded, so an idle room never re-renders.

pub mod panel;
pub mod render;
pub mod session;
pub mod signature;

pub use panel::{ChatPanel, ChatView};
pub use render::{format_timestamp, split_segments, MessageRenderer, Segment};
pub use session::{ChatSession, JoinKind, ScrollAction};
pub use signature::snapshot_signature;
