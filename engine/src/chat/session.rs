//! Chat session state machine
//!
//! A `ChatSession` is a plain value: which room is joined, what was last
//! rendered and how the next render should scroll. It does no I/O and owns no
//! timers, so every transition can be tested directly. The panel drives it.

/// What a join did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// A different room was joined; change detection starts over
    Switched,
    /// The current room was submitted again
    Rejoined,
}

/// How the view should scroll after a render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    /// Leave the scroll position alone
    Keep,
    /// Jump to the newest message
    Bottom,
    /// Apply a restored offset
    Offset(f64),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    room_id: Option<String>,
    last_signature: Option<String>,
    auto_scroll: bool,
    initial_load_done: bool,
    restored_offset: Option<f64>,
    just_sent: bool,
    /// Ticket of the most recently started fetch
    fetch_seq: u64,
    /// Newest ticket whose snapshot was accepted; older ones are stale
    settled_seq: u64,
}

impl ChatSession {
    pub fn new(auto_scroll: bool) -> Self {
        Self {
            room_id: None,
            last_signature: None,
            auto_scroll,
            initial_load_done: false,
            restored_offset: None,
            just_sent: false,
            fetch_seq: 0,
            settled_seq: 0,
        }
    }

    pub fn room(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn last_signature(&self) -> Option<&str> {
        self.last_signature.as_deref()
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
    }

    /// Re-enter `room` when the panel opens, with its persisted offset
    ///
    /// The offset is applied once, on the first render, and replaces the
    /// automatic scroll of that load.
    pub fn restore(&mut self, room: &str, offset: Option<f64>) {
        self.enter(room);
        self.restored_offset = offset;
    }

    /// Join `room`
    pub fn join(&mut self, room: &str) -> JoinKind {
        if self.room_id.as_deref() == Some(room) {
            return JoinKind::Rejoined;
        }
        self.enter(room);
        JoinKind::Switched
    }

    fn enter(&mut self, room: &str) {
        self.room_id = Some(room.to_string());
        self.reset();
    }

    /// Leave the current room; returns the room that was left
    pub fn leave(&mut self) -> Option<String> {
        self.reset();
        self.room_id.take()
    }

    fn reset(&mut self) {
        self.last_signature = None;
        self.initial_load_done = false;
        self.restored_offset = None;
        self.just_sent = false;
        // Fetches in flight belong to the previous room
        self.settled_seq = self.fetch_seq;
    }

    /// Start a fetch; the returned ticket orders it against other fetches
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.fetch_seq
    }

    /// Accept the snapshot of fetch `ticket`
    ///
    /// Returns false when a newer fetch has already been accepted, or the room
    /// changed after the fetch started. The snapshot must then be dropped.
    pub fn settle(&mut self, ticket: u64) -> bool {
        if ticket <= self.settled_seq {
            return false;
        }
        self.settled_seq = ticket;
        true
    }

    /// Whether a snapshot with `signature` must be rendered
    pub fn should_render(&self, signature: &str, force: bool) -> bool {
        force || self.last_signature.as_deref() != Some(signature)
    }

    /// Record that the snapshot with `signature` is now on screen
    pub fn mark_rendered(&mut self, signature: String) -> ScrollAction {
        self.last_signature = Some(signature);

        if !self.initial_load_done {
            self.initial_load_done = true;
            self.just_sent = false;
            return match self.restored_offset.take() {
                Some(offset) => ScrollAction::Offset(offset),
                None => ScrollAction::Bottom,
            };
        }

        let sent = std::mem::take(&mut self.just_sent);
        if self.auto_scroll || sent {
            ScrollAction::Bottom
        } else {
            ScrollAction::Keep
        }
    }

    /// A send or attach succeeded; the next render scrolls to the bottom
    pub fn note_sent(&mut self) {
        self.just_sent = true;
    }
}
