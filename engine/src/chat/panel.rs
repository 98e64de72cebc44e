//! Chat panel controller
//!
//! The panel owns its `ChatSession`, the poll task and the pending scroll
//! write. Exactly one poll task exists while a room is joined; starting a new
//! one aborts the previous handle first, and closing or dropping the panel
//! aborts it. The session sits behind a tokio mutex shared with the poll
//! task, but the lock is never held across a network call.

use std::sync::Arc;
use std::time::Duration;

use sdk::errors::EngineError;
use sdk::types::{ChatPost, NotebookPayload};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::render::MessageRenderer;
use super::session::{ChatSession, JoinKind, ScrollAction};
use super::signature::snapshot_signature;
use crate::config::ChatConfig;
use crate::document::DocumentSource;
use crate::presentation::Notice;
use crate::relay::chat::ChatChannel;
use crate::settings::Settings;

/// The chat surface of the host page
pub trait ChatView: Send + Sync {
    /// Show the room picker; no room is joined
    fn show_landing(&self);

    /// Replace the message list of `room`
    fn render_messages(&self, room: &str, html: &str);

    /// Remove all rendered messages
    fn clear(&self);

    fn scroll_to_bottom(&self);

    fn apply_scroll_offset(&self, offset: f64);

    /// Enable or disable the send and attach controls
    fn set_send_enabled(&self, enabled: bool);

    fn notify(&self, notice: &Notice);

    /// Whether `[Chat-> room]` tokens can switch rooms in this view
    fn supports_room_switch(&self) -> bool {
        true
    }
}

struct Shared {
    session: Mutex<ChatSession>,
    renderer: MessageRenderer,
    channel: Arc<dyn ChatChannel>,
    view: Arc<dyn ChatView>,
    settings: Settings,
}

impl Shared {
    /// Fetch the joined room and render it if it changed (or if `force`)
    ///
    /// Returns whether a render happened.
    async fn refresh(&self, force: bool) -> bool {
        let (room, ticket) = {
            let mut session = self.session.lock().await;
            let Some(room) = session.room().map(str::to_string) else {
                return false;
            };
            (room, session.begin_fetch())
        };

        let Some(messages) = self.channel.fetch(&room).await else {
            tracing::debug!("Fetch of room '{}' failed, keeping current view", room);
            return false;
        };

        let mut session = self.session.lock().await;
        if session.room() != Some(room.as_str()) || !session.settle(ticket) {
            // Room changed, or a newer fetch already landed, while this one was in flight
            tracing::trace!("Dropping stale snapshot of room '{}'", room);
            return false;
        }

        let signature = snapshot_signature(&messages);
        if !session.should_render(&signature, force) {
            tracing::trace!("Room '{}' unchanged", room);
            return false;
        }

        let identity = self.settings.chat_identity();
        let html = self.renderer.render_all(&messages, identity.as_deref());
        self.view.render_messages(&room, &html);
        tracing::debug!("Rendered {} message(s) in room '{}'", messages.len(), room);

        match session.mark_rendered(signature) {
            ScrollAction::Bottom => self.view.scroll_to_bottom(),
            ScrollAction::Offset(offset) => self.view.apply_scroll_offset(offset),
            ScrollAction::Keep => {}
        }
        true
    }
}

pub struct ChatPanel {
    shared: Arc<Shared>,
    config: ChatConfig,
    poll: Option<JoinHandle<()>>,
    scroll_write: Option<JoinHandle<()>>,
}

impl ChatPanel {
    /// Open the panel, rejoining the last room if one was persisted
    pub async fn open(
        channel: Arc<dyn ChatChannel>,
        view: Arc<dyn ChatView>,
        settings: Settings,
        config: ChatConfig,
    ) -> Self {
        let session = ChatSession::new(settings.auto_scroll());
        let renderer = MessageRenderer::new(view.supports_room_switch());
        let mut panel = Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                renderer,
                channel,
                view,
                settings,
            }),
            config,
            poll: None,
            scroll_write: None,
        };

        match panel.shared.settings.last_room() {
            Some(room) => {
                let offset = panel.shared.settings.scroll_offset(&room);
                tracing::info!("Restoring chat room '{}'", room);
                panel.shared.session.lock().await.restore(&room, offset);
                panel.shared.refresh(true).await;
                panel.start_polling();
            }
            None => panel.shared.view.show_landing(),
        }

        panel
    }

    pub async fn room(&self) -> Option<String> {
        self.shared.session.lock().await.room().map(str::to_string)
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Join `room`
    ///
    /// A different room is persisted, fetched and rendered at once, then
    /// polled. Submitting the current room again re-fetches and force-renders
    /// without touching the stored scroll offset.
    pub async fn join(&mut self, room: &str) -> Result<JoinKind, EngineError> {
        let room = room.trim();
        if room.is_empty() {
            return Err(EngineError::Settings("Room name cannot be empty".to_string()));
        }

        let kind = self.shared.session.lock().await.join(room);
        match kind {
            JoinKind::Switched => {
                tracing::info!("Joining chat room '{}'", room);
                self.shared.settings.set_last_room(Some(room))?;
                self.cancel_scroll_write();
                self.shared.view.clear();
                self.shared.refresh(true).await;
                self.start_polling();
            }
            JoinKind::Rejoined => {
                tracing::debug!("Rejoining chat room '{}'", room);
                self.shared.refresh(true).await;
                if !self.is_polling() {
                    self.start_polling();
                }
            }
        }
        Ok(kind)
    }

    /// Leave the current room and return to the landing view
    pub async fn leave(&mut self) -> Result<(), EngineError> {
        self.stop_polling();
        self.cancel_scroll_write();

        if let Some(room) = self.shared.session.lock().await.leave() {
            tracing::info!("Left chat room '{}'", room);
        }
        self.shared.settings.set_last_room(None)?;
        self.shared.view.clear();
        self.shared.view.show_landing();
        Ok(())
    }

    /// One poll tick, as run by the timer
    pub async fn poll_once(&self) -> bool {
        self.shared.refresh(false).await
    }

    /// Send a text message to the joined room
    ///
    /// # Errors
    /// Returns `EngineError::CredentialMissing` when no chat identity is set;
    /// nothing is sent in that case.
    pub async fn send(&mut self, text: &str) -> Result<bool, EngineError> {
        if text.trim().is_empty() {
            return Ok(false);
        }
        self.post(text.to_string()).await
    }

    /// Send the document's text as a notebook payload
    pub async fn attach(&mut self, document: &dyn DocumentSource) -> Result<bool, EngineError> {
        let body = NotebookPayload::new(document.full_text()).to_body();
        self.post(body).await
    }

    async fn post(&mut self, body: String) -> Result<bool, EngineError> {
        let Some(author) = self.shared.settings.chat_identity() else {
            let missing = EngineError::CredentialMissing("chat identity".to_string());
            self.shared
                .view
                .notify(&Notice::CredentialMissing("chat identity".to_string()));
            return Err(missing);
        };
        let Some(room) = self.room().await else {
            return Ok(false);
        };

        let view = &self.shared.view;
        view.set_send_enabled(false);
        let sent = self
            .shared
            .channel
            .post(&room, &ChatPost { author, body })
            .await;
        view.set_send_enabled(true);

        if !sent {
            view.notify(&Notice::ChannelFailure {
                context: format!("your message to '{}'", room),
            });
            return Ok(false);
        }

        self.shared.session.lock().await.note_sent();
        self.shared.refresh(true).await;
        Ok(true)
    }

    pub async fn set_auto_scroll(&mut self, enabled: bool) -> Result<(), EngineError> {
        self.shared.settings.set_auto_scroll(enabled)?;
        self.shared.session.lock().await.set_auto_scroll(enabled);
        Ok(())
    }

    /// Record a manual scroll; only the last offset within the debounce
    /// window is persisted
    pub async fn on_scroll(&mut self, offset: f64) {
        let Some(room) = self.room().await else {
            return;
        };

        self.cancel_scroll_write();
        let settings = self.shared.settings.clone();
        let wait = self.config.scroll_debounce();
        self.scroll_write = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if let Err(e) = settings.set_scroll_offset(&room, offset) {
                tracing::warn!("Failed to persist scroll offset for '{}': {}", room, e);
            }
        }));
    }

    /// Stop polling and release the panel
    pub fn close(mut self) {
        self.stop_polling();
        tracing::debug!("Chat panel closed");
    }

    fn start_polling(&mut self) {
        self.stop_polling();

        let shared = Arc::clone(&self.shared);
        let period = self.config.poll_interval();
        self.poll = Some(tokio::spawn(poll_loop(shared, period)));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    fn cancel_scroll_write(&mut self) {
        if let Some(handle) = self.scroll_write.take() {
            handle.abort();
        }
    }
}

impl Drop for ChatPanel {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

async fn poll_loop(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the caller has just rendered
    ticker.tick().await;

    loop {
        ticker.tick().await;
        shared.refresh(false).await;
    }
}
