//! Chat message rendering
//!
//! A body is either a structured notebook payload, shown as a labeled code
//! block, or free text. Free text is split on triple-backtick fences into
//! prose and code. Prose goes through the markup pipeline and may carry
//! `[Chat-> room]` jump tokens; code is escaped verbatim and gets a copy
//! button.

use std::sync::OnceLock;

use chrono::DateTime;
use regex::{Captures, Regex};
use sdk::types::{ChatMessage, NotebookPayload};

use crate::render::{escape_html, MarkupRenderer, PLACEHOLDER_PREFIX};

const FENCE: &str = "```";

/// A piece of a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code { lang: Option<&'a str>, code: &'a str },
}

/// Split a body into prose and fenced code, in order
///
/// An opening fence without a closing one is kept as prose.
pub fn split_segments(body: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = body;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };

        if open > 0 {
            segments.push(Segment::Prose(&rest[..open]));
        }

        let inner = &after_open[..close];
        let (lang, code) = match inner.split_once('\n') {
            Some((first, code)) if is_language_tag(first) => {
                let first = first.trim();
                (if first.is_empty() { None } else { Some(first) }, code)
            }
            _ => (None, inner),
        };
        segments.push(Segment::Code {
            lang,
            code: code.strip_suffix('\n').unwrap_or(code),
        });

        rest = &after_open[close + FENCE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Prose(rest));
    }
    segments
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    line.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '#' | '.'))
}

static JUMP_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Matches `[Chat-> room]` after HTML escaping
fn jump_token() -> &'static Regex {
    JUMP_TOKEN.get_or_init(|| {
        Regex::new(r"\[Chat-&gt;\s*([^\]<\s][^\]<]*?)\s*\]").expect("valid jump token regex")
    })
}

/// Display form of a message timestamp; unparseable values pass through
pub fn format_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp.trim()) {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Renders snapshots for one panel
pub struct MessageRenderer {
    markup: MarkupRenderer,
    room_switching: bool,
}

impl MessageRenderer {
    /// `room_switching` turns jump tokens into buttons
    pub fn new(room_switching: bool) -> Self {
        Self {
            markup: MarkupRenderer::default(),
            room_switching,
        }
    }

    /// Render a full snapshot; `identity` marks the reader's own messages
    pub fn render_all(&self, messages: &[ChatMessage], identity: Option<&str>) -> String {
        messages
            .iter()
            .map(|m| self.render_message(m, identity))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_message(&self, message: &ChatMessage, identity: Option<&str>) -> String {
        let is_self = identity.is_some_and(|id| id == message.author);
        format!(
            concat!(
                r#"<div class="chat-message {side}">"#,
                r#"<div class="chat-meta"><span class="chat-author">{author}</span>"#,
                r#"<time datetime="{raw_time}">{time}</time></div>"#,
                r#"<div class="chat-body">{body}</div></div>"#
            ),
            side = if is_self { "chat-self" } else { "chat-other" },
            author = escape_html(&message.author),
            raw_time = escape_html(&message.timestamp),
            time = escape_html(&format_timestamp(&message.timestamp)),
            body = self.render_body(&message.body),
        )
    }

    pub fn render_body(&self, body: &str) -> String {
        if let Some(payload) = NotebookPayload::parse(body) {
            return notebook_block(&payload);
        }

        split_segments(body)
            .into_iter()
            .map(|segment| match segment {
                Segment::Prose(text) => self.render_prose(text),
                Segment::Code { lang, code } => code_block(lang, code),
            })
            .collect()
    }

    fn render_prose(&self, text: &str) -> String {
        let text = text.trim_matches('\n');
        if !self.room_switching {
            return self.markup.render(text);
        }
        self.markup.render_with(text, |html| {
            jump_token()
                .replace_all(&html, |caps: &Captures<'_>| {
                    let room = &caps[1];
                    if room.contains(PLACEHOLDER_PREFIX) {
                        // A room name cannot hold math; keep the token as text
                        return caps[0].to_string();
                    }
                    format!(r#"<button class="chat-jump" data-room="{0}">{0}</button>"#, room)
                })
                .into_owned()
        })
    }
}

fn code_block(lang: Option<&str>, code: &str) -> String {
    let escaped = escape_html(code);
    let lang_label = lang
        .map(|l| format!(r#"<span class="chat-code-lang">{}</span>"#, escape_html(l)))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<div class="chat-code"><div class="chat-code-header">{lang}"#,
            r#"<button class="chat-copy" data-copy="{escaped}">Copy</button></div>"#,
            r#"<pre><code>{escaped}</code></pre></div>"#
        ),
        lang = lang_label,
        escaped = escaped,
    )
}

fn notebook_block(payload: &NotebookPayload) -> String {
    let escaped = escape_html(&payload.content);
    format!(
        concat!(
            r#"<div class="chat-notebook"><div class="chat-notebook-label">Notebook</div>"#,
            r#"<button class="chat-copy" data-copy="{escaped}">Copy</button>"#,
            r#"<pre><code>{escaped}</code></pre></div>"#
        ),
        escaped = escaped,
    )
}
