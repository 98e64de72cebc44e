//! HTML for popups and modals
//!
//! Navigation buttons are always present in a carousel and carry the
//! `disabled` attribute at the boundaries instead of being hidden.

use super::carousel::Carousel;
use super::modal::{ModalItem, ModalKind};
use crate::directive::DirectiveKind;
use crate::render::escape_html;

fn disabled(enabled: bool) -> &'static str {
    if enabled {
        ""
    } else {
        " disabled"
    }
}

/// Markup of a carousel modal showing the current item
pub fn modal_html<T: ModalItem>(kind: ModalKind, carousel: &Carousel<T>) -> String {
    let item = carousel.current();
    format!(
        concat!(
            r#"<div class="quill-modal" data-kind="{kind}">"#,
            r#"<header><span class="quill-modal-title">{title}</span>"#,
            r#"<button class="quill-close" data-action="close">&times;</button></header>"#,
            r#"<section class="quill-modal-body">{body}</section>"#,
            r#"<footer><button class="quill-nav" data-action="prev"{prev}>&lsaquo;</button>"#,
            r#"<span class="quill-counter">{position} / {total}</span>"#,
            r#"<button class="quill-nav" data-action="next"{next}>&rsaquo;</button></footer>"#,
            r#"</div>"#
        ),
        kind = kind,
        title = escape_html(&item.title()),
        body = item.body_html(),
        prev = disabled(carousel.can_prev()),
        next = disabled(carousel.can_next()),
        position = carousel.index() + 1,
        total = carousel.len(),
    )
}

/// Markup of a popup attached next to a directive
pub fn popup_html(kind: DirectiveKind, rendered: &str) -> String {
    format!(
        concat!(
            r#"<div class="quill-popup" data-kind="{kind}">"#,
            r#"<button class="quill-close" data-action="close">&times;</button>"#,
            r#"<div class="quill-popup-body">{body}</div></div>"#
        ),
        kind = kind.label().to_lowercase(),
        body = rendered,
    )
}
