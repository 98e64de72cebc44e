//! Modal carousels
//!
//! At most one modal per `ModalKind` is open. Opening a modal of a kind that
//! is already open tears the old one down first. The close button, a click
//! outside the modal and the escape key all end in the same teardown: the
//! dismiss listeners are detached and the modal is unmounted.

use std::fmt;

use super::carousel::Carousel;
use super::markup::modal_html;

/// Which modal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    /// AI results of a batch run
    Results,
    /// Audit findings
    Audit,
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Results => write!(f, "results"),
            Self::Audit => write!(f, "audit"),
        }
    }
}

/// Handle for a set of outside-click/escape listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Why a modal is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    OutsideClick,
    Escape,
    /// A new modal of the same kind replaced it
    Replaced,
}

/// Events delivered by the host to an open modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Next,
    Prev,
    Close(CloseReason),
}

/// Host-side modal mounting and listener registration
pub trait ModalHost: Send + Sync {
    /// Insert the modal into the view tree
    fn mount(&self, kind: ModalKind, html: &str);

    /// Replace the contents of a mounted modal
    fn update(&self, kind: ModalKind, html: &str);

    /// Remove the modal from the view tree
    fn unmount(&self, kind: ModalKind);

    /// Start listening for outside clicks and the escape key
    fn attach_dismiss_listeners(&self, kind: ModalKind) -> ListenerId;

    /// Stop listening
    fn detach_listeners(&self, id: ListenerId);
}

/// Something a carousel can show
pub trait ModalItem {
    /// Heading shown above the item
    fn title(&self) -> String;

    /// HTML body of the item
    fn body_html(&self) -> String;
}

struct OpenModal<T> {
    carousel: Carousel<T>,
    listeners: ListenerId,
}

/// One modal slot of a given kind
pub struct ModalSlot<T> {
    kind: ModalKind,
    open: Option<OpenModal<T>>,
}

impl<T: ModalItem> ModalSlot<T> {
    pub fn new(kind: ModalKind) -> Self {
        Self { kind, open: None }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn carousel(&self) -> Option<&Carousel<T>> {
        self.open.as_ref().map(|m| &m.carousel)
    }

    /// Open over `carousel`, replacing any modal already in this slot
    pub fn open<H: ModalHost + ?Sized>(&mut self, host: &H, carousel: Carousel<T>) {
        if self.open.is_some() {
            self.close(host, CloseReason::Replaced);
        }

        host.mount(self.kind, &modal_html(self.kind, &carousel));
        let listeners = host.attach_dismiss_listeners(self.kind);
        tracing::debug!("Opened {} modal with {} item(s)", self.kind, carousel.len());

        self.open = Some(OpenModal {
            carousel,
            listeners,
        });
    }

    /// Apply a host event; returns whether the slot changed
    pub fn handle<H: ModalHost + ?Sized>(&mut self, host: &H, event: ModalEvent) -> bool {
        match event {
            ModalEvent::Close(reason) => self.close(host, reason),
            ModalEvent::Next | ModalEvent::Prev => {
                let kind = self.kind;
                let Some(open) = self.open.as_mut() else {
                    return false;
                };
                let moved = if event == ModalEvent::Next {
                    open.carousel.next()
                } else {
                    open.carousel.prev()
                };
                if moved {
                    host.update(kind, &modal_html(kind, &open.carousel));
                }
                moved
            }
        }
    }

    /// Tear down the open modal, if any
    pub fn close<H: ModalHost + ?Sized>(&mut self, host: &H, reason: CloseReason) -> bool {
        match self.open.take() {
            Some(open) => {
                host.detach_listeners(open.listeners);
                host.unmount(self.kind);
                tracing::debug!("Closed {} modal ({:?})", self.kind, reason);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        log: Mutex<Vec<String>>,
        next_id: Mutex<u64>,
    }

    impl RecordingHost {
        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl ModalHost for RecordingHost {
        fn mount(&self, kind: ModalKind, _html: &str) {
            self.log.lock().unwrap().push(format!("mount {kind}"));
        }
        fn update(&self, kind: ModalKind, html: &str) {
            let disabled = html.matches("disabled").count();
            self.log
                .lock()
                .unwrap()
                .push(format!("update {kind} disabled={disabled}"));
        }
        fn unmount(&self, kind: ModalKind) {
            self.log.lock().unwrap().push(format!("unmount {kind}"));
        }
        fn attach_dismiss_listeners(&self, kind: ModalKind) -> ListenerId {
            let mut id = self.next_id.lock().unwrap();
            *id += 1;
            self.log.lock().unwrap().push(format!("attach {kind} {}", *id));
            ListenerId(*id)
        }
        fn detach_listeners(&self, id: ListenerId) {
            self.log.lock().unwrap().push(format!("detach {}", id.0));
        }
    }

    struct Item(&'static str);

    impl ModalItem for Item {
        fn title(&self) -> String {
            "Item".to_string()
        }
        fn body_html(&self) -> String {
            self.0.to_string()
        }
    }

    fn carousel(items: &[&'static str]) -> Carousel<Item> {
        Carousel::new(items.iter().map(|s| Item(*s)).collect()).unwrap()
    }

    #[test]
    fn test_every_close_path_tears_down() {
        for reason in [
            CloseReason::CloseButton,
            CloseReason::OutsideClick,
            CloseReason::Escape,
        ] {
            let host = RecordingHost::default();
            let mut slot = ModalSlot::new(ModalKind::Results);
            slot.open(&host, carousel(&["a"]));

            assert!(slot.handle(&host, ModalEvent::Close(reason)));
            assert!(!slot.is_open());
            assert_eq!(
                host.log(),
                vec!["mount results", "attach results 1", "detach 1", "unmount results"]
            );
        }
    }

    #[test]
    fn test_open_replaces_existing() {
        let host = RecordingHost::default();
        let mut slot = ModalSlot::new(ModalKind::Audit);
        slot.open(&host, carousel(&["a"]));
        slot.open(&host, carousel(&["b", "c"]));

        assert_eq!(
            host.log(),
            vec![
                "mount audit",
                "attach audit 1",
                "detach 1",
                "unmount audit",
                "mount audit",
                "attach audit 2",
            ]
        );
        assert_eq!(slot.carousel().unwrap().len(), 2);
    }

    #[test]
    fn test_navigation_updates_only_on_move() {
        let host = RecordingHost::default();
        let mut slot = ModalSlot::new(ModalKind::Results);
        slot.open(&host, carousel(&["a", "b"]));

        assert!(!slot.handle(&host, ModalEvent::Prev));
        assert!(slot.handle(&host, ModalEvent::Next));
        assert!(!slot.handle(&host, ModalEvent::Next));

        let updates: Vec<_> = host
            .log()
            .into_iter()
            .filter(|l| l.starts_with("update"))
            .collect();
        assert_eq!(updates, vec!["update results disabled=1"]);
    }

    #[test]
    fn test_close_when_nothing_open() {
        let host = RecordingHost::default();
        let mut slot: ModalSlot<Item> = ModalSlot::new(ModalKind::Results);
        assert!(!slot.close(&host, CloseReason::Escape));
        assert!(host.log().is_empty());
    }
}
