//! DOM events delivered to a [`Page`](crate::page::Page).

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Value of a text field changed (every keystroke).
    Input,
    /// Field gained focus. Does not bubble.
    Focus,
    Click,
    PointerDown,
    /// Image finished loading.
    Load,
    /// Image failed to load.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self { kind, target }
    }

    pub fn input(target: NodeId) -> Self {
        Self::new(EventKind::Input, target)
    }

    pub fn focus(target: NodeId) -> Self {
        Self::new(EventKind::Focus, target)
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn pointer_down(target: NodeId) -> Self {
        Self::new(EventKind::PointerDown, target)
    }

    pub fn load(target: NodeId) -> Self {
        Self::new(EventKind::Load, target)
    }

    pub fn error(target: NodeId) -> Self {
        Self::new(EventKind::Error, target)
    }
}
