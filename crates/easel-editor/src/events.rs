//! Input and notification events
//!
//! Hit testing belongs to the host: every pointer event names the node
//! under the pointer.

use easel_dom::NodeId;

use crate::SelectionKind;

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, shift: false, alt: false, meta: false };

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }
}

/// Pointer event in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    /// Node under the pointer
    pub target: Option<NodeId>,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, target: Option<NodeId>) -> Self {
        Self { x, y, target, modifiers: Modifiers::NONE }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Notifications queued for the host
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Resolved selection changed
    SelectionChanged { node: NodeId, kind: SelectionKind },
    /// Selection dropped (delete, clear, history transition)
    SelectionCleared,
    /// Host should bring the node into view
    ScrollIntoView(NodeId),
    /// Markup produced by the copy command
    Copied(String),
}
