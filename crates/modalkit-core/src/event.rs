#![forbid(unsafe_code)]

//! Input events delivered by the host to the page.
//!
//! Keyboard events carry a [`KeyCode`], a [`Modifiers`] set, and a
//! [`KeyEventKind`]. Pointer events carry the [`NodeId`] they were
//! dispatched at (`target`), mirroring DOM event targeting: a click on a
//! child element reports the child, never its ancestors.

use bitflags::bitflags;

use crate::dom::NodeId;

/// Keys the page model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    /// Shift+Tab as reported by terminals and some platforms.
    BackTab,
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Char(char),
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Press / repeat / release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the modifier set.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is a press or an auto-repeat (not a release).
    #[inline]
    #[must_use]
    pub fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Whether this event is a backwards Tab (`BackTab` or `Shift+Tab`).
    #[inline]
    #[must_use]
    pub fn is_back_tab(&self) -> bool {
        self.code == KeyCode::BackTab
            || (self.code == KeyCode::Tab && self.modifiers.contains(Modifiers::SHIFT))
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    /// A completed primary click (down + up on the same target).
    Click,
}

/// A pointer event targeted at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub target: NodeId,
}

impl MouseEvent {
    /// Create a pointer event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, target: NodeId) -> Self {
        Self { kind, target }
    }

    /// A primary click on `target`.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::new(MouseEventKind::Click, target)
    }

    /// Whether this is a primary click.
    #[inline]
    #[must_use]
    pub fn is_primary_click(&self) -> bool {
        matches!(self.kind, MouseEventKind::Click)
    }
}

/// Input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl Event {
    /// Shorthand for a key press without modifiers.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Shorthand for a primary click on `target`.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self::Mouse(MouseEvent::click(target))
    }
}

impl From<KeyEvent> for Event {
    fn from(value: KeyEvent) -> Self {
        Self::Key(value)
    }
}

impl From<MouseEvent> for Event {
    fn from(value: MouseEvent) -> Self {
        Self::Mouse(value)
    }
}

/// What a listener did with an event.
///
/// `Consumed` stops dispatch to older listeners and suppresses whatever the
/// host would otherwise do by default (e.g. its own Tab navigation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventDisposition {
    #[default]
    Ignored,
    Consumed,
}

impl EventDisposition {
    #[inline]
    #[must_use]
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}
