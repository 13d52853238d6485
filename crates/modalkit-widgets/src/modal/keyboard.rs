#![forbid(unsafe_code)]

//! Keyboard routing for a visible dialog.
//!
//! [`KeyboardRouter::route`] maps a key press to a [`KeyAction`]. It reads
//! the document but never mutates it; the controller applies the action.
//!
//! | Key | Action |
//! |-----|--------|
//! | Escape | `Cancel` when `escape_to_close`, else `Ignore` |
//! | Tab / Shift+Tab | `MoveFocus(next)`; `Suppress` when nothing is tabbable |
//! | Enter / Space on a dialog action button | `Activate(action)` |
//! | Enter | see [`EnterPolicy`] |

use modalkit_core::{Document, ElementKind, KeyCode, KeyEvent, NodeFlags, NodeId};

use super::focus_trap;

/// Attribute marking the dialog's own action buttons.
pub const ACTION_ATTR: &str = "data-modal-action";

/// Built-in dialog actions, bound to buttons through [`ACTION_ATTR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalAction {
    Confirm,
    Cancel,
    Close,
}

impl ModalAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Close => "close",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirm" => Some(Self::Confirm),
            "cancel" => Some(Self::Cancel),
            "close" => Some(Self::Close),
            _ => None,
        }
    }

    /// The action bound to `node` itself, if any.
    #[must_use]
    pub fn of(doc: &Document, node: NodeId) -> Option<Self> {
        doc.attr(node, ACTION_ATTR).and_then(Self::parse)
    }

    /// The action bound to `target` or its nearest ancestor inside `panel`.
    #[must_use]
    pub fn at(doc: &Document, panel: NodeId, target: NodeId) -> Option<Self> {
        if !doc.contains(panel, target) {
            return None;
        }
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if let Some(action) = Self::of(doc, node) {
                return (!doc.has_flags(node, NodeFlags::DISABLED)).then_some(action);
            }
            if node == panel {
                break;
            }
            cursor = doc.parent(node);
        }
        None
    }
}

/// Who owns the Enter key inside a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnterPolicy {
    /// Enter confirms, unless focus is on a control that handles Enter itself
    /// or content has claimed the key.
    #[default]
    ConfirmShortcut,
    /// Enter is left to the content; it never confirms by itself.
    ContentOwned,
}

/// What the controller should do with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Not a dialog key.
    Ignore,
    /// Swallow the key without moving focus.
    Suppress,
    /// Move focus to this node and swallow the key.
    MoveFocus(NodeId),
    Cancel,
    Confirm,
    /// Enter/Space on one of the dialog's own action buttons.
    Activate(ModalAction),
    /// Leave the key to the focused element.
    PassThrough,
}

impl KeyAction {
    /// Whether the key must not reach the host's default handling.
    #[must_use]
    pub fn consumes(self) -> bool {
        !matches!(self, Self::Ignore | Self::PassThrough)
    }
}

/// Key routing configuration for one dialog invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardRouter {
    pub escape_to_close: bool,
    pub enter_policy: EnterPolicy,
}

impl Default for KeyboardRouter {
    fn default() -> Self {
        Self {
            escape_to_close: true,
            enter_policy: EnterPolicy::ConfirmShortcut,
        }
    }
}

impl KeyboardRouter {
    /// Route `key` for a dialog whose panel is `panel`.
    ///
    /// `enter_claimed` is set when content has taken ownership of Enter.
    #[must_use]
    pub fn route(
        &self,
        doc: &Document,
        panel: NodeId,
        key: &KeyEvent,
        enter_claimed: bool,
    ) -> KeyAction {
        if !key.is_press() {
            return KeyAction::Ignore;
        }
        match key.code {
            KeyCode::Escape if self.escape_to_close => KeyAction::Cancel,
            KeyCode::Escape => KeyAction::Ignore,
            KeyCode::Tab | KeyCode::BackTab => {
                match focus_trap::next_target(doc, panel, key.is_back_tab()) {
                    Some(target) => KeyAction::MoveFocus(target),
                    None => KeyAction::Suppress,
                }
            }
            KeyCode::Enter => self.route_enter(doc, panel, enter_claimed),
            KeyCode::Char(' ') => match own_action(doc, panel) {
                Some(action) => KeyAction::Activate(action),
                None => KeyAction::Ignore,
            },
            _ => KeyAction::Ignore,
        }
    }

    fn route_enter(&self, doc: &Document, panel: NodeId, enter_claimed: bool) -> KeyAction {
        if let Some(action) = own_action(doc, panel) {
            return KeyAction::Activate(action);
        }
        if self.enter_policy == EnterPolicy::ContentOwned || enter_claimed {
            return KeyAction::PassThrough;
        }
        match doc.active_element() {
            Some(active) if handles_enter(doc, active) => KeyAction::PassThrough,
            _ => KeyAction::Confirm,
        }
    }
}

fn own_action(doc: &Document, panel: NodeId) -> Option<ModalAction> {
    let active = doc.active_element()?;
    doc.contains(panel, active)
        .then(|| ModalAction::of(doc, active))
        .flatten()
}

/// Controls with their own Enter behavior.
fn handles_enter(doc: &Document, node: NodeId) -> bool {
    doc.kind(node).is_some_and(|kind| {
        kind.is_activatable() || kind == ElementKind::TextArea
    }) || doc.has_flags_in_ancestry(node, NodeFlags::CONTENT_EDITABLE | NodeFlags::OWNS_ENTER)
}
