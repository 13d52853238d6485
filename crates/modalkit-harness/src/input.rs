#![forbid(unsafe_code)]

//! Input and clock helpers.

use modalkit_core::{
    Event, EventDisposition, KeyCode, KeyEvent, Modifiers, NodeId, Page,
};
use modalkit_widgets::modal::ModalAction;

/// Press a key with no modifiers.
pub fn press(page: &Page, code: KeyCode) -> EventDisposition {
    page.dispatch(KeyEvent::new(code))
}

pub fn tab(page: &Page) -> EventDisposition {
    press(page, KeyCode::Tab)
}

/// Shift+Tab.
pub fn back_tab(page: &Page) -> EventDisposition {
    page.dispatch(KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT))
}

pub fn escape(page: &Page) -> EventDisposition {
    press(page, KeyCode::Escape)
}

pub fn enter(page: &Page) -> EventDisposition {
    press(page, KeyCode::Enter)
}

/// Primary click on `target`.
pub fn click(page: &Page, target: NodeId) -> EventDisposition {
    page.dispatch(Event::click(target))
}

/// Run the deferred Opening → Visible flip.
pub fn show(page: &Page) -> usize {
    page.tick()
}

/// Run every pending task, advancing the clock through all timers.
pub fn settle(page: &Page) -> usize {
    page.scheduler().run_until_idle()
}

/// The focused element (`None` = body).
#[must_use]
pub fn active(page: &Page) -> Option<NodeId> {
    page.document().borrow().active_element()
}

/// The dialog's own action button of kind `action` under `root`.
#[must_use]
pub fn action_button(page: &Page, root: NodeId, action: ModalAction) -> Option<NodeId> {
    let doc = page.document().borrow();
    doc.descendants(root)
        .into_iter()
        .find(|&n| ModalAction::of(&doc, n) == Some(action))
}

/// First node under `root` whose own text equals `text`.
#[must_use]
pub fn find_by_text(page: &Page, root: NodeId, text: &str) -> Option<NodeId> {
    let doc = page.document().borrow();
    doc.descendants(root)
        .into_iter()
        .find(|&n| doc.text(n) == text)
}
