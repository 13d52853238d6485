#![forbid(unsafe_code)]

//! Focus trap queries over a dialog panel's subtree.
//!
//! Pure functions over a [`Document`]; nothing here mutates focus except
//! [`FocusSnapshot::restore`].
//!
//! # Invariants
//!
//! - [`candidates`] returns nodes in document order, all inside the panel.
//! - [`next_target`] only ever returns a candidate, so moving focus to its
//!   result keeps focus inside the panel.
//! - An empty candidate set yields `None`; callers degrade gracefully.

use modalkit_core::{Document, DocumentId, ElementKind, InputKind, NodeFlags, NodeId};

/// Whether Tab navigation may land on `node`.
///
/// Requires the node to be rendered, enabled, not masked from assistive
/// technology, not removed from the tab order (`tab_index < 0`), and either
/// of an interactive kind or explicitly tabbable.
#[must_use]
pub fn is_tab_candidate(doc: &Document, node: NodeId) -> bool {
    let Some(kind) = doc.kind(node) else {
        return false;
    };
    if !doc.is_rendered(node)
        || doc.has_flags(node, NodeFlags::DISABLED)
        || doc.has_flags_in_ancestry(node, NodeFlags::ARIA_HIDDEN | NodeFlags::INERT)
    {
        return false;
    }
    match doc.tab_index(node) {
        Some(index) if index < 0 => return false,
        Some(_) => return doc.is_focusable(node),
        None => {}
    }
    let interactive = match kind {
        ElementKind::Button
        | ElementKind::Select
        | ElementKind::TextArea
        | ElementKind::Summary => true,
        ElementKind::Input(input) => input != InputKind::Hidden,
        ElementKind::Anchor => doc.attr(node, "href").is_some(),
        _ => doc.has_flags(node, NodeFlags::CONTENT_EDITABLE),
    };
    interactive && doc.is_focusable(node)
}

/// Tab candidates inside `panel`, in document order.
#[must_use]
pub fn candidates(doc: &Document, panel: NodeId) -> Vec<NodeId> {
    doc.descendants(panel)
        .into_iter()
        .filter(|&node| is_tab_candidate(doc, node))
        .collect()
}

/// Where Tab (or Shift+Tab when `backwards`) should move focus.
///
/// - Focus on a candidate: the next (previous) candidate, wrapping.
/// - Focus inside the panel on a non-candidate: the first candidate after
///   (before) it in document order, wrapping.
/// - Focus outside the panel, or on the panel itself: the first (last)
///   candidate.
#[must_use]
pub fn next_target(doc: &Document, panel: NodeId, backwards: bool) -> Option<NodeId> {
    let list = candidates(doc, panel);
    let (first, last) = (*list.first()?, *list.last()?);
    let edge = if backwards { last } else { first };

    let Some(active) = doc.active_element() else {
        return Some(edge);
    };
    if active == panel || !doc.contains(panel, active) {
        return Some(edge);
    }

    if let Some(i) = list.iter().position(|&c| c == active) {
        let n = list.len();
        let j = if backwards { (i + n - 1) % n } else { (i + 1) % n };
        return Some(list[j]);
    }

    // Non-candidate inside the panel: locate it in document order.
    let order = doc.descendants(panel);
    let rank = |node: NodeId| order.iter().position(|&o| o == node);
    let here = rank(active)?;
    let found = if backwards {
        list.iter().rev().find(|&&c| rank(c).is_some_and(|r| r < here))
    } else {
        list.iter().find(|&&c| rank(c).is_some_and(|r| r > here))
    };
    Some(found.copied().unwrap_or(edge))
}

/// What [`FocusSnapshot::restore`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The captured element regained focus.
    Restored(NodeId),
    /// The captured element is gone or unfocusable; focus moved to body.
    FellBack,
    /// Nothing was focused at capture time (or the snapshot belongs to
    /// another document); focus is left on body.
    Skipped,
}

/// The element focused immediately before a dialog opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSnapshot {
    document: DocumentId,
    target: Option<NodeId>,
}

impl FocusSnapshot {
    /// Record the current active element.
    #[must_use]
    pub fn capture(doc: &Document) -> Self {
        Self {
            document: doc.id(),
            target: doc.active_element(),
        }
    }

    /// The captured element (`None` = body).
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Return focus to the captured element, falling back to body.
    ///
    /// Consumes the snapshot: a snapshot restores at most once.
    pub fn restore(self, doc: &mut Document) -> RestoreOutcome {
        if self.document != doc.id() {
            return RestoreOutcome::Skipped;
        }
        match self.target {
            None => {
                doc.blur();
                RestoreOutcome::Skipped
            }
            Some(node) if doc.focus(node) => RestoreOutcome::Restored(node),
            Some(node) => {
                tracing::debug!(node = node.index(), "focus restore target gone, falling back to body");
                doc.blur();
                RestoreOutcome::FellBack
            }
        }
    }
}
