#![forbid(unsafe_code)]

//! DOM construction for dialogs.
//!
//! Every dialog shares one shell:
//!
//! ```text
//! body
//! └── root        (#modal-N, z-index, data-state)
//!     └── backdrop (#modal-N-backdrop, role=presentation)
//!         └── panel (#modal-N-panel, role=dialog, aria-modal, tabindex=-1)
//! ```
//!
//! The backdrop wraps the panel, so a click inside the panel reports a
//! target *inside* the backdrop's subtree. Backdrop dismissal therefore
//! compares the click target to the backdrop node itself, never uses
//! containment.
//!
//! Variants then fill the panel: the confirmation body (title, message,
//! cancel + confirm actions) or the form header (title, close button) with
//! a content slot.

use modalkit_a11y::{AccessibleLabels, DialogIds, Role, apply_dialog_semantics};
use modalkit_core::{Document, ElementKind, NodeId};

use super::keyboard::{ACTION_ATTR, ModalAction};
use super::sequencer::{TransitionConfig, VisualState};

/// Class names for each dialog part. Callers override them to theme
/// dialogs without touching controller logic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StyleTokens {
    pub root: String,
    pub backdrop: String,
    pub panel: String,
    pub header: String,
    pub title: String,
    pub body: String,
    pub content: String,
    pub actions: String,
    pub confirm_button: String,
    pub cancel_button: String,
    pub close_button: String,
}

impl Default for StyleTokens {
    fn default() -> Self {
        Self {
            root: "modal".into(),
            backdrop: "modal-backdrop".into(),
            panel: "modal-panel".into(),
            header: "modal-header".into(),
            title: "modal-title".into(),
            body: "modal-body".into(),
            content: "modal-content".into(),
            actions: "modal-actions".into(),
            confirm_button: "modal-button modal-button--confirm".into(),
            cancel_button: "modal-button modal-button--cancel".into(),
            close_button: "modal-close".into(),
        }
    }
}

impl StyleTokens {
    #[must_use]
    pub fn backdrop(mut self, class: impl Into<String>) -> Self {
        self.backdrop = class.into();
        self
    }

    #[must_use]
    pub fn panel(mut self, class: impl Into<String>) -> Self {
        self.panel = class.into();
        self
    }

    #[must_use]
    pub fn title(mut self, class: impl Into<String>) -> Self {
        self.title = class.into();
        self
    }

    #[must_use]
    pub fn confirm_button(mut self, class: impl Into<String>) -> Self {
        self.confirm_button = class.into();
        self
    }

    #[must_use]
    pub fn cancel_button(mut self, class: impl Into<String>) -> Self {
        self.cancel_button = class.into();
        self
    }
}

/// Everything the shell needs from the invocation's options.
#[derive(Debug, Clone, Copy)]
pub struct ShellSpec<'a> {
    pub ids: &'a DialogIds,
    pub tokens: &'a StyleTokens,
    pub labels: &'a AccessibleLabels,
    pub role: Role,
    pub z_index: i32,
    pub transition: TransitionConfig,
}

/// The shell nodes of a mounted dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogNodes {
    pub root: NodeId,
    pub backdrop: NodeId,
    pub panel: NodeId,
}

/// Build the shell, append it to body, and leave it in the hidden visual
/// state.
pub fn mount_shell(doc: &mut Document, spec: &ShellSpec<'_>) -> DialogNodes {
    let root = doc.create(ElementKind::Div);
    doc.set_attr(root, "id", spec.ids.root.clone());
    doc.add_class(root, &spec.tokens.root);
    doc.set_style(root, "z-index", spec.z_index.to_string());

    let backdrop = doc.create(ElementKind::Div);
    doc.set_attr(backdrop, "id", spec.ids.backdrop.clone());
    doc.set_attr(backdrop, "role", Role::Presentation.as_str());
    doc.add_class(backdrop, &spec.tokens.backdrop);

    let panel = doc.create(ElementKind::Section);
    doc.add_class(panel, &spec.tokens.panel);
    doc.set_tab_index(panel, Some(-1));
    apply_dialog_semantics(doc, panel, spec.ids, spec.role, spec.labels);

    let body = doc.body();
    doc.append_child(body, root);
    doc.append_child(root, backdrop);
    doc.append_child(backdrop, panel);

    let nodes = DialogNodes {
        root,
        backdrop,
        panel,
    };
    set_visual_state(doc, &nodes, VisualState::Hidden, spec.transition);
    nodes
}

/// Apply a visual state to the shell, with the matching transition
/// duration (enter when becoming visible, exit when hiding).
pub fn set_visual_state(
    doc: &mut Document,
    nodes: &DialogNodes,
    state: VisualState,
    transition: TransitionConfig,
) {
    let duration = match state {
        VisualState::Visible => transition.enter,
        VisualState::Hidden => transition.exit,
    };
    let css = TransitionConfig::css(duration);
    for node in [nodes.root, nodes.backdrop, nodes.panel] {
        state.apply(doc, node);
        doc.set_style(node, "transition-duration", css.clone());
    }
}

/// Remove the shell from the page and free its nodes.
pub fn unmount(doc: &mut Document, nodes: &DialogNodes) {
    let freed = doc.destroy(nodes.root);
    tracing::trace!(freed, "dialog shell destroyed");
}

/// The title heading, bound to the generated title id.
pub fn mount_title(
    doc: &mut Document,
    parent: NodeId,
    ids: &DialogIds,
    tokens: &StyleTokens,
    text: &str,
) -> NodeId {
    let title = doc.create_with_text(ElementKind::Heading, text);
    doc.set_attr(title, "id", ids.title.clone());
    doc.add_class(title, &tokens.title);
    doc.append_child(parent, title);
    title
}

/// An action button wired through [`ACTION_ATTR`].
pub fn mount_action(
    doc: &mut Document,
    parent: NodeId,
    action: ModalAction,
    class: &str,
    label: &str,
) -> NodeId {
    let button = doc.create_with_text(ElementKind::Button, label);
    doc.set_attr(button, ACTION_ATTR, action.as_str());
    doc.add_class(button, class);
    doc.append_child(parent, button);
    button
}

/// Nodes of the confirmation body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmNodes {
    pub title: NodeId,
    pub message: NodeId,
    pub actions: NodeId,
    pub cancel: NodeId,
    pub confirm: NodeId,
}

/// Labels for the confirmation body.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmText<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub confirm: &'a str,
    pub cancel: &'a str,
}

/// Title, message, and the action row (cancel first, then confirm).
pub fn mount_confirm_body(
    doc: &mut Document,
    panel: NodeId,
    ids: &DialogIds,
    tokens: &StyleTokens,
    text: &ConfirmText<'_>,
) -> ConfirmNodes {
    let title = mount_title(doc, panel, ids, tokens, text.title);

    let message = doc.create_with_text(ElementKind::Paragraph, text.message);
    doc.set_attr(message, "id", ids.body.clone());
    doc.add_class(message, &tokens.body);
    doc.append_child(panel, message);

    let actions = doc.create(ElementKind::Div);
    doc.add_class(actions, &tokens.actions);
    doc.append_child(panel, actions);
    let cancel = mount_action(doc, actions, ModalAction::Cancel, &tokens.cancel_button, text.cancel);
    let confirm = mount_action(doc, actions, ModalAction::Confirm, &tokens.confirm_button, text.confirm);

    ConfirmNodes {
        title,
        message,
        actions,
        cancel,
        confirm,
    }
}

/// Nodes of the form frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormNodes {
    pub header: NodeId,
    pub title: NodeId,
    pub close: Option<NodeId>,
    pub content: NodeId,
}

/// Header (title + optional close button) and the content slot the
/// caller's render function fills. The slot carries the body id, so the
/// dialog is described by the caller's content.
pub fn mount_form_frame(
    doc: &mut Document,
    panel: NodeId,
    ids: &DialogIds,
    tokens: &StyleTokens,
    title: &str,
    close_label: Option<&str>,
) -> FormNodes {
    let header = doc.create(ElementKind::Div);
    doc.add_class(header, &tokens.header);
    doc.append_child(panel, header);
    let title = mount_title(doc, header, ids, tokens, title);

    let close = close_label.map(|label| {
        let button = mount_action(doc, header, ModalAction::Close, &tokens.close_button, "×");
        doc.set_attr(button, "aria-label", label);
        button
    });

    let content = doc.create(ElementKind::Div);
    doc.set_attr(content, "id", ids.body.clone());
    doc.add_class(content, &tokens.content);
    doc.append_child(panel, content);

    FormNodes {
        header,
        title,
        close,
        content,
    }
}

/// Render `node`'s subtree as indented text, for logs and test snapshots.
#[must_use]
pub fn outline(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_outline(doc, node, 0, &mut out);
    out
}

fn write_outline(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
    let Some(kind) = doc.kind(node) else {
        return;
    };
    out.push_str(&"  ".repeat(depth));
    out.push_str(kind.tag());
    for attr in ["id", "role", ACTION_ATTR, "data-state"] {
        if let Some(value) = doc.attr(node, attr) {
            out.push_str(&format!(" {attr}={value:?}"));
        }
    }
    let text = doc.text(node);
    if !text.is_empty() {
        out.push_str(&format!(" {text:?}"));
    }
    out.push('\n');
    for &child in doc.children(node) {
        write_outline(doc, child, depth + 1, out);
    }
}
