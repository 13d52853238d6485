#![forbid(unsafe_code)]

//! Confirmation dialog: title, message, Cancel / Confirm. Resolves `true`
//! on confirm and `false` on every other way out.

use std::fmt;

use modalkit_a11y::AccessibleLabels;
use modalkit_core::Page;
use modalkit_i18n::{keys, modal_text};

use super::controller::{
    ContentScope, Hook, InitialFocus, ModalConfig, ModalController, ModalRequest, Phase,
    ReentryPolicy,
};
use super::error::DialogError;
use super::latch::DialogHandle;
use super::render::{ConfirmText, StyleTokens, mount_confirm_body};
use super::sequencer::TransitionConfig;

/// Options for one confirmation.
///
/// Unset texts fall back to the built-in catalog in the current locale,
/// resolved when the dialog opens.
#[derive(Default)]
pub struct ConfirmOptions {
    pub title: Option<String>,
    pub message: Option<String>,
    pub confirm_label: Option<String>,
    pub cancel_label: Option<String>,
    pub config: ModalConfig,
    pub on_confirm: Option<Hook>,
    pub on_cancel: Option<Hook>,
}

impl fmt::Debug for ConfirmOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmOptions")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("confirm_label", &self.confirm_label)
            .field("cancel_label", &self.cancel_label)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConfirmOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    /// Replace all shared modal options at once.
    #[must_use]
    pub fn config(mut self, config: ModalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn style(mut self, style: StyleTokens) -> Self {
        self.config.style = style;
        self
    }

    #[must_use]
    pub fn escape_to_close(mut self, enabled: bool) -> Self {
        self.config.escape_to_close = enabled;
        self
    }

    #[must_use]
    pub fn close_on_backdrop(mut self, enabled: bool) -> Self {
        self.config.close_on_backdrop = enabled;
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.config.z_index = z_index;
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: AccessibleLabels) -> Self {
        self.config.labels = labels;
        self
    }

    #[must_use]
    pub fn initial_focus(mut self, initial_focus: InitialFocus) -> Self {
        self.config.initial_focus = initial_focus;
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.config.transition = transition;
        self
    }

    #[must_use]
    pub fn on_confirm(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.on_confirm = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_cancel(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    fn into_request(self) -> ModalRequest<bool> {
        let text = |value: Option<String>, key: &str| value.unwrap_or_else(|| modal_text(key));
        let title = text(self.title, keys::CONFIRM_TITLE);
        let message = text(self.message, keys::CONFIRM_MESSAGE);
        let confirm = text(self.confirm_label, keys::ACTION_CONFIRM);
        let cancel = text(self.cancel_label, keys::ACTION_CANCEL);

        ModalRequest {
            config: self.config,
            content: Box::new(move |scope: ContentScope<'_, bool>| {
                mount_confirm_body(
                    scope.document,
                    scope.nodes.panel,
                    scope.ids,
                    scope.style,
                    &ConfirmText {
                        title: &title,
                        message: &message,
                        confirm: &confirm,
                        cancel: &cancel,
                    },
                );
            }),
            confirm_value: None,
            on_confirm: self.on_confirm,
            on_cancel: self.on_cancel,
        }
        .confirm_value(|_| Some(true))
    }
}

/// Reusable confirmation dialog bound to a page.
#[derive(Debug)]
pub struct ConfirmDialog {
    controller: ModalController<bool>,
}

impl ConfirmDialog {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            controller: ModalController::new(page),
        }
    }

    #[must_use]
    pub fn with_reentry(self, policy: ReentryPolicy) -> Self {
        Self {
            controller: self.controller.with_reentry(policy),
        }
    }

    /// Show the dialog. The handle resolves `true` if the user confirmed.
    pub fn open(&self, options: ConfirmOptions) -> Result<DialogHandle<bool>, DialogError> {
        self.controller.open(options.into_request())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// The underlying controller, for ids, nodes, and programmatic control.
    #[must_use]
    pub fn controller(&self) -> &ModalController<bool> {
        &self.controller
    }

    pub fn dispose(&self) {
        self.controller.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::keyboard::ModalAction;
    use modalkit_a11y::accessible_name;
    use modalkit_core::{Event, KeyCode};
    use modalkit_i18n::LocaleContext;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn action_node(page: &Page, dialog: &ConfirmDialog, action: ModalAction) -> modalkit_core::NodeId {
        let nodes = dialog.controller().nodes().expect("mounted");
        let doc = page.document().borrow();
        doc.descendants(nodes.panel)
            .into_iter()
            .find(|&n| ModalAction::of(&doc, n) == Some(action))
            .expect("action button")
    }

    #[test]
    fn default_texts_follow_locale() {
        let page = Page::new();
        let dialog = ConfirmDialog::new(&page);
        let _zh = LocaleContext::global().push_override("zh-TW");
        let _handle = dialog.open(ConfirmOptions::new()).expect("opens");
        let panel = dialog.controller().nodes().expect("mounted").panel;
        let doc = page.document().borrow();
        assert_eq!(accessible_name(&doc, panel), "確認");
        let confirm = action_node(&page, &dialog, ModalAction::Confirm);
        assert_eq!(doc.text(confirm), "確定");
    }

    #[test]
    fn confirm_button_resolves_true_and_runs_hook() {
        let page = Page::new();
        let dialog = ConfirmDialog::new(&page);
        let confirmed = Rc::new(Cell::new(0));
        let seen = Rc::clone(&confirmed);
        let mut handle = dialog
            .open(
                ConfirmOptions::new()
                    .title("Delete file")
                    .message("Really?")
                    .on_confirm(move || seen.set(seen.get() + 1)),
            )
            .expect("opens");
        page.tick();
        let confirm = action_node(&page, &dialog, ModalAction::Confirm);
        assert!(page.dispatch(Event::click(confirm)).is_consumed());
        assert_eq!(confirmed.get(), 1);
        page.advance(Duration::from_millis(300));
        assert_eq!(handle.try_outcome(), Some(true));
        assert_eq!(dialog.phase(), Phase::Closed);
    }

    #[test]
    fn enter_confirms_when_focus_is_not_on_a_button() {
        let page = Page::new();
        let dialog = ConfirmDialog::new(&page);
        let mut handle = dialog
            .open(ConfirmOptions::new().initial_focus(InitialFocus::Panel))
            .expect("opens");
        page.tick();
        assert!(page.dispatch(Event::key(KeyCode::Enter)).is_consumed());
        page.advance(Duration::from_millis(300));
        assert_eq!(handle.try_outcome(), Some(true));
    }

    #[test]
    fn escape_disabled_keeps_dialog_open() {
        let page = Page::new();
        let dialog = ConfirmDialog::new(&page);
        let mut handle = dialog
            .open(ConfirmOptions::new().escape_to_close(false))
            .expect("opens");
        page.tick();
        assert!(!page.dispatch(Event::key(KeyCode::Escape)).is_consumed());
        page.advance(Duration::from_secs(1));
        assert_eq!(dialog.phase(), Phase::Visible);
        assert_eq!(handle.try_outcome(), None);
        dialog.dispose();
        assert_eq!(handle.try_outcome(), Some(false));
    }
}
