#![forbid(unsafe_code)]

//! Data-entry dialog.
//!
//! The caller renders the form into a content slot and decides when it is
//! done through a [`FormHandle`]: `on_confirm(payload)` resolves
//! `Some(payload)`; cancel, close, Escape, and backdrop resolve `None`.
//!
//! Enter belongs to the content by default ([`EnterPolicy::ContentOwned`]):
//! it never submits on its own. [`FormOptions::enter_submits`] opts into an
//! Enter shortcut that reads the payload from the document.

use std::fmt;

use modalkit_a11y::{AccessibleLabels, DialogIds};
use modalkit_core::{Document, NodeId, Page};
use modalkit_i18n::{keys, modal_text};

use super::controller::{
    ConfirmValue, ContentScope, ControlHandle, Hook, InitialFocus, ModalConfig, ModalController,
    ModalRequest, Phase, ReentryPolicy,
};
use super::error::DialogError;
use super::keyboard::EnterPolicy;
use super::latch::DialogHandle;
use super::render::{StyleTokens, mount_form_frame};
use super::sequencer::TransitionConfig;

/// What the render function receives.
pub struct FormScope<'a, P: 'static> {
    pub document: &'a mut Document,
    /// The content slot to render into.
    pub container: NodeId,
    pub initial_data: Option<&'a P>,
    pub ids: &'a DialogIds,
    pub handle: FormHandle<P>,
}

/// Renders the form into [`FormScope::container`].
pub type RenderForm<P> = Box<dyn FnOnce(FormScope<'_, P>)>;

/// Content-side control of a form invocation.
pub struct FormHandle<P: 'static> {
    control: ControlHandle<Option<P>>,
}

impl<P: 'static> Clone for FormHandle<P> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
        }
    }
}

impl<P: 'static> fmt::Debug for FormHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FormHandle").field(&self.control).finish()
    }
}

impl<P: 'static> FormHandle<P> {
    /// Submit: the dialog resolves `Some(payload)`.
    pub fn on_confirm(&self, payload: P) {
        self.control.confirm_with(Some(payload));
    }

    pub fn on_cancel(&self) {
        self.control.cancel();
    }

    /// The close button's action.
    pub fn on_close(&self) {
        self.control.close();
    }

    /// Temporarily hide the dialog (e.g. to pick a value from another
    /// surface). The outcome stays pending.
    pub fn on_hide(&self) {
        self.control.hide();
    }

    pub fn on_show(&self) {
        self.control.show();
    }

    /// Keep Enter away from the dialog's shortcut.
    pub fn claim_enter(&self) {
        self.control.claim_enter();
    }

    pub fn release_enter(&self) {
        self.control.release_enter();
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.control.is_live()
    }
}

/// Options for one data-entry invocation.
pub struct FormOptions<P: 'static> {
    /// Defaults to the catalog's form title.
    pub title: Option<String>,
    pub initial_data: Option<P>,
    pub render_form: Option<RenderForm<P>>,
    pub show_close_button: bool,
    /// Accessible label of the close button; defaults to the catalog's.
    pub close_label: Option<String>,
    pub config: ModalConfig,
    pub submit: Option<Box<dyn Fn(&Document) -> Option<P>>>,
    pub on_confirm: Option<Hook>,
    pub on_cancel: Option<Hook>,
}

impl<P: 'static> Default for FormOptions<P> {
    fn default() -> Self {
        Self {
            title: None,
            initial_data: None,
            render_form: None,
            show_close_button: true,
            close_label: None,
            config: ModalConfig::default().enter_policy(EnterPolicy::ContentOwned),
            submit: None,
            on_confirm: None,
            on_cancel: None,
        }
    }
}

impl<P: 'static> fmt::Debug for FormOptions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("title", &self.title)
            .field("initial_data", &self.initial_data.is_some())
            .field("show_close_button", &self.show_close_button)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: 'static> FormOptions<P> {
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
    pub fn initial_data(mut self, data: P) -> Self {
        self.initial_data = Some(data);
        self
    }

    #[must_use]
    pub fn render_form(mut self, render: impl FnOnce(FormScope<'_, P>) + 'static) -> Self {
        self.render_form = Some(Box::new(render));
        self
    }

    #[must_use]
    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = show;
        self
    }

    #[must_use]
    pub fn close_label(mut self, label: impl Into<String>) -> Self {
        self.close_label = Some(label.into());
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

    /// Let Enter submit. `submit` reads the payload from the document;
    /// returning `None` (e.g. invalid input) keeps the dialog open.
    #[must_use]
    pub fn enter_submits(mut self, submit: impl Fn(&Document) -> Option<P> + 'static) -> Self {
        self.config.enter_policy = EnterPolicy::ConfirmShortcut;
        self.submit = Some(Box::new(submit));
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

    fn into_request(self) -> ModalRequest<Option<P>> {
        let Self {
            title,
            initial_data,
            render_form,
            show_close_button,
            close_label,
            config,
            submit,
            on_confirm,
            on_cancel,
        } = self;
        let title = title.unwrap_or_else(|| modal_text(keys::FORM_TITLE));
        let close_label = show_close_button
            .then(|| close_label.unwrap_or_else(|| modal_text(keys::ACTION_CLOSE)));
        let confirm_value = submit.map(|submit| -> ConfirmValue<Option<P>> {
            Box::new(move |doc: &Document| submit(doc).map(Some))
        });

        ModalRequest {
            config,
            content: Box::new(move |scope: ContentScope<'_, Option<P>>| {
                let frame = mount_form_frame(
                    scope.document,
                    scope.nodes.panel,
                    scope.ids,
                    scope.style,
                    &title,
                    close_label.as_deref(),
                );
                if let Some(render) = render_form {
                    render(FormScope {
                        document: scope.document,
                        container: frame.content,
                        initial_data: initial_data.as_ref(),
                        ids: scope.ids,
                        handle: FormHandle {
                            control: scope.handle,
                        },
                    });
                }
            }),
            confirm_value,
            on_confirm,
            on_cancel,
        }
    }
}

/// Reusable data-entry dialog bound to a page.
#[derive(Debug)]
pub struct FormDialog<P: 'static> {
    controller: ModalController<Option<P>>,
}

impl<P: 'static> FormDialog<P> {
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

    /// Show the form. The handle resolves `Some(payload)` on submit and
    /// `None` otherwise.
    pub fn open(&self, options: FormOptions<P>) -> Result<DialogHandle<Option<P>>, DialogError> {
        self.controller.open(options.into_request())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    #[must_use]
    pub fn controller(&self) -> &ModalController<Option<P>> {
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
    use modalkit_core::{ElementKind, Event, InputKind, KeyCode};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Profile {
        name: String,
    }

    type Slot = Rc<RefCell<Option<(NodeId, FormHandle<Profile>)>>>;

    fn name_form(slot: &Slot) -> FormOptions<Profile> {
        let slot = Rc::clone(slot);
        FormOptions::new()
            .title("Rename")
            .initial_data(Profile { name: "A".into() })
            .render_form(move |scope: FormScope<'_, Profile>| {
                let input = scope.document.create(ElementKind::Input(InputKind::Text));
                let name = scope.initial_data.map(|p| p.name.clone()).unwrap_or_default();
                scope.document.set_attr(input, "value", name);
                scope.document.append_child(scope.container, input);
                scope.document.focus(input);
                *slot.borrow_mut() = Some((input, scope.handle));
            })
    }

    fn input_value(page: &Page, input: NodeId) -> String {
        page.document()
            .borrow()
            .attr(input, "value")
            .unwrap_or_default()
            .to_owned()
    }

    #[test]
    fn submit_resolves_payload() {
        let page = Page::new();
        let dialog = FormDialog::new(&page);
        let slot: Slot = Rc::default();
        let mut outcome = dialog.open(name_form(&slot)).expect("opens");
        page.tick();

        let (input, handle) = slot.borrow_mut().take().expect("rendered");
        assert_eq!(input_value(&page, input), "A");
        assert_eq!(page.document().borrow().active_element(), Some(input));

        handle.on_confirm(Profile { name: "B".into() });
        assert!(!handle.is_live());
        page.advance(Duration::from_millis(300));
        assert_eq!(outcome.try_outcome(), Some(Some(Profile { name: "B".into() })));
    }

    #[test]
    fn enter_never_submits_by_default() {
        let page = Page::new();
        let dialog = FormDialog::new(&page);
        let slot: Slot = Rc::default();
        let mut outcome = dialog.open(name_form(&slot)).expect("opens");
        page.tick();
        assert!(!page.dispatch(Event::key(KeyCode::Enter)).is_consumed());
        page.advance(Duration::from_secs(1));
        assert_eq!(dialog.phase(), Phase::Visible);
        assert_eq!(outcome.try_outcome(), None);
    }

    #[test]
    fn enter_submits_reads_document() {
        let page = Page::new();
        let dialog = FormDialog::new(&page);
        let slot: Slot = Rc::default();
        let input_id = Rc::new(RefCell::new(None::<NodeId>));
        let seen = Rc::clone(&input_id);
        let options = name_form(&slot).enter_submits(move |doc: &Document| {
            let input = (*seen.borrow())?;
            let name = doc.attr(input, "value")?;
            (!name.is_empty()).then(|| Profile { name: name.to_owned() })
        });
        let mut outcome = dialog.open(options).expect("opens");
        page.tick();
        let (input, _handle) = slot.borrow_mut().take().expect("rendered");
        *input_id.borrow_mut() = Some(input);

        page.document().borrow_mut().set_attr(input, "value", "");
        assert!(page.dispatch(Event::key(KeyCode::Enter)).is_consumed());
        assert_eq!(dialog.phase(), Phase::Visible);

        page.document().borrow_mut().set_attr(input, "value", "Carol");
        page.dispatch(Event::key(KeyCode::Enter));
        page.advance(Duration::from_millis(300));
        assert_eq!(outcome.try_outcome(), Some(Some(Profile { name: "Carol".into() })));
    }

    #[test]
    fn close_button_resolves_none() {
        let page = Page::new();
        let dialog = FormDialog::<Profile>::new(&page);
        let _en = modalkit_i18n::LocaleContext::global().push_override("en");
        let mut outcome = dialog.open(FormOptions::new()).expect("opens");
        page.tick();
        let panel = dialog.controller().nodes().expect("mounted").panel;
        let close = {
            let doc = page.document().borrow();
            doc.descendants(panel)
                .into_iter()
                .find(|&n| ModalAction::of(&doc, n) == Some(ModalAction::Close))
                .expect("close button")
        };
        assert_eq!(page.document().borrow().attr(close, "aria-label"), Some("Close"));
        page.dispatch(Event::click(close));
        page.advance(Duration::from_millis(300));
        assert_eq!(outcome.try_outcome(), Some(None));
    }

    #[test]
    fn no_close_button_when_disabled() {
        let page = Page::new();
        let dialog = FormDialog::<Profile>::new(&page);
        let _outcome = dialog
            .open(FormOptions::new().show_close_button(false))
            .expect("opens");
        let panel = dialog.controller().nodes().expect("mounted").panel;
        let doc = page.document().borrow();
        assert!(
            doc.descendants(panel)
                .into_iter()
                .all(|n| ModalAction::of(&doc, n).is_none())
        );
    }

    #[traced_test]
    #[test]
    fn handle_after_close_is_stale() {
        let page = Page::new();
        let dialog = FormDialog::new(&page);
        let slot: Slot = Rc::default();
        let mut first = dialog.open(name_form(&slot)).expect("opens");
        page.tick();
        let (_, handle) = slot.borrow_mut().take().expect("rendered");
        handle.on_cancel();
        page.advance(Duration::from_millis(300));
        assert_eq!(first.try_outcome(), Some(None));

        let _second = dialog.open(name_form(&slot)).expect("reopens");
        page.tick();
        handle.on_confirm(Profile { name: "late".into() });
        assert_eq!(dialog.phase(), Phase::Visible);
        assert!(logs_contain("stale dialog handle ignored"));
    }
}
