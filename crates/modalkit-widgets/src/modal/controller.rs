#![forbid(unsafe_code)]

//! Dialog lifecycle controller.
//!
//! [`ModalController`] owns one dialog invocation at a time and drives it
//! through its phases:
//!
//! ```text
//! Closed ─open─▶ Opening ─next tick─▶ Visible ─decide─▶ Closing ─exit delay─▶ Closed
//! ```
//!
//! # Invariants
//!
//! 1. Phases advance strictly in the order above; none is skipped. A
//!    decision made while Opening is latched and the dialog closes right
//!    after it becomes Visible.
//! 2. The outcome is decided at most once (first decision wins) and
//!    delivered exactly once, when Closed is reached.
//! 3. The page effects ([`ResourceGuard`]) are acquired on entering Opening
//!    and released exactly once on reaching Closed, whichever path got
//!    there: a decision, [`ModalController::dispose`], dropping the
//!    controller, or a panic unwinding through a transition.
//! 4. Input listeners exist only while Visible and not suspended; they are
//!    removed before Closed.
//! 5. Reaching Closed runs, in order: unmount (the shell's nodes are freed,
//!    so ids into it go stale), release page effects, restore focus,
//!    deliver the outcome.
//!
//! # Re-entrancy
//!
//! All state sits behind one `RefCell`. Content callbacks that act on the
//! dialog while the controller is mid-transition (e.g. calling
//! [`ControlHandle::confirm_with`] from inside a render function) are
//! deferred to the next scheduler tick rather than failing. Caller hooks
//! (`on_confirm` / `on_cancel`) run after the controller's state is
//! consistent and no borrow is held, so a panicking hook cannot wedge the
//! lifecycle.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use modalkit_a11y::{AccessibleLabels, DialogIds, Role};
use modalkit_core::{
    Document, Event, EventDisposition, MouseEvent, NodeFlags, Page, Scheduler, Subscription,
};

use super::error::DialogError;
use super::focus_trap::{self, FocusSnapshot};
use super::guard::ResourceGuard;
use super::keyboard::{EnterPolicy, KeyAction, KeyboardRouter, ModalAction};
use super::latch::{DialogHandle, DialogOutcome, OutcomeLatch};
use super::render::{self, DialogNodes, ShellSpec, StyleTokens};
use super::sequencer::{TransitionConfig, VisibilitySequencer, VisualState};

/// Default stacking order of the dialog root.
pub const DEFAULT_Z_INDEX: i32 = 1000;

/// Lifecycle phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Visible,
    Closing,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Visible => "visible",
            Self::Closing => "closing",
        }
    }

    /// Whether an invocation is in flight.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `open` does while an invocation is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReentryPolicy {
    /// Fail with [`DialogError::AlreadyOpen`].
    #[default]
    Reject,
    /// Queue the request; it opens once the live invocation reaches Closed.
    Queue,
}

/// Where focus lands when the dialog becomes visible.
///
/// Content that already moved focus into the panel keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InitialFocus {
    /// First Tab candidate; the panel itself when there is none.
    #[default]
    FirstCandidate,
    /// The confirm action, falling back to the first candidate.
    Confirm,
    /// The panel (`tabindex=-1`).
    Panel,
}

/// Options shared by every dialog variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    /// Escape cancels the dialog.
    pub escape_to_close: bool,
    /// A click whose target is the backdrop itself cancels the dialog.
    pub close_on_backdrop: bool,
    pub z_index: i32,
    pub style: StyleTokens,
    pub labels: AccessibleLabels,
    pub role: Role,
    pub initial_focus: InitialFocus,
    pub enter_policy: EnterPolicy,
    pub transition: TransitionConfig,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            escape_to_close: true,
            close_on_backdrop: true,
            z_index: DEFAULT_Z_INDEX,
            style: StyleTokens::default(),
            labels: AccessibleLabels::default(),
            role: Role::Dialog,
            initial_focus: InitialFocus::default(),
            enter_policy: EnterPolicy::default(),
            transition: TransitionConfig::default(),
        }
    }
}

impl ModalConfig {
    #[must_use]
    pub fn escape_to_close(mut self, enabled: bool) -> Self {
        self.escape_to_close = enabled;
        self
    }

    #[must_use]
    pub fn close_on_backdrop(mut self, enabled: bool) -> Self {
        self.close_on_backdrop = enabled;
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn style(mut self, style: StyleTokens) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: AccessibleLabels) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn initial_focus(mut self, initial_focus: InitialFocus) -> Self {
        self.initial_focus = initial_focus;
        self
    }

    #[must_use]
    pub fn enter_policy(mut self, enter_policy: EnterPolicy) -> Self {
        self.enter_policy = enter_policy;
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    /// The key router these options describe.
    #[must_use]
    pub fn router(&self) -> KeyboardRouter {
        KeyboardRouter {
            escape_to_close: self.escape_to_close,
            enter_policy: self.enter_policy,
        }
    }
}

/// A caller callback run after a decision.
pub type Hook = Box<dyn FnOnce()>;

/// Produces the confirm outcome from the current document.
pub type ConfirmValue<O> = Box<dyn Fn(&Document) -> Option<O>>;

/// What a content function receives while the dialog mounts.
pub struct ContentScope<'a, O: DialogOutcome> {
    pub document: &'a mut Document,
    pub nodes: DialogNodes,
    pub ids: &'a DialogIds,
    pub style: &'a StyleTokens,
    pub handle: ControlHandle<O>,
}

/// One `open` call: options snapshot plus the content that fills the panel.
pub struct ModalRequest<O: DialogOutcome> {
    pub config: ModalConfig,
    pub content: Box<dyn FnOnce(ContentScope<'_, O>)>,
    /// Outcome produced by confirm actions that carry no value of their own
    /// (the confirm button, the Enter shortcut). Returning `None` leaves the
    /// dialog open; without a producer such actions are ignored.
    pub confirm_value: Option<ConfirmValue<O>>,
    pub on_confirm: Option<Hook>,
    pub on_cancel: Option<Hook>,
}

impl<O: DialogOutcome> fmt::Debug for ModalRequest<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRequest")
            .field("config", &self.config)
            .field("confirm_value", &self.confirm_value.is_some())
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl<O: DialogOutcome> ModalRequest<O> {
    pub fn new(config: ModalConfig, content: impl FnOnce(ContentScope<'_, O>) + 'static) -> Self {
        Self {
            config,
            content: Box::new(content),
            confirm_value: None,
            on_confirm: None,
            on_cancel: None,
        }
    }

    #[must_use]
    pub fn confirm_value(mut self, value: impl Fn(&Document) -> Option<O> + 'static) -> Self {
        self.confirm_value = Some(Box::new(value));
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Confirm,
    Cancel,
    Close,
}

enum Action<O> {
    Decide(Decision, Option<O>),
    Hide,
    Show,
    ClaimEnter(bool),
}

#[derive(Debug, Clone, Copy)]
enum Step {
    EnterVisible,
    Finish,
}

/// Lock-free view of the controller for handles and queries.
#[derive(Debug, Clone, Copy, Default)]
struct Status {
    phase: Phase,
    generation: u64,
    decided: bool,
}

struct Invocation<O: DialogOutcome> {
    generation: u64,
    ids: DialogIds,
    config: ModalConfig,
    nodes: DialogNodes,
    latch: OutcomeLatch<O>,
    guard: ResourceGuard,
    focus: Option<FocusSnapshot>,
    subscription: Option<Subscription>,
    sequencer: VisibilitySequencer,
    suspended: bool,
    enter_claimed: bool,
    close_when_visible: bool,
    confirm_value: Option<ConfirmValue<O>>,
    on_confirm: Option<Hook>,
    on_cancel: Option<Hook>,
}

struct Queued<O: DialogOutcome> {
    request: ModalRequest<O>,
    latch: OutcomeLatch<O>,
}

struct Inner<O: DialogOutcome> {
    page: Page,
    status: Rc<Cell<Status>>,
    policy: ReentryPolicy,
    current: Option<Invocation<O>>,
    queue: VecDeque<Queued<O>>,
    disposed: bool,
    this: Weak<RefCell<Inner<O>>>,
}

enum Drive<R> {
    Done(R),
    Busy,
    Gone,
}

/// Tears down the live invocation if a panic unwinds through a transition.
struct Rollback<O: DialogOutcome> {
    inner: Weak<RefCell<Inner<O>>>,
    armed: bool,
}

impl<O: DialogOutcome> Rollback<O> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<O: DialogOutcome> Drop for Rollback<O> {
    fn drop(&mut self) {
        if !self.armed || !std::thread::panicking() {
            return;
        }
        if let Some(rc) = self.inner.upgrade()
            && let Ok(mut inner) = rc.try_borrow_mut()
        {
            inner.abort();
        }
    }
}

/// Run `f` with the controller state and the document both borrowed.
fn drive<O: DialogOutcome, R>(
    weak: &Weak<RefCell<Inner<O>>>,
    f: impl FnOnce(&mut Inner<O>, &mut Document) -> R,
) -> Drive<R> {
    let Some(rc) = weak.upgrade() else {
        return Drive::Gone;
    };
    let rollback = Rollback {
        inner: weak.clone(),
        armed: true,
    };
    let result = {
        let Ok(mut inner) = rc.try_borrow_mut() else {
            rollback.disarm();
            return Drive::Busy;
        };
        let document = inner.page.document().clone();
        let Ok(mut doc) = document.try_borrow_mut() else {
            drop(inner);
            rollback.disarm();
            return Drive::Busy;
        };
        f(&mut inner, &mut doc)
    };
    rollback.disarm();
    Drive::Done(result)
}

fn run_step<O: DialogOutcome>(
    weak: Weak<RefCell<Inner<O>>>,
    scheduler: Scheduler,
    generation: u64,
    step: Step,
) {
    let outcome = drive(&weak, |inner, doc| match step {
        Step::EnterVisible => inner.enter_visible(generation, doc),
        Step::Finish => inner.finish(generation, doc),
    });
    if let Drive::Busy = outcome {
        tracing::trace!(?step, "controller busy, retrying step next tick");
        let again = scheduler.clone();
        scheduler.defer(move || run_step(weak, again, generation, step));
    }
}

impl<O: DialogOutcome> Inner<O> {
    fn phase(&self) -> Phase {
        self.status.get().phase
    }

    fn set_phase(&mut self, phase: Phase) {
        let mut status = self.status.get();
        let from = status.phase;
        status.phase = phase;
        self.status.set(status);
        tracing::debug!(generation = status.generation, %from, to = %phase, "dialog phase transition");
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|inv| inv.generation == generation)
    }

    fn control_handle(&self, generation: u64) -> ControlHandle<O> {
        ControlHandle {
            inner: self.this.clone(),
            status: Rc::clone(&self.status),
            scheduler: self.page.scheduler().clone(),
            generation,
        }
    }

    fn step(&self, generation: u64, step: Step) -> impl FnOnce() + use<O> {
        let weak = self.this.clone();
        let scheduler = self.page.scheduler().clone();
        move || run_step(weak, scheduler, generation, step)
    }

    fn listener(&self, generation: u64) -> impl Fn(&Event) -> EventDisposition + use<O> {
        let weak = self.this.clone();
        move |event: &Event| {
            match drive(&weak, |inner, doc| inner.handle_event(generation, event, doc)) {
                Drive::Done((disposition, hook)) => {
                    if let Some(hook) = hook {
                        hook();
                    }
                    disposition
                }
                Drive::Busy | Drive::Gone => EventDisposition::Ignored,
            }
        }
    }

    fn open(
        &mut self,
        request: ModalRequest<O>,
        doc: &mut Document,
    ) -> Result<DialogHandle<O>, DialogError> {
        if self.disposed {
            tracing::warn!("open on a disposed dialog controller");
            return Err(DialogError::Disposed);
        }
        let phase = self.phase();
        if phase.is_live() {
            return match self.policy {
                ReentryPolicy::Reject => {
                    tracing::warn!(%phase, "re-entrant open rejected");
                    Err(DialogError::AlreadyOpen { phase })
                }
                ReentryPolicy::Queue => {
                    let (latch, handle) = OutcomeLatch::new();
                    self.queue.push_back(Queued { request, latch });
                    tracing::debug!(%phase, queued = self.queue.len(), "open queued behind live dialog");
                    Ok(handle)
                }
            };
        }
        let (latch, handle) = OutcomeLatch::new();
        self.start(request, latch, doc);
        Ok(handle)
    }

    fn start(&mut self, request: ModalRequest<O>, latch: OutcomeLatch<O>, doc: &mut Document) {
        let mut status = self.status.get();
        status.generation += 1;
        status.decided = false;
        self.status.set(status);
        let generation = status.generation;

        let ModalRequest {
            config,
            content,
            confirm_value,
            on_confirm,
            on_cancel,
        } = request;

        let focus = FocusSnapshot::capture(doc);
        let ids = DialogIds::generate();
        let nodes = render::mount_shell(
            doc,
            &ShellSpec {
                ids: &ids,
                tokens: &config.style,
                labels: &config.labels,
                role: config.role,
                z_index: config.z_index,
                transition: config.transition,
            },
        );
        let guard = ResourceGuard::acquire_in(self.page.document(), doc, nodes.root);
        let sequencer = VisibilitySequencer::new(self.page.scheduler().clone(), config.transition);
        tracing::debug!(generation, id = %ids.root, "dialog mounted");

        self.current = Some(Invocation {
            generation,
            ids,
            config,
            nodes,
            latch,
            guard,
            focus: Some(focus),
            subscription: None,
            sequencer,
            suspended: false,
            enter_claimed: false,
            close_when_visible: false,
            confirm_value,
            on_confirm,
            on_cancel,
        });
        self.set_phase(Phase::Opening);

        let handle = self.control_handle(generation);
        if let Some(inv) = self.current.as_ref() {
            content(ContentScope {
                document: &mut *doc,
                nodes,
                ids: &inv.ids,
                style: &inv.config.style,
                handle,
            });
        }

        let flip = self.step(generation, Step::EnterVisible);
        if let Some(inv) = self.current.as_mut() {
            inv.sequencer.begin_enter(flip);
        }
    }

    fn enter_visible(&mut self, generation: u64, doc: &mut Document) {
        if !self.is_current(generation) || self.phase() != Phase::Opening {
            return;
        }
        self.set_phase(Phase::Visible);
        let handler = self.listener(generation);
        let Some(inv) = self.current.as_mut() else {
            return;
        };
        let state = inv.sequencer.complete_enter();
        render::set_visual_state(doc, &inv.nodes, state, inv.config.transition);

        if inv.close_when_visible {
            tracing::debug!(generation, "decision made while opening, closing now");
            self.begin_close(doc);
            return;
        }
        if !inv.suspended {
            inv.guard.refresh_in(doc);
            inv.subscription = Some(self.page.events().subscribe(handler));
            apply_initial_focus(doc, inv);
        }
    }

    fn begin_close(&mut self, doc: &mut Document) {
        let Some(generation) = self.current.as_ref().map(|inv| inv.generation) else {
            return;
        };
        self.set_phase(Phase::Closing);
        let unmount = self.step(generation, Step::Finish);
        let Some(inv) = self.current.as_mut() else {
            return;
        };
        inv.subscription = None;
        render::set_visual_state(doc, &inv.nodes, VisualState::Hidden, inv.config.transition);
        inv.sequencer.begin_exit(unmount);
    }

    fn finish(&mut self, generation: u64, doc: &mut Document) {
        if !self.is_current(generation) || self.phase() != Phase::Closing {
            return;
        }
        let Some(mut inv) = self.current.take() else {
            return;
        };
        inv.sequencer.complete_exit();
        self.set_phase(Phase::Closed);
        teardown(inv, doc);
        self.start_next(doc);
    }

    fn start_next(&mut self, doc: &mut Document) {
        while let Some(Queued { request, latch }) = self.queue.pop_front() {
            if latch.is_abandoned() {
                tracing::debug!("skipping queued dialog whose handle was dropped");
                continue;
            }
            self.start(request, latch, doc);
            return;
        }
    }

    fn apply(&mut self, generation: u64, action: Action<O>, doc: &mut Document) -> Option<Hook> {
        if !self.is_current(generation) {
            tracing::warn!(generation, "stale dialog handle ignored");
            return None;
        }
        match action {
            Action::Decide(decision, value) => self.decide(decision, value, doc),
            Action::Hide => {
                self.suspend(doc);
                None
            }
            Action::Show => {
                self.resume(doc);
                None
            }
            Action::ClaimEnter(claimed) => {
                if let Some(inv) = self.current.as_mut() {
                    inv.enter_claimed = claimed;
                }
                None
            }
        }
    }

    fn decide(&mut self, decision: Decision, value: Option<O>, doc: &mut Document) -> Option<Hook> {
        let phase = self.phase();
        if !matches!(phase, Phase::Opening | Phase::Visible) {
            tracing::debug!(%phase, ?decision, "decision ignored outside opening/visible");
            return None;
        }
        let inv = self.current.as_mut()?;
        if !inv.latch.is_pending() {
            tracing::debug!(?decision, "decision ignored, outcome already decided");
            return None;
        }
        let outcome = match (decision, value) {
            (_, Some(value)) => value,
            (Decision::Confirm, None) => {
                match inv.confirm_value.as_ref().and_then(|produce| produce(doc)) {
                    Some(value) => value,
                    None => {
                        tracing::debug!("confirm without a value ignored");
                        return None;
                    }
                }
            }
            (Decision::Cancel | Decision::Close, None) => O::cancelled(),
        };
        inv.latch.decide(outcome);
        let hook = match decision {
            Decision::Confirm => inv.on_confirm.take(),
            Decision::Cancel | Decision::Close => inv.on_cancel.take(),
        };

        let mut status = self.status.get();
        status.decided = true;
        self.status.set(status);
        tracing::debug!(generation = status.generation, %phase, ?decision, "dialog decided");

        match phase {
            Phase::Opening => {
                if let Some(inv) = self.current.as_mut() {
                    inv.close_when_visible = true;
                }
            }
            _ => self.begin_close(doc),
        }
        hook
    }

    fn suspend(&mut self, doc: &mut Document) {
        let phase = self.phase();
        if !matches!(phase, Phase::Opening | Phase::Visible) {
            tracing::debug!(%phase, "hide ignored");
            return;
        }
        let Some(inv) = self.current.as_mut() else {
            return;
        };
        if inv.suspended {
            return;
        }
        inv.suspended = true;
        inv.subscription = None;
        doc.set_flags(inv.nodes.root, NodeFlags::HIDDEN, true);
        tracing::debug!(generation = inv.generation, "dialog suspended");
    }

    fn resume(&mut self, doc: &mut Document) {
        let phase = self.phase();
        if !matches!(phase, Phase::Opening | Phase::Visible) {
            tracing::debug!(%phase, "show ignored");
            return;
        }
        let Some(generation) = self.current.as_ref().map(|inv| inv.generation) else {
            return;
        };
        let handler = self.listener(generation);
        let Some(inv) = self.current.as_mut() else {
            return;
        };
        if !inv.suspended {
            return;
        }
        inv.suspended = false;
        doc.set_flags(inv.nodes.root, NodeFlags::HIDDEN, false);
        if phase == Phase::Visible {
            inv.guard.refresh_in(doc);
            inv.subscription = Some(self.page.events().subscribe(handler));
            apply_initial_focus(doc, inv);
        }
        tracing::debug!(generation, "dialog resumed");
    }

    fn handle_event(
        &mut self,
        generation: u64,
        event: &Event,
        doc: &mut Document,
    ) -> (EventDisposition, Option<Hook>) {
        if !self.is_current(generation) || self.phase() != Phase::Visible {
            return (EventDisposition::Ignored, None);
        }
        let Some(inv) = self.current.as_ref() else {
            return (EventDisposition::Ignored, None);
        };
        if inv.suspended {
            return (EventDisposition::Ignored, None);
        }
        inv.guard.refresh_in(doc);
        let action = match event {
            Event::Key(key) => inv
                .config
                .router()
                .route(doc, inv.nodes.panel, key, inv.enter_claimed),
            Event::Mouse(mouse) => click_action(doc, inv, mouse),
        };
        let disposition = if action.consumes() {
            EventDisposition::Consumed
        } else {
            EventDisposition::Ignored
        };
        let hook = match action {
            KeyAction::MoveFocus(target) => {
                doc.focus(target);
                None
            }
            KeyAction::Ignore | KeyAction::Suppress | KeyAction::PassThrough => None,
            KeyAction::Cancel | KeyAction::Activate(ModalAction::Cancel) => {
                self.decide(Decision::Cancel, None, doc)
            }
            KeyAction::Activate(ModalAction::Close) => self.decide(Decision::Close, None, doc),
            KeyAction::Confirm | KeyAction::Activate(ModalAction::Confirm) => {
                self.decide(Decision::Confirm, None, doc)
            }
        };
        (disposition, hook)
    }

    fn dispose(&mut self, doc: &mut Document) {
        self.disposed = true;
        if let Some(inv) = self.current.take() {
            tracing::debug!(generation = inv.generation, "disposing live dialog");
            self.set_phase(Phase::Closed);
            teardown(inv, doc);
        }
        let queued = self.queue.len();
        self.queue.clear();
        if queued > 0 {
            tracing::debug!(queued, "queued dialogs cancelled by dispose");
        }
    }

    fn abort(&mut self) {
        tracing::error!(phase = %self.phase(), "panic during dialog transition, tearing down");
        let document = self.page.document().clone();
        let inv = self.current.take();
        if let Some(inv) = inv {
            match document.try_borrow_mut() {
                Ok(mut doc) => teardown(inv, &mut doc),
                Err(_) => drop(inv),
            }
        }
        self.set_phase(Phase::Closed);
        self.queue.clear();
    }
}

fn click_action<O: DialogOutcome>(doc: &Document, inv: &Invocation<O>, mouse: &MouseEvent) -> KeyAction {
    if !mouse.is_primary_click() {
        return KeyAction::Ignore;
    }
    if mouse.target == inv.nodes.backdrop {
        return if inv.config.close_on_backdrop {
            KeyAction::Cancel
        } else {
            KeyAction::Suppress
        };
    }
    match ModalAction::at(doc, inv.nodes.panel, mouse.target) {
        Some(action) => KeyAction::Activate(action),
        None => KeyAction::Ignore,
    }
}

fn apply_initial_focus<O: DialogOutcome>(doc: &mut Document, inv: &Invocation<O>) {
    let panel = inv.nodes.panel;
    if doc
        .active_element()
        .is_some_and(|active| active != panel && doc.contains(panel, active))
    {
        return;
    }
    let candidates = focus_trap::candidates(doc, panel);
    let target = match inv.config.initial_focus {
        InitialFocus::Panel => None,
        InitialFocus::FirstCandidate => candidates.first().copied(),
        InitialFocus::Confirm => candidates
            .iter()
            .copied()
            .find(|&n| ModalAction::of(doc, n) == Some(ModalAction::Confirm))
            .or_else(|| candidates.first().copied()),
    };
    if !target.is_some_and(|node| doc.focus(node)) {
        doc.focus(panel);
    }
}

/// Closed-phase teardown: unmount, release page effects, restore focus,
/// deliver the outcome.
fn teardown<O: DialogOutcome>(mut inv: Invocation<O>, doc: &mut Document) {
    inv.sequencer.cancel();
    inv.subscription = None;
    render::unmount(doc, &inv.nodes);
    inv.guard.release_in(doc);
    if let Some(snapshot) = inv.focus.take() {
        let restored = snapshot.restore(doc);
        tracing::trace!(?restored, "focus restored");
    }
    inv.latch.deliver();
}

/// Lifecycle controller for one dialog at a time.
///
/// The controller is reusable: after an invocation reaches Closed, `open`
/// starts a fresh one with a fresh options snapshot, ids, and outcome.
///
/// Dropping the controller disposes it.
pub struct ModalController<O: DialogOutcome> {
    inner: Rc<RefCell<Inner<O>>>,
    status: Rc<Cell<Status>>,
    page: Page,
}

impl<O: DialogOutcome> fmt::Debug for ModalController<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status.get();
        f.debug_struct("ModalController")
            .field("phase", &status.phase)
            .field("generation", &status.generation)
            .finish_non_exhaustive()
    }
}

impl<O: DialogOutcome> ModalController<O> {
    /// Create a controller bound to `page`.
    #[must_use]
    pub fn new(page: &Page) -> Self {
        let status = Rc::new(Cell::new(Status::default()));
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                page: page.clone(),
                status: Rc::clone(&status),
                policy: ReentryPolicy::default(),
                current: None,
                queue: VecDeque::new(),
                disposed: false,
                this: this.clone(),
            })
        });
        Self {
            inner,
            status,
            page: page.clone(),
        }
    }

    /// Set the re-entry policy.
    #[must_use]
    pub fn with_reentry(self, policy: ReentryPolicy) -> Self {
        self.inner.borrow_mut().policy = policy;
        self
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Open a dialog. Returns immediately; the handle resolves when the
    /// dialog reaches Closed.
    pub fn open(&self, request: ModalRequest<O>) -> Result<DialogHandle<O>, DialogError> {
        let _span = tracing::debug_span!("modal_open").entered();
        match drive(&Rc::downgrade(&self.inner), |inner, doc| {
            inner.open(request, doc)
        }) {
            Drive::Done(result) => result,
            Drive::Busy => {
                tracing::warn!("open while the controller or document is borrowed");
                Err(DialogError::Busy)
            }
            Drive::Gone => Err(DialogError::Disposed),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.status.get().phase
    }

    /// Invocation counter; bumps on every started invocation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.status.get().generation
    }

    /// Number of queued `open` requests.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.inner.try_borrow().map_or(0, |inner| inner.queue.len())
    }

    /// Generated ids of the live invocation.
    #[must_use]
    pub fn ids(&self) -> Option<DialogIds> {
        self.inner
            .try_borrow()
            .ok()
            .and_then(|inner| inner.current.as_ref().map(|inv| inv.ids.clone()))
    }

    /// Shell nodes of the live invocation.
    #[must_use]
    pub fn nodes(&self) -> Option<DialogNodes> {
        self.inner
            .try_borrow()
            .ok()
            .and_then(|inner| inner.current.as_ref().map(|inv| inv.nodes))
    }

    /// A control handle for the live invocation.
    #[must_use]
    pub fn control(&self) -> Option<ControlHandle<O>> {
        let inner = self.inner.try_borrow().ok()?;
        let generation = inner.current.as_ref()?.generation;
        Some(inner.control_handle(generation))
    }

    /// Tear down immediately: the live invocation resolves (cancelled if
    /// undecided), page effects are released, focus is restored, and queued
    /// requests resolve cancelled. Later `open` calls fail with
    /// [`DialogError::Disposed`].
    pub fn dispose(&self) {
        match drive(&Rc::downgrade(&self.inner), |inner, doc| inner.dispose(doc)) {
            Drive::Done(()) | Drive::Gone => {}
            Drive::Busy => {
                tracing::error!("dialog controller busy during dispose, cleanup left to drop");
            }
        }
    }
}

impl<O: DialogOutcome> Drop for ModalController<O> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Content-side control of one invocation.
///
/// Handles are tied to the invocation that created them: once it reaches
/// Closed (or the controller is dropped), every method is a logged no-op.
/// Calls made while the controller is mid-transition run on the next tick.
pub struct ControlHandle<O: DialogOutcome> {
    inner: Weak<RefCell<Inner<O>>>,
    status: Rc<Cell<Status>>,
    scheduler: Scheduler,
    generation: u64,
}

impl<O: DialogOutcome> Clone for ControlHandle<O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            status: Rc::clone(&self.status),
            scheduler: self.scheduler.clone(),
            generation: self.generation,
        }
    }
}

impl<O: DialogOutcome> fmt::Debug for ControlHandle<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlHandle")
            .field("generation", &self.generation)
            .field("live", &self.is_live())
            .finish()
    }
}

impl<O: DialogOutcome> ControlHandle<O> {
    /// Confirm with an explicit outcome.
    pub fn confirm_with(&self, outcome: O) {
        self.act(Action::Decide(Decision::Confirm, Some(outcome)));
    }

    /// Confirm with the request's `confirm_value`.
    pub fn confirm(&self) {
        self.act(Action::Decide(Decision::Confirm, None));
    }

    pub fn cancel(&self) {
        self.act(Action::Decide(Decision::Cancel, None));
    }

    /// Force-cancel (the close button).
    pub fn close(&self) {
        self.act(Action::Decide(Decision::Close, None));
    }

    /// Suspend: hide the dialog and stop listening for input, keeping the
    /// outcome pending and the page effects held.
    pub fn hide(&self) {
        self.act(Action::Hide);
    }

    /// Resume after [`hide`](Self::hide).
    pub fn show(&self) {
        self.act(Action::Show);
    }

    /// Take ownership of Enter: it will no longer trigger the confirm
    /// shortcut.
    pub fn claim_enter(&self) {
        self.act(Action::ClaimEnter(true));
    }

    pub fn release_enter(&self) {
        self.act(Action::ClaimEnter(false));
    }

    /// Whether this handle's invocation is live and undecided.
    #[must_use]
    pub fn is_live(&self) -> bool {
        let status = self.status.get();
        status.generation == self.generation && status.phase.is_live() && !status.decided
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn act(&self, action: Action<O>) {
        let generation = self.generation;
        let mut slot = Some(action);
        let result = drive(&self.inner, |inner, doc| {
            slot.take()
                .and_then(|action| inner.apply(generation, action, doc))
        });
        match result {
            Drive::Done(Some(hook)) => hook(),
            Drive::Done(None) => {}
            Drive::Busy => {
                if let Some(action) = slot.take() {
                    tracing::trace!(generation, "controller busy, deferring handle action");
                    let this = self.clone();
                    self.scheduler.defer(move || this.act(action));
                }
            }
            Drive::Gone => tracing::warn!(generation, "dialog handle used after its controller was dropped"),
        }
    }
}
