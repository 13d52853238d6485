#![forbid(unsafe_code)]

//! Two-phase mount/unmount sequencing.
//!
//! Opening mounts the dialog in its hidden visual state and flips it to
//! visible on the next scheduler tick, so a CSS transition has a starting
//! frame. Closing flips back to hidden and unmounts once the exit duration
//! has elapsed. The renderer writes the same durations as
//! `transition-duration`, so the delay and the visual transition share one
//! source.
//!
//! At most one sequencing task is pending at a time; starting a new step
//! cancels the previous one.

use std::time::Duration;

use modalkit_core::{Document, NodeId, Scheduler, TaskId};

/// Default duration of each transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Transition durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionConfig {
    #[cfg_attr(feature = "serde", serde(with = "millis", rename = "enter_ms"))]
    pub enter: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis", rename = "exit_ms"))]
    pub exit: Duration,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enter: DEFAULT_TRANSITION,
            exit: DEFAULT_TRANSITION,
        }
    }
}

impl TransitionConfig {
    /// No animation: the exit unmounts on the next tick.
    #[must_use]
    pub const fn reduced_motion() -> Self {
        Self {
            enter: Duration::ZERO,
            exit: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn enter(mut self, duration: Duration) -> Self {
        self.enter = duration;
        self
    }

    #[must_use]
    pub const fn exit(mut self, duration: Duration) -> Self {
        self.exit = duration;
        self
    }

    /// CSS value for a duration (`"300ms"`).
    #[must_use]
    pub fn css(duration: Duration) -> String {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// The two visual variants of a mounted dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    Hidden,
    Visible,
}

impl VisualState {
    /// The `data-state` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        }
    }

    const fn class(self) -> &'static str {
        match self {
            Self::Hidden => "is-hidden",
            Self::Visible => "is-visible",
        }
    }

    /// Write this state onto `node`: `data-state` plus the matching
    /// `is-hidden`/`is-visible` class.
    pub fn apply(self, doc: &mut Document, node: NodeId) {
        let other = match self {
            Self::Hidden => Self::Visible,
            Self::Visible => Self::Hidden,
        };
        doc.set_attr(node, "data-state", self.as_str());
        doc.remove_class(node, other.class());
        doc.add_class(node, self.class());
    }

    /// Read the state back from `node`.
    #[must_use]
    pub fn of(doc: &Document, node: NodeId) -> Option<Self> {
        match doc.attr(node, "data-state")? {
            "hidden" => Some(Self::Hidden),
            "visible" => Some(Self::Visible),
            _ => None,
        }
    }
}

/// Schedules the enter flip and the exit unmount for one invocation.
#[derive(Debug)]
pub struct VisibilitySequencer {
    scheduler: Scheduler,
    config: TransitionConfig,
    pending: Option<TaskId>,
}

impl VisibilitySequencer {
    #[must_use]
    pub fn new(scheduler: Scheduler, config: TransitionConfig) -> Self {
        Self {
            scheduler,
            config,
            pending: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> TransitionConfig {
        self.config
    }

    /// Run `flip` on the next tick.
    pub fn begin_enter(&mut self, flip: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(self.scheduler.defer(flip));
    }

    /// Mark the enter step as done. Returns the state to render.
    pub fn complete_enter(&mut self) -> VisualState {
        self.pending = None;
        VisualState::Visible
    }

    /// Run `unmount` once the exit duration has elapsed.
    pub fn begin_exit(&mut self, unmount: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(self.scheduler.after(self.config.exit, unmount));
    }

    /// Mark the exit step as done. Returns the state to render.
    pub fn complete_exit(&mut self) -> VisualState {
        self.pending = None;
        VisualState::Hidden
    }

    /// Drop whatever step is pending.
    pub fn cancel(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Whether a step is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some_and(|id| self.scheduler.is_pending(id))
    }
}

impl Drop for VisibilitySequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modalkit_core::ElementKind;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn enter_flips_on_next_tick_not_inline() {
        let sched = Scheduler::new();
        let mut seq = VisibilitySequencer::new(sched.clone(), TransitionConfig::default());
        let flipped = Rc::new(Cell::new(false));
        let f = Rc::clone(&flipped);
        seq.begin_enter(move || f.set(true));
        assert!(!flipped.get());
        assert!(seq.is_pending());
        sched.tick();
        assert!(flipped.get());
        assert_eq!(seq.complete_enter(), VisualState::Visible);
        assert!(!seq.is_pending());
    }

    #[test]
    fn exit_waits_for_the_transition() {
        let sched = Scheduler::new();
        let mut seq = VisibilitySequencer::new(
            sched.clone(),
            TransitionConfig::default().exit(Duration::from_millis(250)),
        );
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        seq.begin_exit(move || d.set(true));
        sched.advance(Duration::from_millis(249));
        assert!(!done.get());
        sched.advance(Duration::from_millis(1));
        assert!(done.get());
    }

    #[test]
    fn new_step_cancels_previous() {
        let sched = Scheduler::new();
        let mut seq = VisibilitySequencer::new(sched.clone(), TransitionConfig::reduced_motion());
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        seq.begin_enter(move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        seq.begin_exit(move || h.set(h.get() + 10));
        sched.run_until_idle();
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn dropping_sequencer_cancels_pending_step() {
        let sched = Scheduler::new();
        let hit = Rc::new(Cell::new(false));
        {
            let mut seq = VisibilitySequencer::new(sched.clone(), TransitionConfig::default());
            let h = Rc::clone(&hit);
            seq.begin_exit(move || h.set(true));
        }
        sched.run_until_idle();
        assert!(!hit.get());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn visual_state_round_trips_through_the_node() {
        let mut doc = Document::new();
        let node = doc.create(ElementKind::Div);
        VisualState::Hidden.apply(&mut doc, node);
        assert!(doc.has_class(node, "is-hidden"));
        VisualState::Visible.apply(&mut doc, node);
        assert_eq!(VisualState::of(&doc, node), Some(VisualState::Visible));
        assert!(doc.has_class(node, "is-visible"));
        assert!(!doc.has_class(node, "is-hidden"));
    }

    #[test]
    fn css_durations() {
        assert_eq!(TransitionConfig::css(DEFAULT_TRANSITION), "300ms");
        assert_eq!(TransitionConfig::css(TransitionConfig::reduced_motion().exit), "0ms");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn transition_config_loads_from_json_millis() {
        let config: TransitionConfig =
            serde_json::from_str(r#"{"enter_ms":120,"exit_ms":200}"#).expect("valid json");
        assert_eq!(config.enter, Duration::from_millis(120));
        assert_eq!(config.exit, Duration::from_millis(200));
        let back = serde_json::to_string(&config).expect("serializes");
        assert_eq!(back, r#"{"enter_ms":120,"exit_ms":200}"#);
    }
}
