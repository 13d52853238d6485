#![forbid(unsafe_code)]

//! Proptest strategies for user input against an open dialog.

use std::time::Duration;

use modalkit_core::{KeyCode, NodeId, Page};
use proptest::prelude::*;

use crate::input;

/// One simulated user or clock action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStep {
    Tab,
    BackTab,
    Enter,
    Space,
    Escape,
    ClickBackdrop,
    ClickPanel,
    ClickBackground,
    Tick,
    Advance(u16),
}

/// Nodes the click steps target.
#[derive(Debug, Clone, Copy)]
pub struct ClickTargets {
    pub backdrop: NodeId,
    pub panel: NodeId,
    pub background: NodeId,
}

impl InputStep {
    /// Apply the step to `page`.
    pub fn apply(self, page: &Page, targets: &ClickTargets) {
        match self {
            Self::Tab => {
                input::tab(page);
            }
            Self::BackTab => {
                input::back_tab(page);
            }
            Self::Enter => {
                input::enter(page);
            }
            Self::Space => {
                input::press(page, KeyCode::Char(' '));
            }
            Self::Escape => {
                input::escape(page);
            }
            Self::ClickBackdrop => {
                input::click(page, targets.backdrop);
            }
            Self::ClickPanel => {
                input::click(page, targets.panel);
            }
            Self::ClickBackground => {
                input::click(page, targets.background);
            }
            Self::Tick => {
                page.tick();
            }
            Self::Advance(ms) => {
                page.advance(Duration::from_millis(u64::from(ms)));
            }
        }
    }

    /// Whether the step can end the dialog.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Enter | Self::Space | Self::Escape | Self::ClickBackdrop
        )
    }
}

/// Focus navigation only.
pub fn navigation() -> impl Strategy<Value = InputStep> {
    prop_oneof![Just(InputStep::Tab), Just(InputStep::BackTab)]
}

/// Any step, weighted toward navigation so sequences stay open a while.
pub fn any_step() -> impl Strategy<Value = InputStep> {
    prop_oneof![
        4 => navigation(),
        1 => Just(InputStep::Enter),
        1 => Just(InputStep::Space),
        1 => Just(InputStep::Escape),
        1 => Just(InputStep::ClickBackdrop),
        1 => Just(InputStep::ClickPanel),
        1 => Just(InputStep::ClickBackground),
        2 => Just(InputStep::Tick),
        2 => (0u16..500).prop_map(InputStep::Advance),
    ]
}

pub fn steps(max_len: usize) -> impl Strategy<Value = Vec<InputStep>> {
    proptest::collection::vec(any_step(), 0..max_len)
}
