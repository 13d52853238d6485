#![forbid(unsafe_code)]

//! Accessible modal dialogs: lifecycle controller, confirmation and
//! data-entry presets, and the pieces they are built from.
//!
//! # Lifecycle
//!
//! [`ModalController`] drives one invocation at a time through
//! `Closed → Opening → Visible → Closing → Closed`. The caller gets a
//! [`DialogHandle`] that resolves exactly once, when the dialog is back to
//! Closed and the page is restored.
//!
//! # Focus Management
//!
//! - **Auto-focus**: on entering Visible, focus moves into the panel
//!   ([`InitialFocus`]).
//! - **Focus trap**: Tab / Shift+Tab wrap inside the panel
//!   ([`focus_trap::next_target`]).
//! - **Focus restore**: the element focused before opening gets focus
//!   back; if it is gone, focus falls back to body.
//!
//! # Page Effects
//!
//! While any dialog is open on a document, body scrolling is locked and
//! background content is hidden from assistive technology and made inert
//! ([`guard::ResourceGuard`], reference counted across dialogs).
//!
//! # Example
//!
//! ```
//! use modalkit_core::{Event, KeyCode, Page};
//! use modalkit_widgets::modal::{ConfirmDialog, ConfirmOptions};
//! use std::time::Duration;
//!
//! let page = Page::new();
//! let dialog = ConfirmDialog::new(&page);
//! let mut handle = dialog
//!     .open(ConfirmOptions::new().title("Delete").message("Delete this file?"))
//!     .unwrap();
//!
//! page.tick();
//! page.dispatch(Event::key(KeyCode::Escape));
//! page.advance(Duration::from_millis(300));
//! assert_eq!(handle.try_outcome(), Some(false));
//! ```

mod confirm;
mod controller;
mod error;
pub mod focus_trap;
mod form;
pub mod guard;
mod keyboard;
mod latch;
pub mod render;
mod sequencer;

pub use confirm::{ConfirmDialog, ConfirmOptions};
pub use controller::{
    ConfirmValue, ContentScope, ControlHandle, DEFAULT_Z_INDEX, Hook, InitialFocus, ModalConfig,
    ModalController, ModalRequest, Phase, ReentryPolicy,
};
pub use error::DialogError;
pub use focus_trap::{FocusSnapshot, RestoreOutcome};
pub use form::{FormDialog, FormHandle, FormOptions, FormScope, RenderForm};
pub use guard::ResourceGuard;
pub use keyboard::{ACTION_ATTR, EnterPolicy, KeyAction, KeyboardRouter, ModalAction};
pub use latch::{DialogHandle, DialogOutcome, OutcomeLatch};
pub use render::{DialogNodes, StyleTokens};
pub use sequencer::{DEFAULT_TRANSITION, TransitionConfig, VisibilitySequencer, VisualState};
