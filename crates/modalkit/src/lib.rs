#![forbid(unsafe_code)]

//! modalkit: accessible modal dialogs for headless pages.
//!
//! A [`Page`] bundles the document, the input event hub, and the scheduler.
//! Dialog types open over it and hand back a [`DialogHandle`] that resolves
//! once the dialog has fully closed:
//!
//! ```
//! use futures::executor::block_on;
//! use modalkit::prelude::*;
//!
//! let page = Page::new();
//! let dialog = ConfirmDialog::new(&page);
//! let handle = dialog
//!     .open(
//!         ConfirmOptions::new()
//!             .title("Discard draft")
//!             .message("This cannot be undone.")
//!             .initial_focus(InitialFocus::Confirm),
//!     )
//!     .expect("controller is idle");
//!
//! page.tick();
//! let _ = page.dispatch(KeyEvent::new(KeyCode::Enter));
//! page.scheduler().run_until_idle();
//! assert!(block_on(handle));
//! ```
//!
//! The member crates stay reachable for lower-level use:
//! [`headless`], [`a11y`], [`i18n`], [`widgets`].

pub use modalkit_a11y as a11y;
pub use modalkit_core as headless;
pub use modalkit_i18n as i18n;
pub use modalkit_widgets as widgets;

pub use modalkit_core::{Event, EventDisposition, KeyCode, KeyEvent, Modifiers, Page};
pub use modalkit_widgets::modal::{
    ConfirmDialog, ConfirmOptions, DialogError, DialogHandle, FormDialog, FormHandle, FormOptions,
    FormScope, ModalConfig, ModalController, ModalRequest, Phase, ReentryPolicy,
};

/// Everything a typical caller needs.
pub mod prelude {
    pub use modalkit_a11y::{AccessibleLabels, Role};
    pub use modalkit_core::{
        Document, Event, EventDisposition, KeyCode, KeyEvent, Modifiers, NodeId, Page,
    };
    pub use modalkit_i18n::LocaleContext;
    pub use modalkit_widgets::modal::{
        ConfirmDialog, ConfirmOptions, ContentScope, ControlHandle, DialogError, DialogHandle,
        EnterPolicy, FormDialog, FormHandle, FormOptions, FormScope, InitialFocus, ModalConfig,
        ModalController, ModalRequest, Phase, ReentryPolicy, StyleTokens, TransitionConfig,
    };
}
