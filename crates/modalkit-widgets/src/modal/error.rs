#![forbid(unsafe_code)]

use super::controller::Phase;

/// Errors from opening a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    /// An invocation is still live and the controller rejects re-entry.
    #[error("a dialog is already open on this controller (phase: {phase})")]
    AlreadyOpen { phase: Phase },
    /// `open` was called after `dispose`.
    #[error("the dialog controller has been disposed")]
    Disposed,
    /// `open` was called re-entrantly while the controller or its document
    /// was mid-update (e.g. from inside a content render function).
    #[error("the dialog controller is busy; open it from a scheduled task instead")]
    Busy,
}
