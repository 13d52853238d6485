#![forbid(unsafe_code)]

//! Generated element ids.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DIALOG: AtomicU64 = AtomicU64::new(1);

/// The set of ids one dialog invocation binds its elements to.
///
/// Every call to [`DialogIds::generate`] yields a fresh, process-unique set,
/// so two dialogs (or two invocations of the same dialog) never collide on
/// `aria-labelledby` targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogIds {
    pub root: String,
    pub backdrop: String,
    pub panel: String,
    pub title: String,
    pub body: String,
}

impl DialogIds {
    /// Allocate a new id set.
    #[must_use]
    pub fn generate() -> Self {
        let n = NEXT_DIALOG.fetch_add(1, Ordering::Relaxed);
        Self::from_root(format!("modal-{n}"))
    }

    /// Derive the id set from a caller-chosen root id.
    #[must_use]
    pub fn from_root(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            backdrop: format!("{root}-backdrop"),
            panel: format!("{root}-panel"),
            title: format!("{root}-title"),
            body: format!("{root}-body"),
            root,
        }
    }

    /// Id for a caller-defined part of the dialog (e.g. a form field), so
    /// custom content can label its fields without colliding.
    #[must_use]
    pub fn part(&self, name: &str) -> String {
        format!("{}-{name}", self.root)
    }
}
