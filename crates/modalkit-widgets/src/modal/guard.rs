#![forbid(unsafe_code)]

//! Scoped page effects: scroll lock and background masking.
//!
//! While any dialog holds a [`ResourceGuard`] on a document:
//!
//! - body carries `overflow: hidden` (the prior inline value is restored
//!   afterwards, or the property removed if there was none);
//! - every body child except the dialog's root is `aria-hidden` and inert.
//!
//! Effects are reference counted per document. They are applied on the
//! 0→1 transition and removed on 1→0, so one dialog closing never unlocks
//! the page under another dialog that is still open. Only nodes this
//! module masked are unmasked; content the host had already hidden stays
//! hidden.
//!
//! Body children appended after acquisition (toasts, late portals) are not
//! seen until [`ResourceGuard::refresh_in`] runs. The modal controller
//! refreshes when a dialog becomes visible and before routing each event,
//! so a late sibling is masked by the time the user can interact with it.
//!
//! # Failure Modes
//!
//! - A late sibling stays reachable to assistive technology until the next
//!   refresh. Hosts mutating body outside input handling can call
//!   `refresh_in` themselves.
//! - If the document is mutably borrowed when a guard is dropped, the
//!   release cannot run; it is logged at `error` level. Release explicitly
//!   with [`ResourceGuard::release_in`] when a borrow is already held.

use std::cell::RefCell;

use ahash::AHashMap;
use modalkit_core::{Document, DocumentId, NodeFlags, NodeId, SharedDocument};

const MASK: NodeFlags = NodeFlags::ARIA_HIDDEN.union(NodeFlags::INERT);
const OVERFLOW: &str = "overflow";

#[derive(Debug, Default)]
struct PageEffects {
    holders: usize,
    prior_overflow: Option<String>,
    masked: Vec<NodeId>,
    exempt: Vec<NodeId>,
}

impl PageEffects {
    /// Mask body children that are neither exempt, already masked by us,
    /// nor already hidden by the host. Returns how many were newly masked.
    fn mask_new_siblings(&mut self, doc: &mut Document) -> usize {
        let fresh: Vec<NodeId> = doc
            .children(doc.body())
            .iter()
            .copied()
            .filter(|child| !self.exempt.contains(child) && !self.masked.contains(child))
            .filter(|&child| !doc.flags(child).intersects(MASK))
            .collect();
        for &node in &fresh {
            doc.set_flags(node, MASK, true);
        }
        self.masked.extend_from_slice(&fresh);
        fresh.len()
    }
}

thread_local! {
    static EFFECTS: RefCell<AHashMap<DocumentId, PageEffects>> = RefCell::new(AHashMap::new());
}

/// Number of guards currently held on `doc`.
#[must_use]
pub fn holders(doc: DocumentId) -> usize {
    EFFECTS.with(|effects| effects.borrow().get(&doc).map_or(0, |e| e.holders))
}

/// Whether body scrolling is currently locked by a guard.
#[must_use]
pub fn is_scroll_locked(doc: &Document) -> bool {
    holders(doc.id()) > 0 && doc.style(doc.body(), OVERFLOW) == Some("hidden")
}

/// One dialog's claim on the page effects.
///
/// Release happens exactly once: explicitly through [`release`] /
/// [`release_in`], or on drop.
///
/// [`release`]: ResourceGuard::release
/// [`release_in`]: ResourceGuard::release_in
#[must_use = "dropping the guard releases the page effects"]
#[derive(Debug)]
pub struct ResourceGuard {
    document: SharedDocument,
    document_id: DocumentId,
    exempt_root: NodeId,
    released: bool,
}

impl ResourceGuard {
    /// Acquire the effects for a dialog rooted at `exempt_root`.
    ///
    /// Borrows the document mutably; use [`acquire_in`](Self::acquire_in)
    /// when a borrow is already held.
    pub fn acquire(document: &SharedDocument, exempt_root: NodeId) -> Self {
        let mut doc = document.borrow_mut();
        Self::acquire_in(document, &mut doc, exempt_root)
    }

    /// Acquire with an already-borrowed document. `doc` must be the
    /// document behind `document`.
    pub fn acquire_in(document: &SharedDocument, doc: &mut Document, exempt_root: NodeId) -> Self {
        let id = doc.id();
        EFFECTS.with(|effects| {
            let mut effects = effects.borrow_mut();
            let entry = effects.entry(id).or_default();
            entry.exempt.push(exempt_root);
            if entry.holders == 0 {
                let body = doc.body();
                entry.prior_overflow = doc.set_style(body, OVERFLOW, "hidden");
                let masked = entry.mask_new_siblings(doc);
                tracing::debug!(masked, "page effects applied");
            } else if let Some(pos) = entry.masked.iter().position(|&n| n == exempt_root) {
                entry.masked.swap_remove(pos);
                doc.set_flags(exempt_root, MASK, false);
            }
            entry.holders += 1;
            tracing::trace!(holders = entry.holders, "page effects acquired");
        });
        Self {
            document: document.clone(),
            document_id: id,
            exempt_root,
            released: false,
        }
    }

    /// Mask body children added since the effects were applied. Returns
    /// the number of nodes newly masked; zero once released.
    pub fn refresh_in(&self, doc: &mut Document) -> usize {
        if self.released || doc.id() != self.document_id {
            return 0;
        }
        EFFECTS.with(|effects| {
            let mut effects = effects.borrow_mut();
            let Some(entry) = effects.get_mut(&self.document_id) else {
                return 0;
            };
            let masked = entry.mask_new_siblings(doc);
            if masked > 0 {
                tracing::debug!(masked, "late siblings masked");
            }
            masked
        })
    }

    /// The root this guard keeps reachable.
    #[must_use]
    pub fn exempt_root(&self) -> NodeId {
        self.exempt_root
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release the claim. Idempotent. Returns `false` when already released
    /// or when the document is busy.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        let document = self.document.clone();
        let Ok(mut doc) = document.try_borrow_mut() else {
            tracing::error!("page effects not released: document is borrowed");
            return false;
        };
        self.release_in(&mut doc)
    }

    /// Release with an already-borrowed document. Idempotent.
    pub fn release_in(&mut self, doc: &mut Document) -> bool {
        if self.released || doc.id() != self.document_id {
            return false;
        }
        self.released = true;
        EFFECTS.with(|effects| {
            let mut effects = effects.borrow_mut();
            let Some(entry) = effects.get_mut(&self.document_id) else {
                return;
            };
            entry.holders = entry.holders.saturating_sub(1);
            if let Some(pos) = entry.exempt.iter().position(|&n| n == self.exempt_root) {
                entry.exempt.swap_remove(pos);
            }
            tracing::trace!(holders = entry.holders, "page effects released");
            if entry.holders > 0 {
                return;
            }
            let body = doc.body();
            match entry.prior_overflow.take() {
                Some(prior) => {
                    doc.set_style(body, OVERFLOW, prior);
                }
                None => {
                    doc.remove_style(body, OVERFLOW);
                }
            }
            for node in entry.masked.drain(..) {
                doc.set_flags(node, MASK, false);
            }
            effects.remove(&self.document_id);
            tracing::debug!("page effects removed");
        });
        true
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.release();
    }
}
