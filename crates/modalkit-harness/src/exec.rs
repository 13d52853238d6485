#![forbid(unsafe_code)]

//! Awaiting dialog handles the way an async caller would.
//!
//! A caller typically writes `let ok = dialog.open(opts)?.await;` inside a
//! task on the UI thread's local executor. [`Awaiter`] spawns such tasks
//! on a [`LocalPool`] and records what each one received, so tests can
//! interleave input, clock advances, and executor turns explicitly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use modalkit_widgets::modal::{DialogHandle, DialogOutcome};

/// What one awaiting task has received.
pub struct Watched<O> {
    slot: Rc<RefCell<Option<O>>>,
    resolutions: Rc<RefCell<usize>>,
}

impl<O> Clone for Watched<O> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            resolutions: Rc::clone(&self.resolutions),
        }
    }
}

impl<O: fmt::Debug> fmt::Debug for Watched<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watched")
            .field("value", &self.slot.borrow())
            .field("resolutions", &self.resolutions.borrow())
            .finish()
    }
}

impl<O: Clone> Watched<O> {
    /// The awaited value, once the task has completed.
    #[must_use]
    pub fn get(&self) -> Option<O> {
        self.slot.borrow().clone()
    }
}

impl<O> Watched<O> {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// How many times the awaiting task completed (0 or 1).
    #[must_use]
    pub fn resolutions(&self) -> usize {
        *self.resolutions.borrow()
    }
}

/// A local executor for awaiting dialog handles.
#[derive(Debug)]
pub struct Awaiter {
    pool: LocalPool,
}

impl Default for Awaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Awaiter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: LocalPool::new(),
        }
    }

    /// Spawn a task that awaits `handle` and records the outcome.
    pub fn watch<O: DialogOutcome>(&mut self, handle: DialogHandle<O>) -> Watched<O> {
        let watched = Watched {
            slot: Rc::new(RefCell::new(None)),
            resolutions: Rc::new(RefCell::new(0)),
        };
        let sink = watched.clone();
        let task = async move {
            let outcome = handle.await;
            *sink.slot.borrow_mut() = Some(outcome);
            *sink.resolutions.borrow_mut() += 1;
        };
        if let Err(err) = self.pool.spawner().spawn_local(task) {
            tracing::error!(%err, "failed to spawn awaiting task");
        }
        watched
    }

    /// Poll every spawned task until none can make progress.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }
}
