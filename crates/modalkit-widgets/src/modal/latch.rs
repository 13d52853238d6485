#![forbid(unsafe_code)]

//! One-shot outcome latch and the caller's awaitable handle.
//!
//! An invocation's outcome is *decided* when the user acts (confirm,
//! cancel, Escape, backdrop) and *delivered* when the dialog reaches
//! Closed. The latch enforces both steps happen at most once:
//!
//! ```text
//! Pending ──decide──▶ Decided ──deliver──▶ Delivered
//!    └──────────────deliver (cancelled)──────▲
//! ```
//!
//! A latch dropped without delivering resolves its handle as cancelled, so
//! a caller awaiting a torn-down dialog never hangs.

use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

/// Outcome types a dialog can resolve to.
pub trait DialogOutcome: Sized + 'static {
    /// The value delivered when the dialog is dismissed without a decision.
    fn cancelled() -> Self;
}

impl DialogOutcome for bool {
    fn cancelled() -> Self {
        false
    }
}

impl<T: 'static> DialogOutcome for Option<T> {
    fn cancelled() -> Self {
        None
    }
}

enum LatchState<O> {
    Pending(oneshot::Sender<O>),
    Decided(oneshot::Sender<O>, O),
    Delivered,
}

/// Controller side of an invocation's outcome.
pub struct OutcomeLatch<O: DialogOutcome> {
    state: LatchState<O>,
}

impl<O: DialogOutcome> fmt::Debug for OutcomeLatch<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            LatchState::Pending(_) => "Pending",
            LatchState::Decided(..) => "Decided",
            LatchState::Delivered => "Delivered",
        };
        f.debug_struct("OutcomeLatch").field("state", &state).finish()
    }
}

impl<O: DialogOutcome> OutcomeLatch<O> {
    /// Create a pending latch and the handle it resolves.
    #[must_use]
    pub fn new() -> (Self, DialogHandle<O>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                state: LatchState::Pending(tx),
            },
            DialogHandle { rx, done: false },
        )
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, LatchState::Pending(_))
    }

    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self.state, LatchState::Decided(..))
    }

    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self.state, LatchState::Delivered)
    }

    /// Whether the caller dropped its handle before delivery.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        match &self.state {
            LatchState::Pending(tx) | LatchState::Decided(tx, _) => tx.is_canceled(),
            LatchState::Delivered => false,
        }
    }

    /// Record the outcome. Only the first decision counts; returns `false`
    /// if one was already made.
    pub fn decide(&mut self, outcome: O) -> bool {
        match mem::replace(&mut self.state, LatchState::Delivered) {
            LatchState::Pending(tx) => {
                self.state = LatchState::Decided(tx, outcome);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Send the decided outcome (or the cancelled value when undecided).
    /// Returns `false` if already delivered.
    pub fn deliver(&mut self) -> bool {
        let (tx, outcome) = match mem::replace(&mut self.state, LatchState::Delivered) {
            LatchState::Pending(tx) => (tx, O::cancelled()),
            LatchState::Decided(tx, outcome) => (tx, outcome),
            LatchState::Delivered => return false,
        };
        // The caller may have dropped the handle; that is not an error.
        let _ = tx.send(outcome);
        true
    }
}

impl<O: DialogOutcome> Drop for OutcomeLatch<O> {
    fn drop(&mut self) {
        self.deliver();
    }
}

/// Awaitable outcome of one dialog invocation.
///
/// Resolves exactly once. If the controller is torn down before delivering,
/// resolves to [`DialogOutcome::cancelled`].
#[must_use = "a dialog handle does nothing unless awaited or polled"]
pub struct DialogHandle<O> {
    rx: oneshot::Receiver<O>,
    done: bool,
}

impl<O> fmt::Debug for DialogHandle<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHandle")
            .field("done", &self.done)
            .finish()
    }
}

impl<O: DialogOutcome> DialogHandle<O> {
    /// Non-blocking check. Returns the outcome once it has been delivered;
    /// `None` while the dialog is still open or after the outcome was taken.
    pub fn try_outcome(&mut self) -> Option<O> {
        if self.done {
            return None;
        }
        let value = match self.rx.try_recv() {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(oneshot::Canceled) => O::cancelled(),
        };
        self.done = true;
        Some(value)
    }

    /// Whether the outcome has been taken from this handle.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<O: DialogOutcome> Future for DialogHandle<O> {
    type Output = O;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<O> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(value)) => {
                self.done = true;
                Poll::Ready(value)
            }
            Poll::Ready(Err(oneshot::Canceled)) => {
                self.done = true;
                Poll::Ready(O::cancelled())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
