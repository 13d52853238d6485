#![forbid(unsafe_code)]

//! Event listener registry.
//!
//! [`EventHub`] holds the listeners that the host's input events are routed
//! through. Registration returns a [`Subscription`] guard; dropping the guard
//! removes the listener, so a component that owns its subscription can never
//! leave a stale handler behind.
//!
//! # Invariants
//!
//! 1. Listeners are dispatched newest-first (the most recently opened
//!    overlay sees input before anything underneath it).
//! 2. Dispatch stops at the first listener that returns
//!    [`EventDisposition::Consumed`].
//! 3. A listener unregistered during a dispatch (by an earlier listener) is
//!    not invoked for the remainder of that dispatch.
//! 4. No internal borrow is held while a listener runs, so listeners may
//!    subscribe, unsubscribe, or dispatch re-entrantly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{Event, EventDisposition};

type Listener = Rc<dyn Fn(&Event) -> EventDisposition>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Listener registry for input events.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Rc<RefCell<HubInner>>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered while the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Event) -> EventDisposition + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        Subscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Route `event` through the listeners, newest first.
    pub fn dispatch(&self, event: &Event) -> EventDisposition {
        let snapshot: Vec<(u64, Listener)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .rev()
            .cloned()
            .collect();

        for (id, listener) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            if listener(event).is_consumed() {
                return EventDisposition::Consumed;
            }
        }
        EventDisposition::Ignored
    }

    fn is_registered(&self, id: u64) -> bool {
        self.inner.borrow().listeners.iter().any(|(l, _)| *l == id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// RAII guard for a registered listener.
#[must_use = "dropping a subscription unregisters the listener"]
pub struct Subscription {
    hub: Weak<RefCell<HubInner>>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Whether the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.borrow().listeners.iter().any(|(l, _)| *l == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().listeners.retain(|(l, _)| *l != self.id);
        }
    }
}
