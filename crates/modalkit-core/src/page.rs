#![forbid(unsafe_code)]

//! The bundle a host hands to widgets: document, scheduler, and event hub.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{Document, SharedDocument};
use crate::event::{Event, EventDisposition};
use crate::hub::EventHub;
use crate::scheduler::Scheduler;

/// A single page: one document, one task queue, one listener registry.
///
/// `Page` is cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Page {
    document: SharedDocument,
    scheduler: Scheduler,
    events: EventHub,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A page with an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// A page around an existing document.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self::from_parts(
            Rc::new(RefCell::new(document)),
            Scheduler::new(),
            EventHub::new(),
        )
    }

    /// Assemble a page from shared parts.
    #[must_use]
    pub fn from_parts(document: SharedDocument, scheduler: Scheduler, events: EventHub) -> Self {
        Self {
            document,
            scheduler,
            events,
        }
    }

    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Route an input event through the page's listeners.
    pub fn dispatch(&self, event: impl Into<Event>) -> EventDisposition {
        let event = event.into();
        let disposition = self.events.dispatch(&event);
        tracing::trace!(?event, ?disposition, "page dispatch");
        disposition
    }

    /// Run everything due now.
    pub fn tick(&self) -> usize {
        self.scheduler.tick()
    }

    /// Move the clock forward, running due tasks.
    pub fn advance(&self, delta: Duration) -> usize {
        self.scheduler.advance(delta)
    }
}
