#![forbid(unsafe_code)]

//! Headless page model for modalkit.
//!
//! This crate provides the substrate the modal subsystem runs on:
//!
//! - [`dom::Document`]: an in-memory element tree with focus, flags,
//!   attributes, classes, and inline styles.
//! - [`event`]: keyboard and pointer input events.
//! - [`hub::EventHub`]: listener registry with RAII [`hub::Subscription`]s.
//! - [`scheduler::Scheduler`]: single-threaded task queue on a virtual clock
//!   (deferred callbacks and timers).
//! - [`page::Page`]: the bundle of the three that a host hands to widgets.
//!
//! Everything is single-threaded (`Rc<RefCell<..>>`). There are no worker
//! threads; "waiting" is expressed through scheduled callbacks and futures.

pub mod dom;
pub mod event;
pub mod hub;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod page;
pub mod scheduler;

pub use dom::{Document, DocumentId, ElementKind, InputKind, NodeFlags, NodeId, SharedDocument};
pub use event::{
    Event, EventDisposition, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
pub use hub::{EventHub, Subscription};
pub use page::Page;
pub use scheduler::{Scheduler, TaskId};
