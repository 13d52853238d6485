#![forbid(unsafe_code)]

//! Accessibility vocabulary for modalkit.
//!
//! - [`DialogIds`]: unique element ids for one dialog invocation, used to
//!   associate the title and body with the dialog region.
//! - [`Role`] and the [`aria`] attribute names.
//! - [`apply_dialog_semantics`]: writes modal dialog semantics onto a panel.
//! - [`accessible_name`] / [`accessible_description`]: what assistive
//!   technology would announce for a node.

pub mod ids;
pub mod name;
pub mod semantics;

pub use ids::DialogIds;
pub use name::{accessible_description, accessible_name};
pub use semantics::{AccessibleLabels, Role, apply_dialog_semantics, aria};
