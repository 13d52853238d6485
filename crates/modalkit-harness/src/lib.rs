#![forbid(unsafe_code)]

//! Test harness and reference fixtures for modalkit.
//!
//! - [`fixtures`]: a populated background page to open dialogs over.
//! - [`input`]: key, click, and clock helpers.
//! - [`exec`]: awaiting dialog handles on a local executor.
//! - [`snapshot`]: text outlines and page-state fingerprints.
//! - [`strategies`]: proptest strategies for input sequences.

pub mod exec;
pub mod fixtures;
pub mod input;
pub mod snapshot;
pub mod strategies;

pub use exec::{Awaiter, Watched};
pub use fixtures::BackgroundPage;
pub use input::{
    action_button, active, back_tab, click, enter, escape, find_by_text, press, settle, show, tab,
};
pub use snapshot::{Fingerprint, fingerprint, outline, page_state};
