#![forbid(unsafe_code)]

//! Widgets for modalkit.

pub mod modal;

pub use modal::{
    ConfirmDialog, ConfirmOptions, DialogError, DialogHandle, FormDialog, FormHandle, FormOptions,
    ModalConfig, ModalController, Phase,
};
