#![forbid(unsafe_code)]

//! Localization for modalkit.
//!
//! - [`catalog`]: string catalog with locale fallback and `{name}`
//!   interpolation.
//! - [`locale`]: locale context with scoped overrides and system locale
//!   detection.
//! - [`modal`]: built-in dialog labels.

pub mod catalog;
pub mod locale;
pub mod modal;

pub use catalog::{I18nError, Locale, LocaleStrings, StringCatalog};
pub use locale::{LocaleContext, LocaleOverride, current_locale, detect_system_locale, set_locale};
pub use modal::{keys, modal_catalog, modal_text, modal_text_in};
