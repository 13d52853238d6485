#![forbid(unsafe_code)]

//! Built-in labels for the modal subsystem.
//!
//! [`modal_catalog`] ships `en`, `zh-TW`, and `zh-CN` with `en` as the final
//! fallback. [`modal_text`] resolves a key against the thread's current
//! locale.

use crate::catalog::{LocaleStrings, StringCatalog};
use crate::locale::current_locale;

/// Catalog keys.
pub mod keys {
    pub const CONFIRM_TITLE: &str = "modal.confirm.title";
    pub const CONFIRM_MESSAGE: &str = "modal.confirm.message";
    pub const ACTION_CONFIRM: &str = "modal.action.confirm";
    pub const ACTION_CANCEL: &str = "modal.action.cancel";
    pub const ACTION_CLOSE: &str = "modal.action.close";
    pub const FORM_TITLE: &str = "modal.form.title";
}

const EN: &[(&str, &str)] = &[
    (keys::CONFIRM_TITLE, "Confirm"),
    (keys::CONFIRM_MESSAGE, "Are you sure you want to continue?"),
    (keys::ACTION_CONFIRM, "Confirm"),
    (keys::ACTION_CANCEL, "Cancel"),
    (keys::ACTION_CLOSE, "Close"),
    (keys::FORM_TITLE, "Edit"),
];

const ZH_TW: &[(&str, &str)] = &[
    (keys::CONFIRM_TITLE, "確認"),
    (keys::CONFIRM_MESSAGE, "確定要繼續嗎？"),
    (keys::ACTION_CONFIRM, "確定"),
    (keys::ACTION_CANCEL, "取消"),
    (keys::ACTION_CLOSE, "關閉"),
    (keys::FORM_TITLE, "編輯"),
];

const ZH_CN: &[(&str, &str)] = &[
    (keys::CONFIRM_TITLE, "确认"),
    (keys::CONFIRM_MESSAGE, "确定要继续吗？"),
    (keys::ACTION_CONFIRM, "确定"),
    (keys::ACTION_CANCEL, "取消"),
    (keys::ACTION_CLOSE, "关闭"),
    (keys::FORM_TITLE, "编辑"),
];

thread_local! {
    static MODAL_CATALOG: StringCatalog = modal_catalog();
}

/// The built-in modal label catalog.
#[must_use]
pub fn modal_catalog() -> StringCatalog {
    let mut catalog = StringCatalog::new();
    for (locale, table) in [("en", EN), ("zh-TW", ZH_TW), ("zh-CN", ZH_CN)] {
        let mut strings = LocaleStrings::new();
        for &(key, value) in table {
            strings.insert(key, value);
        }
        catalog.add_locale(locale, strings);
    }
    catalog.set_fallback_chain(vec!["en".into()]);
    catalog
}

/// Resolve `key` in the current locale. Unknown keys resolve to themselves.
#[must_use]
pub fn modal_text(key: &str) -> String {
    modal_text_in(&current_locale(), key)
}

/// Resolve `key` in an explicit locale.
#[must_use]
pub fn modal_text_in(locale: &str, key: &str) -> String {
    MODAL_CATALOG.with(|catalog| catalog.get(locale, key).unwrap_or(key).to_owned())
}
