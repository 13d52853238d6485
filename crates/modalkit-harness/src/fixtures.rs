#![forbid(unsafe_code)]

//! Reference background page.
//!
//! ```text
//! body
//! ├── section#site-header
//! │   ├── a#home-link[href]
//! │   └── input#search
//! ├── section#main
//! │   ├── p "Quarterly report"
//! │   └── button#delete "Delete"
//! └── section#promo (already aria-hidden by the host)
//! ```

use modalkit_core::{ElementKind, InputKind, NodeFlags, NodeId, Page};

/// A page with a few focusable controls behind any dialog.
#[derive(Debug, Clone)]
pub struct BackgroundPage {
    pub page: Page,
    pub header: NodeId,
    pub home_link: NodeId,
    pub search: NodeId,
    pub main: NodeId,
    pub trigger: NodeId,
    pub promo: NodeId,
}

impl Default for BackgroundPage {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundPage {
    /// Build the page and focus the delete button, the usual dialog opener.
    #[must_use]
    pub fn new() -> Self {
        let page = Page::new();
        let fixture = {
            let mut doc = page.document().borrow_mut();
            let body = doc.body();

            let header = doc.create(ElementKind::Section);
            doc.set_attr(header, "id", "site-header");
            doc.append_child(body, header);
            let home_link = doc.create_with_text(ElementKind::Anchor, "Home");
            doc.set_attr(home_link, "id", "home-link");
            doc.set_attr(home_link, "href", "/");
            doc.append_child(header, home_link);
            let search = doc.create(ElementKind::Input(InputKind::Text));
            doc.set_attr(search, "id", "search");
            doc.append_child(header, search);

            let main = doc.create(ElementKind::Section);
            doc.set_attr(main, "id", "main");
            doc.append_child(body, main);
            let report = doc.create_with_text(ElementKind::Paragraph, "Quarterly report");
            doc.append_child(main, report);
            let trigger = doc.create_with_text(ElementKind::Button, "Delete");
            doc.set_attr(trigger, "id", "delete");
            doc.append_child(main, trigger);

            let promo = doc.create_with_text(ElementKind::Section, "Upgrade now");
            doc.set_attr(promo, "id", "promo");
            doc.set_flags(promo, NodeFlags::ARIA_HIDDEN, true);
            doc.append_child(body, promo);

            doc.focus(trigger);

            Self {
                page: page.clone(),
                header,
                home_link,
                search,
                main,
                trigger,
                promo,
            }
        };
        tracing::trace!("background page ready");
        fixture
    }

    /// The body's children at construction time.
    #[must_use]
    pub fn background_roots(&self) -> [NodeId; 3] {
        [self.header, self.main, self.promo]
    }

    /// Focusable controls outside any dialog.
    #[must_use]
    pub fn background_focusables(&self) -> [NodeId; 3] {
        [self.home_link, self.search, self.trigger]
    }

    /// Detach the trigger, as when the opener re-renders while a dialog is
    /// open.
    pub fn remove_trigger(&self) {
        self.page.document().borrow_mut().remove(self.trigger);
    }
}
