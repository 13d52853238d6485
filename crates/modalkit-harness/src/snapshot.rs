#![forbid(unsafe_code)]

//! Text snapshots of the page.
//!
//! [`outline`] renders a subtree for readable assertions. [`page_state`]
//! serializes everything a dialog may touch (tree shape, flags, classes,
//! the attributes and styles the modal subsystem writes, the focused
//! element) so "the page is exactly as before" can be asserted with one
//! comparison; [`fingerprint`] hashes it for compact logging.

use std::fmt::{self, Write as _};

use modalkit_core::{Document, NodeId, Page};
use modalkit_widgets::modal::render;

const TRACKED_ATTRS: &[&str] = &[
    "id",
    "role",
    "aria-modal",
    "aria-hidden",
    "aria-label",
    "aria-labelledby",
    "aria-describedby",
    "data-state",
];
const TRACKED_STYLES: &[&str] = &["overflow", "z-index", "transition-duration"];

/// Indented outline of `node`'s subtree.
#[must_use]
pub fn outline(page: &Page, node: NodeId) -> String {
    render::outline(&page.document().borrow(), node)
}

/// Serialized page state reachable from body.
#[must_use]
pub fn page_state(doc: &Document) -> String {
    let mut out = String::new();
    write_node(doc, doc.body(), 0, &mut out);
    let _ = writeln!(
        out,
        "active={}",
        doc.active_element()
            .map_or_else(|| "body".to_owned(), |n| n.index().to_string())
    );
    out
}

fn write_node(doc: &Document, node: NodeId, depth: usize, out: &mut String) {
    let Some(kind) = doc.kind(node) else {
        return;
    };
    let _ = write!(
        out,
        "{:indent$}{}#{} flags={:#04x}",
        "",
        kind.tag(),
        node.index(),
        doc.flags(node).bits(),
        indent = depth * 2
    );
    if let Some(tab_index) = doc.tab_index(node) {
        let _ = write!(out, " tabindex={tab_index}");
    }
    let classes = doc.classes(node);
    if !classes.is_empty() {
        let _ = write!(out, " class={:?}", classes.join(" "));
    }
    for name in TRACKED_ATTRS {
        if let Some(value) = doc.attr(node, name) {
            let _ = write!(out, " {name}={value:?}");
        }
    }
    for property in TRACKED_STYLES {
        if let Some(value) = doc.style(node, property) {
            let _ = write!(out, " style:{property}={value:?}");
        }
    }
    out.push('\n');
    for &child in doc.children(node) {
        write_node(doc, child, depth + 1, out);
    }
}

/// BLAKE3 digest of [`page_state`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[must_use]
pub fn fingerprint(doc: &Document) -> Fingerprint {
    Fingerprint(*blake3::hash(page_state(doc).as_bytes()).as_bytes())
}
