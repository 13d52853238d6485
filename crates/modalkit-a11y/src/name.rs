#![forbid(unsafe_code)]

//! Accessible name and description computation.
//!
//! A reduced form of the accname algorithm, enough for dialog panels and
//! their controls:
//!
//! 1. `aria-label` (non-blank) wins.
//! 2. Otherwise `aria-labelledby`: a whitespace-separated id list; the text
//!    content of each connected referenced element, joined by spaces.
//!    References are not followed recursively.
//! 3. Otherwise the node's own text content.

use ahash::AHashSet;
use modalkit_core::{Document, NodeId};

use crate::semantics::aria;

/// The name assistive technology would announce for `node`.
#[must_use]
pub fn accessible_name(doc: &Document, node: NodeId) -> String {
    if let Some(label) = doc.attr(node, aria::LABEL)
        && !label.trim().is_empty()
    {
        return label.trim().to_owned();
    }
    if let Some(list) = doc.attr(node, aria::LABELLED_BY) {
        let joined = resolve_id_list(doc, list);
        if !joined.is_empty() {
            return joined;
        }
    }
    doc.text_content(node).trim().to_owned()
}

/// The description announced after the name; empty when none is wired.
#[must_use]
pub fn accessible_description(doc: &Document, node: NodeId) -> String {
    doc.attr(node, aria::DESCRIBED_BY)
        .map(|list| resolve_id_list(doc, list))
        .unwrap_or_default()
}

fn resolve_id_list(doc: &Document, list: &str) -> String {
    let mut seen = AHashSet::new();
    list.split_whitespace()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| doc.element_by_id(id))
        .map(|target| doc.text_content(target))
        .filter(|text| !text.trim().is_empty())
        .map(|text| text.trim().to_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
