#![forbid(unsafe_code)]

//! In-memory element tree with focus tracking.
//!
//! [`Document`] is an arena of nodes addressed by [`NodeId`]. It models the
//! small part of a browser DOM that an accessible modal needs: tree
//! structure in document order, a single active (focused) element, boolean
//! flags (hidden, disabled, masked, inert), attributes, classes, inline style
//! properties, and text.
//!
//! # Invariants
//!
//! - `body()` always exists and is always connected.
//! - A node is *connected* iff its parent chain reaches `body`.
//! - `active_element()` is either `None` (focus on body) or a connected,
//!   focusable node. Detaching, hiding, disabling, or making inert a subtree
//!   that contains the active element blurs it.
//! - `descendants()` returns nodes in document (pre-)order.
//! - `len()` counts live nodes only. [`Document::destroy`] frees a subtree's
//!   slots for reuse; each reuse bumps the slot generation, so an id held
//!   across a destroy never aliases the node that replaces it.
//!
//! # Failure Modes
//!
//! - A `NodeId` minted by another document, or one whose node was
//!   destroyed, is treated as absent: getters return `None`/empty, setters
//!   are no-ops. Nothing panics.
//! - `append_child` refuses to create a cycle (appending an ancestor under
//!   its own descendant is ignored).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use bitflags::bitflags;

/// Shared single-threaded handle to a document.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Global counter for document identities.
static DOCUMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Document`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        Self(DOCUMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Get the raw arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// How many times the slot was reused before this node took it.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// `<input type=..>` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputKind {
    #[default]
    Text,
    Password,
    Email,
    Number,
    Checkbox,
    Radio,
    Submit,
    Button,
    Hidden,
}

/// Element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Div,
    Section,
    Heading,
    Paragraph,
    Span,
    Button,
    Input(InputKind),
    TextArea,
    Select,
    Anchor,
    Summary,
    Custom(&'static str),
}

impl ElementKind {
    /// Natively focusable kinds, before flags and attributes are considered.
    ///
    /// Anchors are focusable only with an `href`; see
    /// [`Document::is_focusable`].
    #[must_use]
    pub fn is_natively_focusable(self) -> bool {
        matches!(
            self,
            Self::Button | Self::TextArea | Self::Select | Self::Summary
        ) || matches!(self, Self::Input(kind) if kind != InputKind::Hidden)
    }

    /// Kinds that perform their own action on Enter.
    #[must_use]
    pub fn is_activatable(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Anchor
                | Self::Summary
                | Self::Select
                | Self::Input(InputKind::Submit | InputKind::Button)
        )
    }

    /// Tag-like name used in snapshots and logs.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Section => "section",
            Self::Heading => "h2",
            Self::Paragraph => "p",
            Self::Span => "span",
            Self::Button => "button",
            Self::Input(_) => "input",
            Self::TextArea => "textarea",
            Self::Select => "select",
            Self::Anchor => "a",
            Self::Summary => "summary",
            Self::Custom(name) => name,
        }
    }
}

bitflags! {
    /// Boolean node state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u16 {
        /// Not rendered (`display: none` / `hidden`). Applies to the subtree.
        const HIDDEN           = 1 << 0;
        /// Disabled form control.
        const DISABLED         = 1 << 1;
        /// Masked from assistive technology (`aria-hidden`). Applies to the subtree.
        const ARIA_HIDDEN      = 1 << 2;
        /// Not interactive (`inert`). Applies to the subtree.
        const INERT            = 1 << 3;
        /// Editable content region.
        const CONTENT_EDITABLE = 1 << 4;
        /// The element handles Enter itself; Enter must pass through to it.
        const OWNS_ENTER       = 1 << 5;
    }
}

/// Flags whose application can make the active element unfocusable.
const BLURRING_FLAGS: NodeFlags = NodeFlags::HIDDEN
    .union(NodeFlags::DISABLED)
    .union(NodeFlags::INERT);

#[derive(Debug, Clone)]
struct Node {
    kind: ElementKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: NodeFlags,
    tab_index: Option<i32>,
    attrs: AHashMap<String, String>,
    classes: Vec<String>,
    style: AHashMap<String, String>,
    text: String,
}

impl Node {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            flags: NodeFlags::empty(),
            tab_index: None,
            attrs: AHashMap::new(),
            classes: Vec::new(),
            style: AHashMap::new(),
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// An element tree rooted at `body`.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only `body`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(ElementKind::Custom("body"))),
            }],
            free: Vec::new(),
            live: 1,
            body: NodeId {
                index: 0,
                generation: 0,
            },
            active: None,
        }
    }

    /// Create a shared handle around a fresh document.
    #[must_use]
    pub fn shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Identity of this document.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The root node.
    #[inline]
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of live nodes, attached or detached, including `body`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether only `body` exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 1
    }

    /// Number of arena slots allocated so far, live or free.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    // --- Tree Structure ---

    /// Create a detached element, reusing a freed slot when one exists.
    pub fn create(&mut self, kind: ElementKind) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.node = Some(Node::new(kind));
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(kind)),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Create a detached element with text content.
    pub fn create_with_text(&mut self, kind: ElementKind, text: impl Into<String>) -> NodeId {
        let id = self.create(kind);
        self.set_text(id, text);
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() || child == self.body {
            return;
        }
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Detach `node` (and its subtree) from the tree.
    ///
    /// If the active element was inside the subtree, focus moves to body.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(active) = self.active
            && self.contains(node, active)
        {
            self.active = None;
        }
        self.detach(node);
    }

    /// Detach `node` and free it together with its whole subtree. Returns
    /// the number of nodes freed.
    ///
    /// Ids into the destroyed subtree read as absent from then on, even
    /// after their slots are reused.
    pub fn destroy(&mut self, node: NodeId) -> usize {
        if node == self.body || self.node(node).is_none() {
            return 0;
        }
        self.remove(node);
        let doomed: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .collect();
        // Reversed so the next allocations reuse slots in their old order.
        for id in doomed.iter().rev() {
            if let Some(slot) = self.slots.get_mut(id.index()) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
        self.live -= doomed.len();
        tracing::trace!(
            root = node.index(),
            freed = doomed.len(),
            live = self.live,
            "subtree destroyed"
        );
        doomed.len()
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
        }
    }

    /// Parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether `node` is attached under `body`.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some() && self.contains(self.body, node)
    }

    /// All descendants of `root` (excluding `root`) in document order.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Kind of `node`.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<ElementKind> {
        self.node(node).map(|n| n.kind)
    }

    // --- Flags ---

    /// Flags set directly on `node`.
    #[must_use]
    pub fn flags(&self, node: NodeId) -> NodeFlags {
        self.node(node).map_or(NodeFlags::empty(), |n| n.flags)
    }

    /// Whether `node` itself carries all of `flags`.
    #[must_use]
    pub fn has_flags(&self, node: NodeId, flags: NodeFlags) -> bool {
        self.flags(node).contains(flags)
    }

    /// Set or clear `flags` on `node`.
    pub fn set_flags(&mut self, node: NodeId, flags: NodeFlags, on: bool) {
        let Some(n) = self.node_mut(node) else {
            return;
        };
        n.flags.set(flags, on);
        if on
            && flags.intersects(BLURRING_FLAGS)
            && let Some(active) = self.active
            && self.contains(node, active)
        {
            tracing::trace!(node = node.index(), "active element blurred by flag change");
            self.active = None;
        }
    }

    /// Whether `node` or any ancestor carries any of `flags`.
    #[must_use]
    pub fn has_flags_in_ancestry(&self, node: NodeId, flags: NodeFlags) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.flags(current).intersects(flags) {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Connected and not hidden by itself or an ancestor.
    #[must_use]
    pub fn is_rendered(&self, node: NodeId) -> bool {
        self.is_connected(node) && !self.has_flags_in_ancestry(node, NodeFlags::HIDDEN)
    }

    // --- Attributes, Classes, Styles, Text ---

    /// Set an attribute.
    pub fn set_attr(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.attrs.insert(name.into(), value.into());
        }
    }

    /// Get an attribute.
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.node_mut(node).and_then(|n| n.attrs.remove(name))
    }

    /// Add a class (no duplicates). Whitespace-separated lists are split.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            for name in class.split_whitespace() {
                if !n.classes.iter().any(|c| c == name) {
                    n.classes.push(name.to_owned());
                }
            }
        }
    }

    /// Remove a class.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Whether `node` carries `class`.
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Classes in insertion order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.node(node).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    /// Set an inline style property, returning the previous value.
    pub fn set_style(
        &mut self,
        node: NodeId,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.node_mut(node)
            .and_then(|n| n.style.insert(property.into(), value.into()))
    }

    /// Get an inline style property.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)
            .and_then(|n| n.style.get(property))
            .map(String::as_str)
    }

    /// Remove an inline style property, returning its value.
    pub fn remove_style(&mut self, node: NodeId, property: &str) -> Option<String> {
        self.node_mut(node).and_then(|n| n.style.remove(property))
    }

    /// Replace the node's own text.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.text = text.into();
        }
    }

    /// The node's own text (not including descendants).
    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        self.node(node).map_or("", |n| n.text.as_str())
    }

    /// Own text followed by descendants' text, space separated.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        std::iter::once(node)
            .chain(self.descendants(node))
            .map(|id| self.text(id))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First connected node whose `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.live_ids()
            .find(|&n| self.attr(n, "id") == Some(id) && self.is_connected(n))
    }

    // --- Focus ---

    /// Set the tab index (`None` = attribute absent).
    pub fn set_tab_index(&mut self, node: NodeId, tab_index: Option<i32>) {
        if let Some(n) = self.node_mut(node) {
            n.tab_index = tab_index;
        }
    }

    /// The explicit tab index, if any.
    #[must_use]
    pub fn tab_index(&self, node: NodeId) -> Option<i32> {
        self.node(node).and_then(|n| n.tab_index)
    }

    /// Whether `node` can receive focus programmatically.
    ///
    /// Requires the node to be rendered, enabled, not inert, and either
    /// natively focusable, an anchor with `href`, content-editable, or
    /// carrying an explicit tab index.
    #[must_use]
    pub fn is_focusable(&self, node: NodeId) -> bool {
        let Some(n) = self.node(node) else {
            return false;
        };
        if !self.is_rendered(node)
            || n.flags.contains(NodeFlags::DISABLED)
            || self.has_flags_in_ancestry(node, NodeFlags::INERT)
        {
            return false;
        }
        n.kind.is_natively_focusable()
            || (n.kind == ElementKind::Anchor && n.attrs.contains_key("href"))
            || n.flags.contains(NodeFlags::CONTENT_EDITABLE)
            || n.tab_index.is_some()
    }

    /// Move focus to `node`. Returns `false` (and leaves focus untouched)
    /// when the node cannot be focused.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_focusable(node) {
            return false;
        }
        self.active = Some(node);
        true
    }

    /// Move focus to body.
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// The focused element; `None` means body.
    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.active.filter(|&n| self.is_focusable(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let section = doc.create(ElementKind::Section);
        let a = doc.create(ElementKind::Button);
        let b = doc.create(ElementKind::Input(InputKind::Text));
        doc.append_child(doc.body(), section);
        doc.append_child(section, a);
        doc.append_child(section, b);
        (doc, section, a, b)
    }

    #[test]
    fn descendants_in_document_order() {
        let (mut doc, section, a, b) = tree();
        let nested = doc.create(ElementKind::Span);
        doc.append_child(a, nested);
        assert_eq!(doc.descendants(section), vec![a, nested, b]);
        assert_eq!(doc.descendants(doc.body()), vec![section, a, nested, b]);
    }

    #[test]
    fn append_refuses_cycles() {
        let (mut doc, section, a, _) = tree();
        doc.append_child(a, section);
        assert_eq!(doc.parent(section), Some(doc.body()));
        assert!(doc.is_connected(a));
    }

    #[test]
    fn remove_blurs_focus_inside_subtree() {
        let (mut doc, section, a, _) = tree();
        assert!(doc.focus(a));
        assert_eq!(doc.active_element(), Some(a));
        doc.remove(section);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.is_connected(a));
    }

    #[test]
    fn hidden_ancestor_blurs_and_blocks_focus() {
        let (mut doc, section, a, b) = tree();
        assert!(doc.focus(b));
        doc.set_flags(section, NodeFlags::HIDDEN, true);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.focus(a));
        doc.set_flags(section, NodeFlags::HIDDEN, false);
        assert!(doc.focus(a));
    }

    #[test]
    fn anchors_need_href() {
        let mut doc = Document::new();
        let link = doc.create(ElementKind::Anchor);
        doc.append_child(doc.body(), link);
        assert!(!doc.is_focusable(link));
        doc.set_attr(link, "href", "#top");
        assert!(doc.is_focusable(link));
    }

    #[test]
    fn tab_index_makes_plain_elements_focusable() {
        let mut doc = Document::new();
        let div = doc.create(ElementKind::Div);
        doc.append_child(doc.body(), div);
        assert!(!doc.focus(div));
        doc.set_tab_index(div, Some(-1));
        assert!(doc.focus(div));
    }

    #[test]
    fn foreign_ids_are_ignored() {
        let mut small = Document::new();
        let mut big = Document::new();
        let mut last = big.body();
        for _ in 0..5 {
            last = big.create(ElementKind::Div);
        }
        small.set_attr(last, "id", "x");
        assert_eq!(small.attr(last, "id"), None);
        assert!(!small.focus(last));
        assert!(small.children(last).is_empty());
    }

    #[test]
    fn element_by_id_skips_detached_nodes() {
        let mut doc = Document::new();
        let detached = doc.create(ElementKind::Div);
        doc.set_attr(detached, "id", "dup");
        assert_eq!(doc.element_by_id("dup"), None);
        let attached = doc.create(ElementKind::Div);
        doc.set_attr(attached, "id", "dup");
        doc.append_child(doc.body(), attached);
        assert_eq!(doc.element_by_id("dup"), Some(attached));
    }

    #[test]
    fn destroy_frees_subtree_and_stales_ids() {
        let (mut doc, section, a, b) = tree();
        assert_eq!(doc.len(), 4);
        assert!(doc.focus(a));

        assert_eq!(doc.destroy(section), 3);
        assert!(doc.is_empty());
        assert_eq!(doc.active_element(), None);
        assert_eq!(doc.kind(b), None);
        assert!(doc.children(doc.body()).is_empty());

        let fresh = doc.create(ElementKind::Div);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.capacity(), 4);
        assert_eq!(fresh.index(), section.index());
        assert_eq!(fresh.generation(), 1);
        assert!([section, a, b].iter().all(|&old| old != fresh));
        doc.set_attr(a, "id", "stale");
        doc.set_attr(b, "id", "stale");
        doc.set_attr(section, "id", "stale");
        assert_eq!(doc.attr(fresh, "id"), None);
        assert_eq!(doc.destroy(a), 0);
        assert_eq!(doc.kind(fresh), Some(ElementKind::Div));
    }

    #[test]
    fn body_cannot_be_destroyed() {
        let (mut doc, _, _, _) = tree();
        assert_eq!(doc.destroy(doc.body()), 0);
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn repeated_mount_cycles_reuse_slots() {
        let mut doc = Document::new();
        for _ in 0..1000 {
            let root = doc.create(ElementKind::Div);
            let button = doc.create(ElementKind::Button);
            doc.append_child(root, button);
            doc.append_child(doc.body(), root);
            assert!(doc.focus(button));
            doc.destroy(root);
        }
        assert!(doc.is_empty());
        assert_eq!(doc.capacity(), 3);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        Append(usize, usize),
        Destroy(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Create),
            (0usize..16, 0usize..16).prop_map(|(p, c)| Op::Append(p, c)),
            (0usize..16).prop_map(Op::Destroy),
        ]
    }

    proptest! {
        #[test]
        fn live_count_tracks_reachable_nodes(ops in proptest::collection::vec(op(), 1..64)) {
            let mut doc = Document::new();
            let mut made = vec![doc.body()];
            for op in ops {
                match op {
                    Op::Create => made.push(doc.create(ElementKind::Div)),
                    Op::Append(p, c) => {
                        let (p, c) = (made[p % made.len()], made[c % made.len()]);
                        doc.append_child(p, c);
                    }
                    Op::Destroy(n) => {
                        doc.destroy(made[n % made.len()]);
                    }
                }
            }
            let live = made.iter().filter(|&&id| doc.kind(id).is_some()).count();
            prop_assert_eq!(doc.len(), live);
            prop_assert!(doc.capacity() >= doc.len());
            for id in doc.descendants(doc.body()) {
                prop_assert!(doc.kind(id).is_some());
            }
        }
    }

    #[test]
    fn classes_split_and_dedupe() {
        let mut doc = Document::new();
        let div = doc.create(ElementKind::Div);
        doc.add_class(div, "a b");
        doc.add_class(div, "b c");
        assert_eq!(doc.classes(div), ["a", "b", "c"]);
        doc.remove_class(div, "b");
        assert!(!doc.has_class(div, "b"));
    }

    #[test]
    fn text_content_joins_descendants() {
        let mut doc = Document::new();
        let p = doc.create_with_text(ElementKind::Paragraph, "Hello");
        let s = doc.create_with_text(ElementKind::Span, "world");
        doc.append_child(p, s);
        assert_eq!(doc.text_content(p), "Hello world");
    }
}
