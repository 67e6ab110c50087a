//! Live document tree
//!
//! This models the page the way an injected extension script sees it: one
//! shared tree, mutated by the host page's own code while other code
//! queries it. Design:
//!
//! - Single arena `Vec<Node>` addressed by `NodeId` indices, no `Rc` webs
//! - One `RwLock` around the arena; critical sections stay short and no
//!   lock is ever held across listener invocation
//! - `ElementRef` handles are (document, index) pairs and never own what
//!   they point at; the document is always the authority
//!
//! Nodes are never deallocated, only detached. A detached subtree stays
//! addressable through its handles, which is exactly how element handles
//! behave in a real page.

use crate::error::{DomError, Result};
use crate::node::{Node, NodeId, NodeKind};
use crate::selector::Selector;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Event listener. Invoked with the element the event fired on.
pub type Listener = Arc<dyn Fn(&ElementRef) + Send + Sync>;

const ROOT: NodeId = 0;

#[derive(Default)]
struct Arena {
    nodes: Vec<Node>,
    listeners: AHashMap<NodeId, AHashMap<String, Vec<Listener>>>,
}

impl Arena {
    /// Ids are minted only by `push` and nodes are never removed, so any
    /// id handed out stays in bounds for the arena's lifetime.
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            if let Some(pos) = self.node(parent).children.iter().position(|&c| c == id) {
                self.node_mut(parent).children.remove(pos);
            }
            self.node_mut(id).parent = None;
        }
    }
}

/// Shared handle to one page tree. Cloning is cheap and clones observe the
/// same tree.
#[derive(Clone)]
pub struct Document {
    arena: Arc<RwLock<Arena>>,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        arena.push(Node::document());
        Self {
            arena: Arc::new(RwLock::new(arena)),
        }
    }

    /// Handle to the document node itself.
    pub fn root(&self) -> ElementRef {
        self.handle(ROOT)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementRef {
        let id = self.arena.write().push(Node::element(tag));
        self.handle(id)
    }

    /// Create a detached text node.
    pub fn create_text_node(&self, text: &str) -> ElementRef {
        let id = self.arena.write().push(Node::text(text));
        self.handle(id)
    }

    /// Create a detached verbatim-markup node (inline SVG and the like).
    pub fn create_raw(&self, markup: &str) -> ElementRef {
        let id = self.arena.write().push(Node::raw(markup));
        self.handle(id)
    }

    /// Resolve a node id to a handle. Fails on ids this document never
    /// minted.
    pub fn get(&self, id: NodeId) -> Result<ElementRef> {
        if (id as usize) < self.arena.read().nodes.len() {
            Ok(self.handle(id))
        } else {
            Err(DomError::NodeNotFound(id))
        }
    }

    /// First connected element whose id attribute equals `id`, in document
    /// order. Detached fragments are not considered, matching how lookup
    /// by id behaves in a real page.
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        let arena = self.arena.read();
        let mut stack: Vec<NodeId> = arena.node(ROOT).children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let node = arena.node(current);
            if node.is_element() && node.attr("id") == Some(id) {
                return Some(self.handle(current));
            }
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        None
    }

    /// First descendant of `scope` (or of the whole document) matching the
    /// selector, in document order.
    pub fn query_selector(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
    ) -> Option<ElementRef> {
        self.collect_matches(selector, scope, true).into_iter().next()
    }

    /// All descendants of `scope` (or of the whole document) matching the
    /// selector, in document order. Possibly empty, never an error.
    pub fn query_selector_all(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
    ) -> Vec<ElementRef> {
        self.collect_matches(selector, scope, false)
    }

    fn collect_matches(
        &self,
        selector: &Selector,
        scope: Option<&ElementRef>,
        first_only: bool,
    ) -> Vec<ElementRef> {
        let arena = self.arena.read();
        let start = scope.map(|s| s.id).unwrap_or(ROOT);
        let mut stack: Vec<NodeId> = arena.node(start).children.iter().rev().copied().collect();
        let mut found = Vec::new();

        while let Some(current) = stack.pop() {
            let node = arena.node(current);
            if selector.subject().matches(node) && ancestors_match(&arena, selector, current) {
                found.push(self.handle(current));
                if first_only {
                    break;
                }
            }
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }

        found
    }

    fn handle(&self, id: NodeId) -> ElementRef {
        ElementRef {
            document: self.clone(),
            id,
        }
    }
}

/// Ancestor compounds must match somewhere on the path to the root, in
/// order. Ancestors above the query scope count, like they do for a scoped
/// querySelector in a real page.
fn ancestors_match(arena: &Arena, selector: &Selector, id: NodeId) -> bool {
    let ancestors = selector.ancestors();
    let mut remaining = ancestors.len();
    let mut current = arena.node(id).parent;

    while remaining > 0 {
        match current {
            Some(parent) => {
                let node = arena.node(parent);
                if ancestors[remaining - 1].matches(node) {
                    remaining -= 1;
                }
                current = node.parent;
            }
            None => return false,
        }
    }
    true
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.arena.read().nodes.len())
            .finish()
    }
}

/// Borrowed handle to one node of a document. Cheap to clone; equality is
/// identity (same document, same node).
#[derive(Clone)]
pub struct ElementRef {
    document: Document,
    id: NodeId,
}

impl ElementRef {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn kind(&self) -> NodeKind {
        self.document.arena.read().node(self.id).kind
    }

    /// Lowercased tag name for elements, "#document"/"#text"/"#raw"
    /// otherwise.
    pub fn name(&self) -> String {
        self.document.arena.read().node(self.id).name.clone()
    }

    /// Node value: text content for text nodes, markup for raw nodes.
    pub fn value(&self) -> String {
        self.document.arena.read().node(self.id).value.clone()
    }

    /// Overwrite the node value in place.
    pub fn set_value(&self, value: &str) {
        self.document.arena.write().node_mut(self.id).value = value.to_string();
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.document
            .arena
            .read()
            .node(self.id)
            .attr(name)
            .map(String::from)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.document
            .arena
            .write()
            .node_mut(self.id)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.document
            .arena
            .write()
            .node_mut(self.id)
            .attributes
            .remove(name);
    }

    /// Checkbox state helper: presence of the `checked` attribute.
    pub fn is_checked(&self) -> bool {
        self.attribute("checked").is_some()
    }

    pub fn parent(&self) -> Option<ElementRef> {
        self.document
            .arena
            .read()
            .node(self.id)
            .parent
            .map(|id| self.document.handle(id))
    }

    pub fn children(&self) -> Vec<ElementRef> {
        self.document
            .arena
            .read()
            .node(self.id)
            .children
            .iter()
            .map(|&id| self.document.handle(id))
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.document.arena.read().node(self.id).children.len()
    }

    pub fn first_child(&self) -> Option<ElementRef> {
        self.document
            .arena
            .read()
            .node(self.id)
            .children
            .first()
            .map(|&id| self.document.handle(id))
    }

    /// True while there is a parent chain up to the document node.
    pub fn is_connected(&self) -> bool {
        let arena = self.document.arena.read();
        let mut current = self.id;
        loop {
            if current == ROOT {
                return true;
            }
            match arena.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Append `child` as the last child, detaching it from any previous
    /// parent first (move semantics, like appendChild). Appending a node
    /// into its own subtree or across documents is refused.
    pub fn append_child(&self, child: &ElementRef) {
        if !self.same_document(child) {
            tracing::warn!("refusing to append a node from another document");
            return;
        }
        let mut arena = self.document.arena.write();
        if child.id == self.id || is_ancestor(&arena, child.id, self.id) {
            tracing::warn!("refusing to append a node into its own subtree");
            return;
        }
        arena.unlink(child.id);
        arena.node_mut(child.id).parent = Some(self.id);
        arena.node_mut(self.id).children.push(child.id);
    }

    /// Detach and return the last child, if any.
    pub fn remove_last_child(&self) -> Option<ElementRef> {
        let mut arena = self.document.arena.write();
        let last = arena.node(self.id).children.last().copied()?;
        arena.unlink(last);
        Some(self.document.handle(last))
    }

    /// Detach this node from its parent. No-op on an already detached node.
    pub fn detach(&self) {
        self.document.arena.write().unlink(self.id);
    }

    /// Concatenated text of all descendant text nodes, document order,
    /// trimmed at both ends. Raw markup nodes contribute nothing.
    pub fn text_content(&self) -> String {
        let arena = self.document.arena.read();
        let mut text = String::new();
        let mut stack = vec![self.id];
        while let Some(current) = stack.pop() {
            let node = arena.node(current);
            if node.kind == NodeKind::Text {
                text.push_str(&node.value);
            }
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        text.trim().to_string()
    }

    /// Scoped convenience for [`Document::query_selector`].
    pub fn query_selector(&self, selector: &Selector) -> Option<ElementRef> {
        self.document.query_selector(selector, Some(self))
    }

    /// Scoped convenience for [`Document::query_selector_all`].
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<ElementRef> {
        self.document.query_selector_all(selector, Some(self))
    }

    /// Register a listener for `event` on this node. Listeners fire on the
    /// target only; there is no capture or bubble phase.
    pub fn add_listener(&self, event: &str, listener: impl Fn(&ElementRef) + Send + Sync + 'static) {
        self.document
            .arena
            .write()
            .listeners
            .entry(self.id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// Fire all listeners registered for `event` on this node. The lock is
    /// released before any listener runs, so listeners may freely query
    /// and mutate the tree.
    pub fn dispatch(&self, event: &str) {
        let listeners: Vec<Listener> = {
            let arena = self.document.arena.read();
            arena
                .listeners
                .get(&self.id)
                .and_then(|events| events.get(event))
                .map(|list| list.to_vec())
                .unwrap_or_default()
        };
        tracing::debug!(event, target = self.id, count = listeners.len(), "dispatch");
        for listener in listeners {
            listener(self);
        }
    }

    /// Simulate a user click. Checkbox inputs toggle their `checked`
    /// attribute and fire `change` before `click`, the order an activated
    /// checkbox produces in a real page.
    pub fn click(&self) {
        let toggled = {
            let mut arena = self.document.arena.write();
            let node = arena.node_mut(self.id);
            let is_checkbox =
                node.is_element() && node.name == "input" && node.attr("type") == Some("checkbox");
            if is_checkbox {
                if node.attributes.remove("checked").is_none() {
                    node.attributes
                        .insert("checked".to_string(), "checked".to_string());
                }
                true
            } else {
                false
            }
        };
        if toggled {
            self.dispatch("change");
        }
        self.dispatch("click");
    }

    fn same_document(&self, other: &ElementRef) -> bool {
        Arc::ptr_eq(&self.document.arena, &other.document.arena)
    }
}

fn is_ancestor(arena: &Arena, candidate: NodeId, of: NodeId) -> bool {
    let mut current = arena.node(of).parent;
    while let Some(id) = current {
        if id == candidate {
            return true;
        }
        current = arena.node(id).parent;
    }
    false
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.same_document(other)
    }
}

impl Eq for ElementRef {}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.document.arena.read();
        let node = arena.node(self.id);
        match node.kind {
            NodeKind::Element => {
                write!(f, "<{}", node.name)?;
                if let Some(id) = node.attr("id") {
                    write!(f, " id=\"{id}\"")?;
                }
                write!(f, ">")
            }
            _ => f.write_str(&node.name),
        }
    }
}
