//! The node arena.
//!
//! [`NodeTree`] owns every node of an archive. Parent and child links are
//! [`NodeId`] handles into the arena, so there are no owning back-pointers and
//! nothing to free twice: dropping the tree drops every node at once.
//!
//! # Invariants
//!
//! - The root is created with the tree and is never detached.
//! - A node has at most one parent, and it is registered in that parent's
//!   child map under its own tag.
//! - Sibling tags are unique; attaching a second node under an existing tag
//!   displaces the first (last write wins). Displaced nodes stay in the arena
//!   but are unreachable.
//! - Document children of a loaded node become nodes on first access, and
//!   always before anything else is attached under that node.

use tracing::trace;

use crate::document::{Document, Record};
use crate::element::Element;
use crate::node::{type_matches, Node, NodeId, TreeNode};

/// Arena-backed archive tree.
#[derive(Clone, Debug)]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Loaded document backing unmaterialized nodes.
    document: Option<Document>,
}

impl NodeTree {
    /// Create a tree holding only an empty root with the given tag.
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_tag)],
            root: NodeId(0),
            document: None,
        }
    }

    /// Create a tree from a loaded document.
    ///
    /// Only the root is materialized up front; deeper records become nodes
    /// when a lookup first reaches their parent.
    pub fn from_document(mut document: Document) -> Self {
        let root = Node::from_record(document.take(0), 0);
        Self {
            nodes: vec![root],
            root: NodeId(0),
            document: Some(document),
        }
    }

    /// Create a tree from a nested element.
    pub fn from_element(root: Element) -> Self {
        Self::from_document(Document::from_element(root))
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes allocated in the arena, reachable or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` was issued by this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Borrow a node, or `None` for a foreign handle.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(node) => node,
            None => panic!("dangling node handle {id}"),
        }
    }

    /// Mutably borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(node) => node,
            None => panic!("dangling node handle {id}"),
        }
    }

    /// Parent of `id`, `None` for the root or a detached node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    /// Find the child of `parent` keyed by `key` whose type satisfies
    /// `requested` (see [`type_matches`]).
    pub fn child(&mut self, parent: NodeId, key: &str, requested: &str) -> Option<NodeId> {
        let id = self.child_by_tag(parent, key)?;
        let matched = type_matches(self.node(id).type_name(), requested);
        trace!(parent = %parent, key, requested, matched, "child lookup");
        matched.then_some(id)
    }

    /// The child of `parent` keyed by `key`, whatever its type.
    pub fn child_by_tag(&mut self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.materialize(parent);
        self.node(parent).children.get(key).copied()
    }

    /// All children of `parent` in tag order.
    pub fn children_of(&mut self, parent: NodeId) -> Vec<(String, NodeId)> {
        self.materialize(parent);
        self.node(parent)
            .children()
            .map(|(tag, id)| (tag.to_string(), id))
            .collect()
    }

    /// Create a new, untyped child of `parent` tagged `key`.
    ///
    /// The caller is expected to set the `type` attribute.
    pub fn add_child(&mut self, parent: NodeId, key: &str) -> NodeId {
        let id = self.alloc(Node::new(key));
        self.set_parent(id, Some(parent));
        trace!(parent = %parent, child = %id, key, "child added");
        id
    }

    /// Strip a node back to its tag: attributes, text and children are
    /// dropped. Former children become detached.
    pub fn clear_node(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        let children = std::mem::take(&mut node.children);
        node.attributes.clear();
        node.value.clear();
        node.pending = None;
        for child in children.into_values() {
            self.node_mut(child).parent = None;
        }
        trace!(node = %id, "node cleared");
    }

    /// Move `id` under `parent` (or detach it with `None`).
    ///
    /// The parent's loaded children are materialized first. The node is then
    /// registered in the new parent's child map under its tag, displacing any
    /// sibling already registered there.
    ///
    /// # Panics
    ///
    /// Panics when attaching would create a cycle or when trying to give the
    /// root a parent.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(parent) = parent {
            assert!(id != self.root, "the root node cannot be re-parented");
            // A childless node can only form a cycle with itself.
            let cycle = if self.node(id).children.is_empty() {
                id == parent
            } else {
                self.is_ancestor_or_self(id, parent)
            };
            assert!(!cycle, "attaching {id} under {parent} would create a cycle");
            self.materialize(parent);
        }

        let tag = self.node(id).tag.clone();
        if let Some(old) = self.node(id).parent {
            let siblings = &mut self.node_mut(old).children;
            if siblings.get(&tag) == Some(&id) {
                siblings.remove(&tag);
            }
        }

        self.node_mut(id).parent = parent;
        if let Some(parent) = parent {
            if let Some(displaced) = self.node_mut(parent).children.insert(tag, id) {
                if displaced != id {
                    self.node_mut(displaced).parent = None;
                }
            }
        }
    }

    /// Slash-separated tag path from the root to `id`, e.g. `/archive/rect/size`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            segments.push(self.node(node).tag_name());
            current = self.parent(node);
        }
        segments.reverse();
        let mut path = String::new();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    /// Export the reachable tree as pre-order records.
    ///
    /// Unmaterialized subtrees are copied from the loaded document as is.
    pub fn to_records(&self) -> Vec<Record> {
        let mut records = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            let mut record = Record {
                tag: node.tag.clone(),
                attributes: node.attributes.clone(),
                text: node.value.clone(),
                children: node.children.len() as u64,
            };
            match (node.pending, &self.document) {
                (Some(index), Some(document)) => {
                    record.children = document.records()[index].children;
                    records.push(record);
                    records.extend_from_slice(document.descendants(index));
                }
                _ => {
                    records.push(record);
                    stack.extend(node.children.values().rev().copied());
                }
            }
        }
        records
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Turn the pending document children of `id` into nodes.
    fn materialize(&mut self, id: NodeId) {
        let Some(index) = self.node(id).pending else {
            return;
        };
        self.node_mut(id).pending = None;
        let Some(document) = self.document.as_mut() else {
            return;
        };
        let records: Vec<(usize, Record)> = document
            .child_indices(index)
            .into_iter()
            .map(|child| (child, document.take(child)))
            .collect();
        trace!(node = %id, count = records.len(), "materializing children");
        for (child_index, record) in records {
            // Counted as structural errors at load time.
            if record.tag.is_empty() {
                continue;
            }
            let child = self.alloc(Node::from_record(record, child_index));
            self.set_parent(child, Some(id));
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ANY_TYPE, TYPE_ATTRIBUTE};

    fn typed_child(tree: &mut NodeTree, parent: NodeId, key: &str, ty: &str) -> NodeId {
        let id = tree.add_child(parent, key);
        tree.node_mut(id).set_attribute(TYPE_ATTRIBUTE, ty);
        id
    }

    #[test]
    fn fresh_tree_has_lone_root() {
        let tree = NodeTree::new("archive");
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(tree.root()).tag_name(), "archive");
        assert!(tree.parent(tree.root()).is_none());
        assert!(!tree.node(tree.root()).has_children());
    }

    #[test]
    fn child_lookup_respects_type() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let id = typed_child(&mut tree, root, "k", "int");

        assert_eq!(tree.child(root, "k", "int"), Some(id));
        assert_eq!(tree.child(root, "k", ANY_TYPE), Some(id));
        assert_eq!(tree.child(root, "k", "string"), None);
        assert_eq!(tree.child(root, "missing", ANY_TYPE), None);
    }

    #[test]
    fn untyped_child_is_invisible_even_to_wildcard() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let bare = tree.add_child(root, "bare");
        assert_eq!(tree.child(root, "bare", ANY_TYPE), None);
        assert_eq!(tree.child_by_tag(root, "bare"), Some(bare));
    }

    #[test]
    fn duplicate_tag_last_write_wins() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let first = typed_child(&mut tree, root, "k", "int");
        let second = typed_child(&mut tree, root, "k", "string");

        assert_eq!(tree.child(root, "k", ANY_TYPE), Some(second));
        assert_eq!(tree.parent(first), None);
        assert_eq!(tree.parent(second), Some(root));
        assert_eq!(tree.to_records()[0].children, 1);
    }

    #[test]
    fn reparenting_moves_registration() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let a = typed_child(&mut tree, root, "a", "Obj");
        let b = typed_child(&mut tree, root, "b", "Obj");
        let leaf = typed_child(&mut tree, a, "leaf", "int");

        tree.set_parent(leaf, Some(b));
        assert_eq!(tree.child(a, "leaf", ANY_TYPE), None);
        assert_eq!(tree.child(b, "leaf", ANY_TYPE), Some(leaf));
        assert_eq!(tree.path(leaf), "/archive/b/leaf");
    }

    #[test]
    fn attaching_to_loaded_parent_wins_over_its_document_children() {
        let doc = Element::new("archive").with_child(
            Element::new("box")
                .with_attribute("type", "Box")
                .with_child(Element::new("a").with_attribute("type", "int").with_text("1")),
        );
        let mut tree = NodeTree::from_element(doc);
        let root = tree.root();
        let loose = typed_child(&mut tree, root, "a", "int");
        let boxed = tree.child(root, "box", "Box").unwrap();
        assert!(!tree.node(boxed).is_materialized());

        tree.set_parent(loose, Some(boxed));
        assert_eq!(tree.child(boxed, "a", ANY_TYPE), Some(loose));
        assert_eq!(tree.children_of(boxed).len(), 1);
    }

    #[test]
    fn clearing_detaches_children() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let obj = typed_child(&mut tree, root, "obj", "Obj");
        let inner = typed_child(&mut tree, obj, "x", "int");
        tree.node_mut(obj).set_value("text".into());

        tree.clear_node(obj);
        assert_eq!(tree.node(obj).type_name(), "");
        assert_eq!(tree.node(obj).value(), "");
        assert!(!tree.node(obj).has_children());
        assert_eq!(tree.parent(inner), None);
        assert_eq!(tree.child_by_tag(root, "obj"), Some(obj));
    }

    #[test]
    fn clearing_a_loaded_node_drops_its_document_children() {
        let doc = Element::new("archive").with_child(
            Element::new("obj")
                .with_attribute("type", "Obj")
                .with_child(Element::new("x").with_attribute("type", "int")),
        );
        let mut tree = NodeTree::from_element(doc);
        let root = tree.root();
        let obj = tree.child(root, "obj", "Obj").unwrap();
        tree.clear_node(obj);
        assert!(tree.children_of(obj).is_empty());
        assert_eq!(tree.to_records().len(), 2);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn cyclic_parenting_panics() {
        let mut tree = NodeTree::new("archive");
        let root = tree.root();
        let a = typed_child(&mut tree, root, "a", "Obj");
        let b = typed_child(&mut tree, a, "b", "Obj");
        tree.set_parent(a, Some(b));
    }

    #[test]
    #[should_panic(expected = "dangling node handle")]
    fn foreign_handle_panics() {
        let tree = NodeTree::new("archive");
        tree.node(NodeId(42));
    }

    #[test]
    fn loaded_children_materialize_on_first_access() {
        let doc = Element::new("archive").with_child(
            Element::new("rect")
                .with_attribute("type", "Rect")
                .with_child(Element::new("w").with_attribute("type", "int").with_text("4")),
        );
        let mut tree = NodeTree::from_element(doc.clone());
        let root = tree.root();
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.node(root).is_materialized());

        let rect = tree.child(root, "rect", "Rect").unwrap();
        assert_eq!(tree.node_count(), 2);
        let w = tree.child(rect, "w", "int").unwrap();
        assert_eq!(tree.node(w).value(), "4");
        assert_eq!(tree.path(w), "/archive/rect/w");

        assert_eq!(tree.to_records(), doc.into_records());
    }

    #[test]
    fn export_includes_unmaterialized_subtrees() {
        let doc = Element::new("archive")
            .with_child(Element::new("a").with_attribute("type", "int").with_text("1"))
            .with_child(
                Element::new("b")
                    .with_attribute("type", "Obj")
                    .with_child(Element::new("c").with_attribute("type", "int")),
            );
        let mut tree = NodeTree::from_element(doc.clone());
        let root = tree.root();
        // Materialize the root only; "b" keeps its pending child.
        tree.child(root, "a", "int").unwrap();
        assert_eq!(tree.to_records(), doc.into_records());
    }

    #[test]
    fn adding_to_loaded_node_keeps_existing_children() {
        let doc = Element::new("archive")
            .with_child(Element::new("a").with_attribute("type", "int").with_text("1"));
        let mut tree = NodeTree::from_element(doc);
        let root = tree.root();
        typed_child(&mut tree, root, "b", "int");

        assert!(tree.child(root, "a", "int").is_some());
        assert!(tree.child(root, "b", "int").is_some());
    }

    #[test]
    fn empty_tag_elements_are_skipped() {
        let doc = Element::new("archive")
            .with_child(Element::new("").with_attribute("type", "int"))
            .with_child(Element::new("ok").with_attribute("type", "int"));
        let mut tree = NodeTree::from_element(doc);
        let root = tree.root();
        assert!(tree.child(root, "ok", "int").is_some());
        assert_eq!(tree.node(root).children().count(), 1);
    }

    #[test]
    fn deep_chains_export_without_recursion() {
        let mut tree = NodeTree::new("archive");
        let mut last = tree.root();
        for _ in 0..100_000 {
            last = typed_child(&mut tree, last, "next", "Link");
        }
        let records = tree.to_records();
        assert_eq!(records.len(), 100_001);

        let mut loaded = NodeTree::from_document(Document::from_records(records).unwrap());
        let mut node = loaded.root();
        let mut depth = 0;
        while let Some(next) = loaded.child(node, "next", "Link") {
            node = next;
            depth += 1;
        }
        assert_eq!(depth, 100_000);
    }
}
