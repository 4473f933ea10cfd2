//! Archive nodes and their handles.

use std::collections::BTreeMap;
use std::fmt;

use crate::document::Record;

/// Attribute holding a node's type tag.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Attribute holding an array node's element count.
pub const COUNT_ATTRIBUTE: &str = "count";

/// Requested type that accepts any non-empty stored type.
pub const ANY_TYPE: &str = "*";

/// Stable handle to a node inside a [`NodeTree`](crate::NodeTree).
///
/// Handles are only meaningful for the tree that issued them. They stay valid
/// for the lifetime of that tree; nodes are never freed individually.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena slot of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node accessors every archive node exposes.
///
/// Structural operations (child lookup, attaching children, re-parenting)
/// need the whole arena and live on [`NodeTree`](crate::NodeTree).
pub trait TreeNode {
    /// The node's tag, which is also its key under its parent.
    fn tag_name(&self) -> &str;

    /// An attribute value, or `""` if the attribute is absent.
    fn attribute(&self, key: &str) -> &str;

    /// Set (or overwrite) an attribute.
    fn set_attribute(&mut self, key: &str, value: &str);

    /// Text content.
    fn value(&self) -> &str;

    /// Replace the text content.
    fn set_value(&mut self, value: String);

    /// Parent handle, `None` for the root.
    fn parent(&self) -> Option<NodeId>;

    /// Whether any child has been attached or materialized.
    fn has_children(&self) -> bool;

    /// Shorthand for the `type` attribute.
    fn type_name(&self) -> &str {
        self.attribute(TYPE_ATTRIBUTE)
    }
}

/// A single arena-resident archive node.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) value: String,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Document record whose children are not yet turned into nodes.
    pub(crate) pending: Option<usize>,
}

impl Node {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// A node for a loaded record. `index` is the record's position in the
    /// document, kept while its children are still unmaterialized.
    pub(crate) fn from_record(record: Record, index: usize) -> Self {
        Self {
            pending: (record.children > 0).then_some(index),
            tag: record.tag,
            attributes: record.attributes,
            value: record.text,
            children: BTreeMap::new(),
            parent: None,
        }
    }

    /// Attached children keyed by tag.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(tag, id)| (tag.as_str(), *id))
    }

    /// All attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether document children are still waiting to be materialized.
    pub fn is_materialized(&self) -> bool {
        self.pending.is_none()
    }
}

impl TreeNode for Node {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or("")
    }

    fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn has_children(&self) -> bool {
        !self.children.is_empty() || self.pending.is_some()
    }
}

/// Whether a stored `type` attribute satisfies a requested type.
///
/// An empty type on either side never matches, not even against
/// [`ANY_TYPE`].
pub fn type_matches(stored: &str, requested: &str) -> bool {
    if stored.is_empty() || requested.is_empty() {
        return false;
    }
    requested == ANY_TYPE || stored == requested
}
