//! Node tree for key/value archives.
//!
//! An archive is a tree of labeled nodes. Each node has a tag (its key under
//! its parent), a `type` attribute, optional further attributes such as an
//! array's `count`, and text content for primitive values.
//!
//! # Components
//!
//! - [`NodeTree`] -- arena owning every node; links are [`NodeId`] handles
//! - [`Node`] / [`TreeNode`] -- per-node accessors
//! - [`Document`] / [`Record`] -- the flat document model that backends persist
//! - [`Element`] -- nested builder that flattens into records
//! - [`type_matches`] -- the lookup rule shared by every typed child query
//!
//! # Design Rules
//!
//! 1. The tree owns all nodes; callers only ever hold handles.
//! 2. Sibling tags are unique. A second child with the same tag wins.
//! 3. An empty stored type matches nothing, not even the `"*"` wildcard.
//! 4. Loaded documents are materialized lazily, one level per lookup.

pub mod document;
pub mod element;
pub mod node;
pub mod tree;

pub use document::{Document, DocumentError, Record};
pub use element::Element;
pub use node::{type_matches, Node, NodeId, TreeNode, ANY_TYPE, COUNT_ATTRIBUTE, TYPE_ATTRIBUTE};
pub use tree::NodeTree;
