//! The persisted document model.
//!
//! A document is a flat, pre-order list of [`Record`]s. Each record carries a
//! tag, attributes, text, and the number of direct children that follow it.
//! The root comes first; a record's children are the next `children`
//! subtrees in order.
//!
//! ```text
//! archive (2)          [archive:2, rect:1, w:0, name:0]
//! ├── rect (1)
//! │   └── w (0)
//! └── name (0)
//! ```
//!
//! Nothing here recurses, so nesting depth is bounded only by input size.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::Element;

/// One element of a persisted document.
///
/// Optional fields use `#[serde(default)]` only; `skip_serializing_if` would
/// break non-self-describing codecs such as bincode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Element name. Doubles as the archive key.
    pub tag: String,
    /// Attributes such as `type` and `count`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Text content (primitive values); empty for objects and arrays.
    #[serde(default)]
    pub text: String,
    /// Number of direct children following this record.
    #[serde(default)]
    pub children: u64,
}

/// A record list whose child counts do not describe a single tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document has no records")]
    Empty,

    #[error("record {index} declares {missing} more children than the document holds")]
    Truncated { index: usize, missing: u64 },

    #[error("{0} records follow the root subtree")]
    Trailing(usize),
}

/// A validated record list.
#[derive(Clone, Debug)]
pub struct Document {
    records: Vec<Record>,
    /// `ends[i]` is one past the last record of the subtree rooted at `i`.
    ends: Vec<usize>,
    structural_errors: u64,
}

struct Frame<'a> {
    index: usize,
    remaining: u64,
    seen: HashSet<&'a str>,
}

impl Document {
    /// Validate child counts and count structural defects.
    ///
    /// A defect is a child with an empty tag, or a child whose tag repeats an
    /// earlier sibling's. Empty-tag children are dropped when the tree is
    /// materialized and duplicates resolve last-wins, so both lose data.
    pub fn from_records(records: Vec<Record>) -> Result<Self, DocumentError> {
        let Some(root) = records.first() else {
            return Err(DocumentError::Empty);
        };
        let mut ends = vec![0; records.len()];
        let mut errors = 0;
        let mut next = 1;
        let mut stack = vec![Frame {
            index: 0,
            remaining: root.children,
            seen: HashSet::new(),
        }];

        while let Some(top) = stack.last_mut() {
            if top.remaining == 0 {
                ends[top.index] = next;
                stack.pop();
                continue;
            }
            let Some(child) = records.get(next) else {
                return Err(DocumentError::Truncated {
                    index: top.index,
                    missing: top.remaining,
                });
            };
            top.remaining -= 1;
            if child.tag.is_empty() || !top.seen.insert(child.tag.as_str()) {
                errors += 1;
            }
            stack.push(Frame {
                index: next,
                remaining: child.children,
                seen: HashSet::new(),
            });
            next += 1;
        }
        drop(stack);

        if next != records.len() {
            return Err(DocumentError::Trailing(records.len() - next));
        }
        Ok(Self {
            records,
            ends,
            structural_errors: errors,
        })
    }

    /// Flatten a nested element.
    pub fn from_element(root: Element) -> Self {
        match Self::from_records(root.into_records()) {
            Ok(document) => document,
            Err(e) => unreachable!("flattened element is inconsistent: {e}"),
        }
    }

    pub fn root(&self) -> &Record {
        &self.records[0]
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; a document has at least a root.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn structural_errors(&self) -> u64 {
        self.structural_errors
    }

    /// Indices of the direct children of record `index`.
    pub(crate) fn child_indices(&self, index: usize) -> Vec<usize> {
        let mut children = Vec::new();
        let mut next = index + 1;
        while next < self.ends[index] {
            children.push(next);
            next = self.ends[next];
        }
        children
    }

    /// All descendants of record `index`, in document order.
    pub(crate) fn descendants(&self, index: usize) -> &[Record] {
        &self.records[index + 1..self.ends[index]]
    }

    /// Move a record's content out, leaving its child count in place.
    pub(crate) fn take(&mut self, index: usize) -> Record {
        let record = &mut self.records[index];
        Record {
            tag: std::mem::take(&mut record.tag),
            attributes: std::mem::take(&mut record.attributes),
            text: std::mem::take(&mut record.text),
            children: record.children,
        }
    }
}
