//! Nested document builder.
//!
//! [`Element`] is a convenient way to assemble a document by hand. It is not
//! what backends persist: [`Element::into_records`] flattens it into the
//! record list described in [`document`](crate::document).

use std::collections::BTreeMap;

use crate::document::Record;

/// One tagged element with its nested children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Element name. Doubles as the archive key.
    pub tag: String,
    /// Attributes such as `type` and `count`.
    pub attributes: BTreeMap<String, String>,
    /// Text content (primitive values); empty for objects and arrays.
    pub text: String,
    /// Nested elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder-style text setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Flatten into pre-order records.
    pub fn into_records(self) -> Vec<Record> {
        let mut records = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            let Element {
                tag,
                attributes,
                text,
                children,
            } = element;
            records.push(Record {
                tag,
                attributes,
                text,
                children: children.len() as u64,
            });
            stack.extend(children.into_iter().rev());
        }
        records
    }
}
