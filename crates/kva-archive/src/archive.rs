//! The key/value archive engine.

use std::fmt;
use std::path::Path;

use kva_backend::{Backend, BinaryBackend, JsonBackend};
use kva_tree::{type_matches, NodeId, TreeNode, ANY_TYPE, COUNT_ATTRIBUTE, TYPE_ATTRIBUTE};
use tracing::{debug, trace, warn};

use crate::config::ArchiveConfig;
use crate::delegate::{ArchiveDelegate, DelegateSlot};
use crate::error::ArchiveResult;
use crate::object::{concrete_type, Archivable};
use crate::primitive::Primitive;
use crate::result::{ArchivingResult, Lookup};
use crate::traits::{Deserializer, Serializer};

/// Type tag of array nodes.
pub const ARRAY_TYPE: &str = "array";

/// Maps keyed values and object graphs onto a backend's node tree.
///
/// Every read and write is relative to the current scope. Writing or reading
/// a nested object moves the scope into that object's node for the duration
/// of the call and restores it afterwards.
///
/// The optional delegate is borrowed for `'d`; the archive never owns it.
pub struct KeyValueArchive<'d, B: Backend> {
    backend: B,
    scope: NodeId,
    delegate: DelegateSlot<'d>,
    config: ArchiveConfig,
}

/// Archive stored as a JSON document.
pub type JsonArchive<'d> = KeyValueArchive<'d, JsonBackend>;

/// Archive stored as a binary frame.
pub type BinaryArchive<'d> = KeyValueArchive<'d, BinaryBackend>;

impl<'d, B: Backend> KeyValueArchive<'d, B> {
    /// An empty archive with default configuration.
    pub fn new() -> Self {
        Self::with_config(ArchiveConfig::default())
    }

    pub fn with_config(config: ArchiveConfig) -> Self {
        let backend = B::with_config(config.backend.clone());
        Self::from_parts(backend, config)
    }

    /// Wrap an existing backend, keeping whatever tree it holds.
    pub fn with_backend(backend: B) -> Self {
        let config = ArchiveConfig {
            backend: backend.config().clone(),
            ..ArchiveConfig::default()
        };
        Self::from_parts(backend, config)
    }

    /// Load the archive stored at `path`.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        Self::open_with_config(path, ArchiveConfig::default())
    }

    pub fn open_with_config(path: &Path, config: ArchiveConfig) -> ArchiveResult<Self> {
        let mut archive = Self::with_config(config);
        archive.load_from_path(path)?;
        Ok(archive)
    }

    fn from_parts(backend: B, config: ArchiveConfig) -> Self {
        let scope = backend.root_node();
        Self {
            backend,
            scope,
            delegate: DelegateSlot::default(),
            config,
        }
    }

    // --- management ---

    /// Install a delegate, replacing any previous one.
    pub fn set_delegate(&mut self, delegate: &'d mut dyn ArchiveDelegate) {
        self.delegate = DelegateSlot::Borrowed(delegate);
    }

    /// Fall back to the no-op delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = DelegateSlot::default();
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_set()
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Replace the contents with the document at `path`.
    ///
    /// The scope returns to the (new) root whether or not the load succeeds.
    pub fn load_from_path(&mut self, path: &Path) -> ArchiveResult<()> {
        let result = self.backend.load_from_path(path);
        self.reset();
        debug!(path = %path.display(), ok = result.is_ok(), "archive loaded from file");
        Ok(result?)
    }

    /// Replace the contents with an encoded document.
    pub fn load_from_bytes(&mut self, data: &[u8]) -> ArchiveResult<()> {
        let result = self.backend.load_from_bytes(data);
        self.reset();
        debug!(bytes = data.len(), ok = result.is_ok(), "archive loaded from bytes");
        Ok(result?)
    }

    pub fn load_from_str(&mut self, text: &str) -> ArchiveResult<()> {
        self.load_from_bytes(text.as_bytes())
    }

    pub fn save(&self, path: &Path) -> ArchiveResult<()> {
        Ok(self.backend.save(path)?)
    }

    /// Save back to the file the archive was loaded from.
    pub fn save_to_source(&self) -> ArchiveResult<()> {
        Ok(self.backend.save_to_source()?)
    }

    pub fn to_bytes(&self) -> ArchiveResult<Vec<u8>> {
        Ok(self.backend.to_bytes()?)
    }

    /// Printable form of the encoded document.
    pub fn to_text(&self) -> ArchiveResult<String> {
        Ok(self.backend.to_text()?)
    }

    /// Structural errors found by the last load.
    pub fn error_count(&self) -> u64 {
        self.backend.error_count()
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_loaded()
    }

    pub fn source(&self) -> Option<&Path> {
        self.backend.source()
    }

    /// Return the scope to the root node. Stored content is kept.
    pub fn reset(&mut self) {
        self.scope = self.backend.root_node();
    }

    /// Discard all content and start from an empty root.
    pub fn clear(&mut self) {
        self.backend.reset();
        self.reset();
    }

    /// Slash-separated path of the current scope, e.g. `/archive/rect/size`.
    pub fn scope_path(&self) -> String {
        self.backend.tree().path(self.scope())
    }

    // --- primitives ---

    /// Write any primitive under `key`.
    pub fn set_value<P: Primitive>(&mut self, value: P, key: &str) {
        self.write_text(key, P::TYPE_NAME, value.encode());
    }

    /// Read any primitive stored under `key`.
    ///
    /// Text that does not parse as `P` yields the default value with
    /// status `Undefined`.
    pub fn get_value<P: Primitive>(&mut self, key: &str) -> Lookup<P> {
        let node = self.locate(key);
        let status = self.verify(node, P::TYPE_NAME);
        let Some(id) = node.filter(|_| status.is_found()) else {
            trace!(key, type_name = P::TYPE_NAME, %status, "value lookup failed");
            return Lookup::missing(status);
        };
        let text = self.backend.tree().node(id).value();
        match P::decode(text) {
            Some(value) => Lookup::found(value),
            None => {
                warn!(
                    key,
                    type_name = P::TYPE_NAME,
                    text,
                    scope = %self.scope_path(),
                    "malformed primitive value"
                );
                Lookup::missing(ArchivingResult::Undefined)
            }
        }
    }

    // --- scope ---

    pub(crate) fn scope(&self) -> NodeId {
        self.scope
    }

    /// Make `node` the current scope.
    ///
    /// # Panics
    ///
    /// If `node` does not belong to this archive's tree.
    pub(crate) fn push_scope(&mut self, node: NodeId) {
        assert!(
            self.backend.tree().contains(node),
            "cannot push invalid scope {node}"
        );
        self.scope = node;
    }

    /// Move the scope to its parent.
    ///
    /// # Panics
    ///
    /// If the scope is already the root.
    pub(crate) fn pop_scope(&mut self) {
        match self.backend.tree().parent(self.scope) {
            Some(parent) => self.scope = parent,
            None => panic!("cannot pop scope past the archive root"),
        }
    }

    // --- node plumbing ---

    /// Child of the scope under `key` with type `type_name`, created if absent.
    ///
    /// A child stored under `key` with a different type is cleared and
    /// retyped in place.
    fn sub_node(&mut self, key: &str, type_name: &str) -> NodeId {
        let scope = self.scope;
        let tree = self.backend.tree_mut();
        let id = match tree.child_by_tag(scope, key) {
            Some(id) if type_matches(tree.node(id).type_name(), type_name) => return id,
            Some(id) => {
                tree.clear_node(id);
                id
            }
            None => tree.add_child(scope, key),
        };
        tree.node_mut(id).set_attribute(TYPE_ATTRIBUTE, type_name);
        id
    }

    fn write_text(&mut self, key: &str, type_name: &str, text: String) {
        let id = self.sub_node(key, type_name);
        trace!(key, type_name, "value written");
        self.backend.tree_mut().node_mut(id).set_value(text);
    }

    /// Typed child of the scope under `key`, whatever its type.
    fn locate(&mut self, key: &str) -> Option<NodeId> {
        let scope = self.scope;
        self.backend.tree_mut().child(scope, key, ANY_TYPE)
    }

    fn verify(&self, node: Option<NodeId>, type_name: &str) -> ArchivingResult {
        match node {
            None => ArchivingResult::NotFound,
            Some(id) if self.backend.tree().node(id).type_name() != type_name => {
                ArchivingResult::BadType
            }
            Some(_) => ArchivingResult::Found,
        }
    }

    /// Array node under `key` and its recorded element count.
    fn array_node(&mut self, key: &str) -> Result<(NodeId, u64), ArchivingResult> {
        let node = self.locate(key);
        let status = self.verify(node, ARRAY_TYPE);
        let Some(id) = node.filter(|_| status.is_found()) else {
            return Err(status);
        };
        let text = self.backend.tree().node(id).attribute(COUNT_ATTRIBUTE);
        match text.trim().parse::<u64>() {
            Ok(count) => Ok((id, count)),
            Err(_) => {
                warn!(key, count = text, scope = %self.scope_path(), "malformed array count");
                Err(ArchivingResult::Undefined)
            }
        }
    }

    /// Indices of the item children stored under `array`, ascending.
    ///
    /// Only canonical item tags below `count` are kept, so the work is
    /// bounded by the stored children rather than by the recorded count.
    fn item_indices(&mut self, array: NodeId, count: u64) -> Vec<u64> {
        let prefix = self.config.item_prefix.as_str();
        let mut indices: Vec<u64> = self
            .backend
            .tree_mut()
            .children_of(array)
            .into_iter()
            .filter_map(|(tag, _)| {
                let digits = tag.strip_prefix(prefix)?;
                let index: u64 = digits.parse().ok()?;
                (index < count && index.to_string() == digits).then_some(index)
            })
            .collect();
        indices.sort_unstable();
        indices
    }
}

impl<B: Backend> Default for KeyValueArchive<'_, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for KeyValueArchive<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueArchive")
            .field("scope", &self.scope_path())
            .field("nodes", &self.backend.tree().node_count())
            .field("loaded", &self.backend.is_loaded())
            .field("has_delegate", &self.has_delegate())
            .field("config", &self.config)
            .finish()
    }
}

impl<B: Backend> Serializer for KeyValueArchive<'_, B> {
    fn set_bool(&mut self, value: bool, key: &str) {
        self.set_value(value, key);
    }

    fn set_char(&mut self, value: char, key: &str) {
        self.set_value(value, key);
    }

    fn set_short(&mut self, value: i16, key: &str) {
        self.set_value(value, key);
    }

    fn set_int(&mut self, value: i32, key: &str) {
        self.set_value(value, key);
    }

    fn set_long(&mut self, value: i64, key: &str) {
        self.set_value(value, key);
    }

    fn set_float(&mut self, value: f32, key: &str) {
        self.set_value(value, key);
    }

    fn set_double(&mut self, value: f64, key: &str) {
        self.set_value(value, key);
    }

    fn set_string(&mut self, value: &str, key: &str) {
        self.write_text(key, String::TYPE_NAME, value.to_string());
    }

    fn set_object(&mut self, object: &dyn Archivable, key: &str) {
        if !self.delegate.get().pre_serialize_object(object) {
            debug!(key, class = object.class_name(), "object skipped by delegate");
            return;
        }
        let node = self.sub_node(key, object.class_name());
        self.push_scope(node);
        object.serialize(self);
        self.pop_scope();
        self.delegate.get().after_serialize_object(object);
    }

    fn set_array(&mut self, objects: &[&dyn Archivable], key: &str) {
        if objects.is_empty() {
            trace!(key, "empty array not written");
            return;
        }
        let node = self.sub_node(key, ARRAY_TYPE);
        self.push_scope(node);
        for (index, object) in (0u64..).zip(objects) {
            let item_key = self.config.item_key(index);
            self.set_object(*object, &item_key);
        }
        self.pop_scope();
        self.backend
            .tree_mut()
            .node_mut(node)
            .set_attribute(COUNT_ATTRIBUTE, &objects.len().to_string());
    }
}

impl<B: Backend> Deserializer for KeyValueArchive<'_, B> {
    fn get_bool(&mut self, key: &str) -> Lookup<bool> {
        self.get_value(key)
    }

    fn get_char(&mut self, key: &str) -> Lookup<char> {
        self.get_value(key)
    }

    fn get_short(&mut self, key: &str) -> Lookup<i16> {
        self.get_value(key)
    }

    fn get_int(&mut self, key: &str) -> Lookup<i32> {
        self.get_value(key)
    }

    fn get_long(&mut self, key: &str) -> Lookup<i64> {
        self.get_value(key)
    }

    fn get_float(&mut self, key: &str) -> Lookup<f32> {
        self.get_value(key)
    }

    fn get_double(&mut self, key: &str) -> Lookup<f64> {
        self.get_value(key)
    }

    fn get_string(&mut self, key: &str) -> Lookup<String> {
        self.get_value(key)
    }

    fn fill_object(
        &mut self,
        key: &str,
        candidate: Box<dyn Archivable>,
    ) -> Lookup<Option<Box<dyn Archivable>>> {
        let node = self.locate(key);
        let status = self.verify(node, candidate.class_name());
        let Some(node) = node.filter(|_| status.is_found()) else {
            debug!(key, class = candidate.class_name(), %status, "object lookup failed");
            return Lookup::new(None, status);
        };

        let expected = concrete_type(&*candidate);
        let mut object = self.delegate.get().handle_instance(candidate);
        if concrete_type(&*object) != expected {
            panic!(
                "delegate substituted an incompatible instance of class {} for key {key}",
                object.class_name()
            );
        }

        // A replacement of the same type may still report another class name.
        let status = self.verify(Some(node), object.class_name());
        if !status.is_found() {
            debug!(key, class = object.class_name(), %status, "object lookup failed");
            return Lookup::new(None, status);
        }

        self.push_scope(node);
        object.deserialize(self);
        self.pop_scope();

        if !self.delegate.get().after_deserialize_object(&mut *object) {
            debug!(key, class = object.class_name(), "object denied by delegate");
            return Lookup::new(None, ArchivingResult::Denied);
        }
        Lookup::found(Some(object))
    }

    fn fill_array(
        &mut self,
        key: &str,
        factory: &mut dyn FnMut() -> Box<dyn Archivable>,
    ) -> Lookup<Option<Vec<Box<dyn Archivable>>>> {
        let (node, count) = match self.array_node(key) {
            Ok(found) => found,
            Err(status) => return Lookup::new(None, status),
        };

        let indices = self.item_indices(node, count);
        let mut status = ArchivingResult::Found;
        let mut items = Vec::with_capacity(indices.len());
        self.push_scope(node);
        for index in indices {
            let item_key = self.config.item_key(index);
            let element = self.fill_object(&item_key, factory());
            match element.value {
                Some(object) if element.status.is_found() => items.push(object),
                _ => status = status.absorb(element.status),
            }
        }
        self.pop_scope();

        debug!(key, count, read = items.len(), %status, "array read");
        Lookup::new(Some(items), status)
    }

    fn get_array_count(&mut self, key: &str) -> Lookup<u64> {
        match self.array_node(key) {
            Ok((_, count)) => Lookup::found(count),
            Err(status) => Lookup::missing(status),
        }
    }
}
