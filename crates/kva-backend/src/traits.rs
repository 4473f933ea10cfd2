use std::path::Path;

use kva_tree::{NodeId, NodeTree};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};

/// Owner of an archive's node tree and its persistence.
///
/// All implementations must satisfy these invariants:
/// - There is always a tree with a root; a fresh backend holds an empty root
///   tagged with [`BackendConfig::root_tag`].
/// - A failed load leaves the backend not loaded, holding a fresh empty root.
///   The previous tree is discarded either way.
/// - `error_count` reports structural or parse errors from the last load
///   attempt only. Archive-level type errors are never counted here.
/// - The backend never interprets node types or values.
pub trait Backend {
    /// Create a backend holding a fresh, empty tree.
    fn with_config(config: BackendConfig) -> Self
    where
        Self: Sized;

    /// Active configuration.
    fn config(&self) -> &BackendConfig;

    /// Borrow the node tree.
    fn tree(&self) -> &NodeTree;

    /// Mutably borrow the node tree.
    fn tree_mut(&mut self) -> &mut NodeTree;

    /// Handle of the current root node.
    fn root_node(&self) -> NodeId {
        self.tree().root()
    }

    /// Replace the tree with the document stored at `path`.
    ///
    /// On success the path is remembered as the archive's source.
    fn load_from_path(&mut self, path: &Path) -> BackendResult<()>;

    /// Replace the tree with the document encoded in `data`.
    fn load_from_bytes(&mut self, data: &[u8]) -> BackendResult<()>;

    /// Write the current tree to `path`, creating parent directories.
    fn save(&self, path: &Path) -> BackendResult<()>;

    /// Write the current tree back to the path it was loaded from.
    fn save_to_source(&self) -> BackendResult<()> {
        let path = self.source().ok_or(BackendError::NoSource)?;
        self.save(path)
    }

    /// Encode the current tree.
    fn to_bytes(&self) -> BackendResult<Vec<u8>>;

    /// Human-readable rendering of the encoded tree.
    fn to_text(&self) -> BackendResult<String>;

    /// Structural errors found by the last load.
    fn error_count(&self) -> u64;

    /// Whether the last load succeeded.
    fn is_loaded(&self) -> bool;

    /// Discard the tree and start over with an empty root.
    fn reset(&mut self);

    /// Path of the last successful file load, if any.
    fn source(&self) -> Option<&Path>;
}
