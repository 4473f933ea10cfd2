//! Backend shared by every document codec.
//!
//! [`DocumentBackend`] keeps the node tree and the load/save bookkeeping;
//! a [`DocumentCodec`] only turns a flat [`Record`] list into bytes and back.

use std::fs;
use std::path::{Path, PathBuf};

use kva_tree::{Document, NodeTree, Record};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::traits::Backend;

/// Byte encoding of an archive document.
pub trait DocumentCodec: Default {
    /// Short codec name used in logs.
    const NAME: &'static str;

    /// Encode pre-order records.
    fn encode(&self, records: &[Record], config: &BackendConfig) -> BackendResult<Vec<u8>>;

    /// Decode pre-order records. Decoders must not recurse per nesting level.
    fn decode(&self, data: &[u8], config: &BackendConfig) -> BackendResult<Vec<Record>>;

    /// Render encoded bytes for display.
    fn render(&self, data: &[u8]) -> String;
}

/// [`Backend`] implementation parameterized by its byte codec.
pub struct DocumentBackend<C> {
    codec: C,
    config: BackendConfig,
    tree: NodeTree,
    loaded: bool,
    error_count: u64,
    source: Option<PathBuf>,
}

impl<C: DocumentCodec> DocumentBackend<C> {
    /// Create a backend with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BackendConfig::default())
    }

    /// The codec in use.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Swap in a decoded document, or fall back to an empty tree.
    fn install(&mut self, decoded: BackendResult<Vec<Record>>) -> BackendResult<()> {
        self.reset();
        self.source = None;

        let document = decoded.and_then(|records| {
            let document = Document::from_records(records)?;
            if document.root().tag.is_empty() {
                Err(BackendError::MissingRoot)
            } else {
                Ok(document)
            }
        });

        match document {
            Ok(document) => {
                let errors = document.structural_errors();
                let elements = document.len();
                if errors > 0 {
                    warn!(codec = C::NAME, errors, "loaded archive has structural errors");
                }
                self.tree = NodeTree::from_document(document);
                self.error_count = errors;
                self.loaded = true;
                debug!(codec = C::NAME, elements, errors, "archive loaded");
                Ok(())
            }
            Err(e) => {
                self.error_count = 1;
                debug!(codec = C::NAME, error = %e, "archive load failed");
                Err(e)
            }
        }
    }
}

impl<C: DocumentCodec> Default for DocumentBackend<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DocumentCodec> Backend for DocumentBackend<C> {
    fn with_config(config: BackendConfig) -> Self {
        let tree = NodeTree::new(config.root_tag.clone());
        Self {
            codec: C::default(),
            config,
            tree,
            loaded: false,
            error_count: 0,
            source: None,
        }
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn tree(&self) -> &NodeTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    fn load_from_path(&mut self, path: &Path) -> BackendResult<()> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => return self.install(Err(e.into())),
        };
        self.load_from_bytes(&data)?;
        self.source = Some(path.to_path_buf());
        debug!(codec = C::NAME, path = %path.display(), "archive source recorded");
        Ok(())
    }

    fn load_from_bytes(&mut self, data: &[u8]) -> BackendResult<()> {
        let limit = self.config.max_document_bytes;
        let decoded = if data.len() as u64 > limit {
            Err(BackendError::TooLarge(limit))
        } else {
            self.codec.decode(data, &self.config)
        };
        self.install(decoded)
    }

    fn save(&self, path: &Path) -> BackendResult<()> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &bytes)?;
        debug!(codec = C::NAME, path = %path.display(), bytes = bytes.len(), "archive saved");
        Ok(())
    }

    fn to_bytes(&self) -> BackendResult<Vec<u8>> {
        self.codec.encode(&self.tree.to_records(), &self.config)
    }

    fn to_text(&self) -> BackendResult<String> {
        Ok(self.codec.render(&self.to_bytes()?))
    }

    fn error_count(&self) -> u64 {
        self.error_count
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn reset(&mut self) {
        self.tree = NodeTree::new(self.config.root_tag.clone());
        self.loaded = false;
        self.error_count = 0;
        debug!(codec = C::NAME, "archive reset");
    }

    fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl<C: DocumentCodec> std::fmt::Debug for DocumentBackend<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBackend")
            .field("codec", &C::NAME)
            .field("node_count", &self.tree.node_count())
            .field("loaded", &self.loaded)
            .field("error_count", &self.error_count)
            .field("source", &self.source)
            .finish()
    }
}
