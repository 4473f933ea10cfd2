use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Tag given to the root element of a fresh archive.
pub const DEFAULT_ROOT_TAG: &str = "archive";

/// Largest encoded or decompressed document accepted on load (256 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 256 * 1024 * 1024;

/// Configuration shared by all document backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Tag of the root element created by `reset` and for fresh archives.
    pub root_tag: String,
    /// Pretty-print text codecs (JSON).
    pub pretty: bool,
    /// zstd level for the binary codec; `None` stores the payload uncompressed.
    pub compression_level: Option<i32>,
    /// Loads fail once the input, or the decompressed payload, exceeds this size.
    pub max_document_bytes: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            pretty: true,
            compression_level: None,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl BackendConfig {
    /// Compact output with zstd compression for the binary codec.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            compression_level: Some(3),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML configuration. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> BackendResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| BackendError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub fn from_path(path: &Path) -> BackendResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> BackendResult<()> {
        if self.root_tag.is_empty() {
            return Err(BackendError::Config("root_tag must not be empty".into()));
        }
        if self.max_document_bytes == 0 {
            return Err(BackendError::Config(
                "max_document_bytes must be positive".into(),
            ));
        }
        if let Some(level) = self.compression_level {
            if !(1..=22).contains(&level) {
                return Err(BackendError::Config(format!(
                    "compression_level must be within 1..=22, got {level}"
                )));
            }
        }
        Ok(())
    }
}
