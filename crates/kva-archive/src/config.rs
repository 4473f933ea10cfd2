use std::path::Path;

use kva_backend::BackendConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// Key prefix for array elements: `item0`, `item1`, ...
pub const DEFAULT_ITEM_PREFIX: &str = "item";

/// Archive configuration.
///
/// ```toml
/// item_prefix = "item"
///
/// [backend]
/// root_tag = "archive"
/// pretty = true
/// compression_level = 3
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Prefix of array element keys.
    pub item_prefix: String,
    /// Storage settings handed to the backend.
    pub backend: BackendConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            item_prefix: DEFAULT_ITEM_PREFIX.to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl ArchiveConfig {
    /// Parse and validate a TOML configuration. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> ArchiveResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ArchiveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ArchiveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ArchiveResult<()> {
        if self.item_prefix.is_empty() {
            return Err(ArchiveError::Config("item_prefix must not be empty".into()));
        }
        self.backend
            .validate()
            .map_err(|e| ArchiveError::Config(e.to_string()))
    }

    /// Key of the array element at `index`.
    pub fn item_key(&self, index: u64) -> String {
        format!("{}{index}", self.item_prefix)
    }
}
