//! JSON document codec.
//!
//! The document is a flat array of pre-order records, so nesting depth never
//! reaches `serde_json`'s recursion limit:
//!
//! ```json
//! [
//!   { "tag": "archive", "children": 1 },
//!   { "tag": "answer", "attributes": { "type": "int" }, "text": "42" }
//! ]
//! ```

use kva_tree::Record;

use crate::config::BackendConfig;
use crate::document::{DocumentBackend, DocumentCodec};
use crate::error::{BackendError, BackendResult};

/// Stores the document as JSON via `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    const NAME: &'static str = "json";

    fn encode(&self, records: &[Record], config: &BackendConfig) -> BackendResult<Vec<u8>> {
        let encoded = if config.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        encoded.map_err(|e| BackendError::Serialization(e.to_string()))
    }

    fn decode(&self, data: &[u8], _config: &BackendConfig) -> BackendResult<Vec<Record>> {
        serde_json::from_slice(data).map_err(|e| BackendError::Parse(e.to_string()))
    }

    fn render(&self, data: &[u8]) -> String {
        String::from_utf8_lossy(data).into_owned()
    }
}

/// JSON-backed archive storage.
pub type JsonBackend = DocumentBackend<JsonCodec>;
