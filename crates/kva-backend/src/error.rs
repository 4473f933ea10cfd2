//! Error types for backend load/save operations.

use kva_tree::DocumentError;
use thiserror::Error;

/// Errors raised while loading, saving, or encoding an archive document.
///
/// These never describe archive-level lookups; a missing or mistyped key is
/// reported through the archive's lookup status instead.
#[derive(Debug, Error)]
pub enum BackendError {
    /// I/O error while reading or writing the archive file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source bytes are not a well-formed document.
    #[error("parse error: {0}")]
    Parse(String),

    /// The records do not form a single tree.
    #[error("malformed document: {0}")]
    Document(#[from] DocumentError),

    /// The input or its decompressed payload exceeds `max_document_bytes`.
    #[error("document exceeds the {0}-byte limit")]
    TooLarge(u64),

    /// The tree could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The binary frame does not start with the expected magic.
    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    /// The binary frame was written by an unknown format version.
    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    /// The payload checksum does not match the frame header.
    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    /// The input ended before a complete frame was read.
    #[error("truncated archive: {0}")]
    Truncated(String),

    /// Compressing or decompressing the payload failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// The document has no usable root element.
    #[error("document has no root element")]
    MissingRoot,

    /// `save_to_source` was called on an archive that was never loaded from a path.
    #[error("no source path recorded for this archive")]
    NoSource,

    /// Configuration could not be parsed or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
