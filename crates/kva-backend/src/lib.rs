//! Storage backends for key/value archives.
//!
//! A backend owns an archive's [`NodeTree`](kva_tree::NodeTree) and moves it
//! to and from bytes. The archive engine only ever talks to the [`Backend`]
//! trait, so the physical format can change without touching archived types.
//!
//! # Backends
//!
//! - [`JsonBackend`] -- human-readable JSON documents
//! - [`BinaryBackend`] -- checksummed bincode frames, optionally zstd-compressed
//!
//! Both are [`DocumentBackend`]s over a [`DocumentCodec`]; adding a format
//! means adding a codec.
//!
//! # Design Rules
//!
//! 1. Load and save report `BackendResult`; the engine treats them as
//!    pass/fail and does not inspect the error.
//! 2. A failed load discards the previous tree and leaves an empty, unloaded one.
//! 3. Structural defects in an otherwise parseable document are counted, not fatal.

pub mod binary;
pub mod config;
pub mod document;
pub mod error;
pub mod json;
pub mod traits;

pub use binary::{BinaryBackend, BinaryCodec};
pub use config::{BackendConfig, DEFAULT_MAX_DOCUMENT_BYTES, DEFAULT_ROOT_TAG};
pub use document::{DocumentBackend, DocumentCodec};
pub use error::{BackendError, BackendResult};
pub use json::{JsonBackend, JsonCodec};
pub use traits::Backend;
