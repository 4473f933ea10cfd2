//! Key/value archive engine for object graphs.
//!
//! An archive maps primitives, nested objects and arrays of objects onto a
//! tree of tagged nodes, each carrying a `type` attribute. Types opt in by
//! implementing [`Archivable`]; the physical format is chosen by the
//! [`Backend`](kva_backend::Backend) the archive is built on.
//!
//! ```no_run
//! use kva_archive::prelude::*;
//!
//! #[derive(Default)]
//! struct Size { width: f32, height: f32 }
//!
//! impl Archivable for Size {
//!     fn class_name(&self) -> &str {
//!         "Size"
//!     }
//!     fn serialize(&self, out: &mut dyn Serializer) {
//!         out.set_float(self.width, "width");
//!         out.set_float(self.height, "height");
//!     }
//!     fn deserialize(&mut self, input: &mut dyn Deserializer) {
//!         self.width = input.get_float("width").value;
//!         self.height = input.get_float("height").value;
//!     }
//! }
//!
//! let mut archive = JsonArchive::new();
//! archive.set_object(&Size { width: 3.0, height: 4.0 }, "size");
//! archive.save(std::path::Path::new("size.json")).unwrap();
//!
//! let mut reopened = JsonArchive::open(std::path::Path::new("size.json")).unwrap();
//! let size = reopened.get_object::<Size>("size");
//! assert_eq!(size.status, ArchivingResult::Found);
//! ```
//!
//! # Design Rules
//!
//! 1. Lookups never fail outright; they return a default value with an
//!    [`ArchivingResult`] explaining why.
//! 2. Writing a key replaces whatever was stored under it, type included.
//! 3. Scope changes made while archiving an object are undone before the
//!    call returns.
//! 4. The delegate is borrowed, never owned.

pub mod archive;
pub mod config;
pub mod delegate;
pub mod error;
pub mod object;
pub mod primitive;
pub mod result;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use archive::{BinaryArchive, JsonArchive, KeyValueArchive, ARRAY_TYPE};
pub use config::{ArchiveConfig, DEFAULT_ITEM_PREFIX};
pub use delegate::{ArchiveDelegate, NoopDelegate};
pub use error::{ArchiveError, ArchiveResult};
pub use object::{Archivable, AsAny};
pub use primitive::Primitive;
pub use result::{ArchivingResult, Lookup};
pub use traits::{Deserializer, DeserializerExt, Serializer, SerializerExt};

/// Everything needed to implement and archive types.
pub mod prelude {
    pub use crate::{
        Archivable, ArchiveDelegate, ArchivingResult, BinaryArchive, Deserializer,
        DeserializerExt, JsonArchive, KeyValueArchive, Lookup, Serializer, SerializerExt,
    };
}
