//! The contract archived types implement.

use std::any::{self, Any, TypeId};

use crate::traits::{Deserializer, Serializer};

/// Upcast to [`Any`] for archived trait objects.
///
/// Implemented for every `'static` type; archived types never implement it
/// by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A type that can write itself into an archive and read itself back.
///
/// `class_name` is written as the `type` attribute of the object's node and
/// must match on read, so it has to stay stable across builds. Two types
/// sharing a class name are indistinguishable to the archive.
pub trait Archivable: AsAny {
    /// Type tag for this object.
    fn class_name(&self) -> &str;

    /// Write fields, each under its own key.
    fn serialize(&self, out: &mut dyn Serializer);

    /// Read fields back. Missing fields keep their current values.
    fn deserialize(&mut self, input: &mut dyn Deserializer);
}

pub(crate) fn concrete_type(object: &dyn Archivable) -> TypeId {
    object.as_any().type_id()
}

/// Recover the concrete type of an instance built from a `T` prototype.
pub(crate) fn downcast<T: Archivable>(object: Box<dyn Archivable>) -> T {
    match object.into_any().downcast::<T>() {
        Ok(object) => *object,
        Err(_) => panic!("archived instance is not a {}", any::type_name::<T>()),
    }
}
