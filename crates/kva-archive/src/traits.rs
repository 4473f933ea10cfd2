//! The capability surface archived types write to and read from.
//!
//! Both traits are object safe: [`Archivable`] implementations receive a
//! `&mut dyn Serializer` or `&mut dyn Deserializer`. Generic conveniences
//! live in [`SerializerExt`] and [`DeserializerExt`], which are implemented
//! for every serializer, trait objects included.

use crate::object::{downcast, Archivable};
use crate::result::Lookup;

/// Write side of an archive. Each call writes under `key` in the current
/// scope, replacing whatever was stored there.
pub trait Serializer {
    fn set_bool(&mut self, value: bool, key: &str);
    fn set_char(&mut self, value: char, key: &str);
    fn set_short(&mut self, value: i16, key: &str);
    fn set_int(&mut self, value: i32, key: &str);
    fn set_long(&mut self, value: i64, key: &str);
    fn set_float(&mut self, value: f32, key: &str);
    fn set_double(&mut self, value: f64, key: &str);
    fn set_string(&mut self, value: &str, key: &str);

    /// Write `object` as a nested node tagged with its class name.
    fn set_object(&mut self, object: &dyn Archivable, key: &str);

    /// Write `objects` as an array node. Empty slices write nothing.
    fn set_array(&mut self, objects: &[&dyn Archivable], key: &str);
}

/// Read side of an archive. Lookups are relative to the current scope and
/// never fail outright: a failed lookup returns a default value and a
/// non-`Found` status.
pub trait Deserializer {
    fn get_bool(&mut self, key: &str) -> Lookup<bool>;
    fn get_char(&mut self, key: &str) -> Lookup<char>;
    fn get_short(&mut self, key: &str) -> Lookup<i16>;
    fn get_int(&mut self, key: &str) -> Lookup<i32>;
    fn get_long(&mut self, key: &str) -> Lookup<i64>;
    fn get_float(&mut self, key: &str) -> Lookup<f32>;
    fn get_double(&mut self, key: &str) -> Lookup<f64>;
    fn get_string(&mut self, key: &str) -> Lookup<String>;

    /// Fill `candidate` from the node under `key`.
    ///
    /// The candidate's class name must match the stored type. Yields `None`
    /// unless the status is `Found`.
    fn fill_object(
        &mut self,
        key: &str,
        candidate: Box<dyn Archivable>,
    ) -> Lookup<Option<Box<dyn Archivable>>>;

    /// Read the array under `key`, calling `factory` once per slot.
    ///
    /// Slots that cannot be read are left out; the status reports the worst
    /// failure seen, ignoring missing slots.
    fn fill_array(
        &mut self,
        key: &str,
        factory: &mut dyn FnMut() -> Box<dyn Archivable>,
    ) -> Lookup<Option<Vec<Box<dyn Archivable>>>>;

    /// Element count recorded on the array under `key`.
    fn get_array_count(&mut self, key: &str) -> Lookup<u64>;
}

/// Typed helpers over [`Serializer`].
pub trait SerializerExt: Serializer {
    /// Write a homogeneous slice as an array.
    fn set_objects<T: Archivable>(&mut self, objects: &[T], key: &str) {
        let refs: Vec<&dyn Archivable> = objects.iter().map(|o| o as &dyn Archivable).collect();
        self.set_array(&refs, key);
    }
}

impl<S: Serializer + ?Sized> SerializerExt for S {}

/// Typed helpers over [`Deserializer`].
pub trait DeserializerExt: Deserializer {
    /// Read a `T` stored under `key`, starting from `T::default()`.
    fn get_object<T: Archivable + Default>(&mut self, key: &str) -> Lookup<Option<T>> {
        self.fill_object(key, Box::new(T::default()))
            .map(|object| object.map(downcast::<T>))
    }

    /// Read an array of `T` stored under `key`.
    fn get_array<T: Archivable + Default>(&mut self, key: &str) -> Lookup<Option<Vec<T>>> {
        let mut factory = || Box::new(T::default()) as Box<dyn Archivable>;
        self.fill_array(key, &mut factory)
            .map(|items| items.map(|items| items.into_iter().map(downcast::<T>).collect()))
    }
}

impl<D: Deserializer + ?Sized> DeserializerExt for D {}
