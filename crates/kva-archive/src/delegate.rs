//! Hooks that let a caller observe and steer object archiving.

use crate::object::Archivable;

/// Callbacks invoked around each object the archive writes or reads.
///
/// Every method has a permissive default, so implementors override only the
/// hooks they need.
pub trait ArchiveDelegate {
    /// Called before `object` is written. Return `false` to skip it; nothing
    /// is written for a skipped object.
    fn pre_serialize_object(&mut self, _object: &dyn Archivable) -> bool {
        true
    }

    /// Called after `object` and all of its fields were written.
    fn after_serialize_object(&mut self, _object: &dyn Archivable) {}

    /// Offered the freshly created instance before it is filled.
    ///
    /// The returned instance is filled instead. It must have the same
    /// concrete type as `candidate`; the archive panics otherwise.
    fn handle_instance(&mut self, candidate: Box<dyn Archivable>) -> Box<dyn Archivable> {
        candidate
    }

    /// Called after `object` was filled. Return `false` to reject it; the
    /// lookup then reports `Denied`.
    fn after_deserialize_object(&mut self, _object: &mut dyn Archivable) -> bool {
        true
    }
}

/// Delegate used when none is installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDelegate;

impl ArchiveDelegate for NoopDelegate {}

/// The archive's delegate: the caller's, or the no-op default.
pub(crate) enum DelegateSlot<'d> {
    Default(NoopDelegate),
    Borrowed(&'d mut dyn ArchiveDelegate),
}

impl<'d> DelegateSlot<'d> {
    pub(crate) fn get(&mut self) -> &mut dyn ArchiveDelegate {
        match self {
            Self::Default(noop) => noop,
            Self::Borrowed(delegate) => &mut **delegate,
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        matches!(self, Self::Borrowed(_))
    }
}

impl Default for DelegateSlot<'_> {
    fn default() -> Self {
        Self::Default(NoopDelegate)
    }
}
