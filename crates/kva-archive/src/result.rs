//! Read-path outcomes.

use std::fmt;

/// Outcome of a single archive lookup.
///
/// Variants are ordered from best to worst. When outcomes are combined (see
/// [`absorb`](Self::absorb)) a worse outcome replaces a better one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArchivingResult {
    /// The node exists with the requested type and was read.
    Found,
    /// The node exists with the requested type but its content is unusable.
    Undefined,
    /// A node exists under the key, but with a different type.
    BadType,
    /// No node exists under the key.
    NotFound,
    /// The node was read, but the delegate refused the instance.
    Denied,
}

impl ArchivingResult {
    /// Returns `true` for [`Found`](Self::Found).
    pub fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }

    /// Fold an array element's outcome into an aggregate.
    ///
    /// The element replaces the aggregate if it is worse, except that a
    /// missing slot (`NotFound`) never demotes the aggregate.
    pub fn absorb(self, element: Self) -> Self {
        if self < element && element != Self::NotFound {
            element
        } else {
            self
        }
    }
}

impl fmt::Display for ArchivingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::Undefined => write!(f, "undefined"),
            Self::BadType => write!(f, "bad type"),
            Self::NotFound => write!(f, "not found"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// A looked-up value together with the outcome of the lookup.
///
/// On any outcome other than `Found`, `value` holds the type's default
/// (zero, empty, or `None`), so callers that ignore `status` still get a
/// usable value.
#[derive(Clone, Debug, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    pub status: ArchivingResult,
}

impl<T> Lookup<T> {
    pub fn new(value: T, status: ArchivingResult) -> Self {
        Self { value, status }
    }

    /// A successful lookup.
    pub fn found(value: T) -> Self {
        Self::new(value, ArchivingResult::Found)
    }

    pub fn is_found(&self) -> bool {
        self.status.is_found()
    }

    /// Drop the status and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transform the value, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        Lookup::new(f(self.value), self.status)
    }
}

impl<T: Default> Lookup<T> {
    /// A failed lookup carrying the default value.
    pub fn missing(status: ArchivingResult) -> Self {
        Self::new(T::default(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::ArchivingResult::*;
    use super::*;

    #[test]
    fn ordering_runs_best_to_worst() {
        assert!(Found < Undefined);
        assert!(Undefined < BadType);
        assert!(BadType < NotFound);
        assert!(NotFound < Denied);
    }

    #[test]
    fn worse_outcomes_overwrite() {
        assert_eq!(Found.absorb(BadType), BadType);
        assert_eq!(BadType.absorb(Denied), Denied);
        assert_eq!(Found.absorb(Undefined), Undefined);
    }

    #[test]
    fn better_outcomes_do_not_overwrite() {
        assert_eq!(Denied.absorb(BadType), Denied);
        assert_eq!(BadType.absorb(Found), BadType);
    }

    #[test]
    fn not_found_never_demotes() {
        assert_eq!(Found.absorb(NotFound), Found);
        assert_eq!(BadType.absorb(NotFound), BadType);
    }

    #[test]
    fn missing_lookup_carries_default() {
        let l: Lookup<i32> = Lookup::missing(NotFound);
        assert_eq!(l.value, 0);
        assert!(!l.is_found());
        assert_eq!(Lookup::found(3).map(|v| v * 2).into_value(), 6);
    }
}
