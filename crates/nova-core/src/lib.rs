//! Core shared types for Nova's semantic analysis crates.
//!
//! This crate is intentionally small: names, spans and the name-lookup trait
//! that both the classpath index and the in-memory type store implement.

mod name;

pub use name::{Name, PackageName, QualifiedName, TypeName};

use std::fmt;

/// A byte-span into a source string.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

/// Name-level view of a set of compiled types.
///
/// Implementations answer "does this binary name exist" and "which classes
/// live in this package" without materializing class members. Binary names
/// use `.` between packages and `$` between nesting levels
/// (`java.util.Map$Entry`).
pub trait TypeIndex {
    fn class_exists(&self, binary_name: &str) -> bool;

    /// Simple (binary) names of the classes directly inside `package`.
    ///
    /// Nested classes are reported with their `$` suffix (`Map$Entry`).
    fn package_classes(&self, package: &str) -> Vec<String>;

    fn package_exists(&self, package: &str) -> bool {
        !self.package_classes(package).is_empty()
    }
}

impl<T: TypeIndex + ?Sized> TypeIndex for &T {
    fn class_exists(&self, binary_name: &str) -> bool {
        (**self).class_exists(binary_name)
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        (**self).package_classes(package)
    }

    fn package_exists(&self, package: &str) -> bool {
        (**self).package_exists(package)
    }
}
