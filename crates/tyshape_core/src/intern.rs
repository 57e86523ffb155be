//! Name interning.
//!
//! Property names, type parameter names and declaration names are interned
//! once per checking run so that comparing two names is an integer compare.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned name. A `u32`-sized handle into a [`NameTable`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(Spur);

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

/// Thread-safe name table.
///
/// Cloning is cheap and shares the underlying storage, so a table can be
/// handed to the type table and the diagnostics renderer of the same run.
#[derive(Clone)]
pub struct NameTable {
    rodeo: Arc<ThreadedRodeo>,
}

impl NameTable {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern a name, returning the existing handle if it was seen before.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        Name(self.rodeo.get_or_intern(s))
    }

    #[inline]
    pub fn intern_static(&self, s: &'static str) -> Name {
        Name(self.rodeo.get_or_intern_static(s))
    }

    /// Look up a name without interning it.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Name> {
        self.rodeo.get(s).map(Name)
    }

    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        self.rodeo.resolve(&name.0)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let names = NameTable::new();
        let tag = names.intern("tag");
        let again = names.intern("tag");
        let value = names.intern("value");

        assert_eq!(tag, again);
        assert_ne!(tag, value);
        assert_eq!(names.resolve(tag), "tag");
        assert_eq!(names.resolve(value), "value");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_get_does_not_intern() {
        let names = NameTable::new();
        assert!(names.get("ext").is_none());
        assert!(names.is_empty());
        let ext = names.intern("ext");
        assert_eq!(names.get("ext"), Some(ext));
    }

    #[test]
    fn test_clones_share_storage() {
        let names = NameTable::new();
        let shared = names.clone();
        let t = names.intern_static("T");
        assert_eq!(shared.resolve(t), "T");
        assert_eq!(shared.intern("T"), t);
    }
}
