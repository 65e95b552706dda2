//! String interning for macro and rule names.
//!
//! Names are interned once on entry and compared as small copyable
//! keys everywhere inside the compiler. The interner is thread-safe
//! because clause validation interns macro references from inside
//! the parallel rule-compilation region.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;

/// A lightweight handle to an interned name. Cheap to copy, `O(1)`
/// to compare; resolve through the [`Interner`] that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternedStr(Spur);

impl fmt::Debug for InternedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedStr({:?})", self.0)
    }
}

/// A thread-safe name interner.
pub struct Interner {
    rodeo: ThreadedRodeo,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a name, returning its key. Interning the same text
    /// twice returns the same key.
    pub fn intern(&self, s: &str) -> InternedStr {
        InternedStr(self.rodeo.get_or_intern(s))
    }

    /// The key for an already-interned name, if any.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<InternedStr> {
        self.rodeo.get(s).map(InternedStr)
    }

    /// Resolve a key back to its text.
    ///
    /// # Panics
    ///
    /// Panics if the key was not created by this interner.
    #[must_use]
    pub fn resolve(&self, key: InternedStr) -> &str {
        self.rodeo.resolve(&key.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.rodeo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups() {
        let interner = Interner::new();
        let a = interner.intern("digit");
        let b = interner.intern("digit");
        let c = interner.intern("alpha");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "digit");
        assert_eq!(interner.resolve(c), "alpha");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_get_before_and_after() {
        let interner = Interner::new();
        assert!(interner.get("ws").is_none());
        let key = interner.intern("ws");
        assert_eq!(interner.get("ws"), Some(key));
    }
}
