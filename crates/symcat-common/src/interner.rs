//! String Interner for declaration and member names.
//!
//! Every catalog interns its names into its own pool and passes around u32
//! indices (Atoms). Builtin stubs repeat a small vocabulary ("init",
//! "length", "==", "ToString") across hundreds of declarations, so member
//! tables and overload keys compare integers instead of strings.
//!
//! An interner is only written while its catalog is being constructed. Once
//! the catalog is published it is read-only and can be shared across threads.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const COMMON_STRINGS: &[&str] = &[
    // Constructors and conversions
    "init",
    "new",
    "__construct",
    "constructor",
    "to_s",
    "toString",
    "ToString",
    "description",
    // Sizes
    "length",
    "count",
    "size",
    "Count",
    "Length",
    "isEmpty",
    "empty?",
    // Equality and ordering
    "==",
    "!=",
    "<",
    "<=",
    ">",
    ">=",
    "Equals",
    "CompareTo",
    "hash",
    "GetHashCode",
    // Iteration
    "each",
    "map",
    "filter",
    "forEach",
    "GetEnumerator",
    "next",
    // Common type names
    "Object",
    "String",
    "Int",
    "Bool",
    "Array",
    "Self",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use symcat_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2); // Same atom for same string
/// assert_eq!(interner.resolve(a1), "hello");
/// ```
#[derive(Clone, Debug)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up a string without interning it.
    ///
    /// Queries against a published catalog use this: a name that was never
    /// interned cannot name anything in the catalog.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Pre-intern names that nearly every builtin catalog uses.
    pub fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod tests;
