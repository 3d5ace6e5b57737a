//! String interning for identifiers, operator names, and script names.
//!
//! The interner stores each unique string once and hands out compact
//! [`StringId`] indices. Scope frames and the overload registry are keyed by
//! `StringId`, so name lookups during evaluation are integer comparisons;
//! resolving back to `&str` happens only for error messages and display
//! output.

use ahash::RandomState;
use indexmap::IndexSet;

/// Index into the interner's storage.
///
/// Uses `u32` to save space (4 bytes vs 8 bytes for `usize`). This limits us
/// to ~4 billion unique strings, which is more than sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Returns the raw index value.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Insertion-ordered store of unique strings.
///
/// A `StringId` is the insertion index of its string, so ids handed out once
/// stay valid for the lifetime of the interner.
#[derive(Debug, Default)]
pub(crate) struct Interner {
    strings: IndexSet<Box<str>, RandomState>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning the id of the existing entry if present.
    pub fn intern(&mut self, string: &str) -> StringId {
        if let Some(index) = self.strings.get_index_of(string) {
            return StringId(index.try_into().expect("interner overflow"));
        }
        let (index, _) = self.strings.insert_full(Box::from(string));
        StringId(index.try_into().expect("interner overflow"))
    }

    /// Returns the id of a previously interned string, if any.
    pub fn get(&self, string: &str) -> Option<StringId> {
        self.strings
            .get_index_of(string)
            .map(|index| StringId(index.try_into().expect("interner overflow")))
    }

    /// Resolves an id back to its string.
    ///
    /// # Panics
    /// Panics if the id did not come from this interner.
    pub fn resolve(&self, id: StringId) -> &str {
        self.strings
            .get_index(id.index())
            .expect("StringId from a foreign interner")
    }
}
