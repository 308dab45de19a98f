//! Interned, case-preserving string handles.
//!
//! Every class, method, property, signal and constant identifier in the
//! registry is a [`Name`]. Names are interned in a process-wide table:
//! equal text always yields the same allocation, so equality is a pointer
//! comparison and the 64-bit hash is computed exactly once, at intern time.
//!
//! Ordering is byte-wise on the underlying text. This is deliberately not
//! locale-aware: the API fingerprint sorts members with this ordering and
//! must produce identical results on every machine.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::hashing::hash_str64;

struct NameData {
    text: Box<str>,
    hash: u64,
}

/// An interned identifier.
///
/// Cheap to clone (one `Arc` bump), cheap to compare (pointer equality),
/// and carries a precomputed stable 64-bit hash.
#[derive(Clone)]
pub struct Name(Arc<NameData>);

static INTERNER: Lazy<Mutex<FxHashMap<Box<str>, Name>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

impl Name {
    /// Intern `text` and return its handle.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        let mut table = INTERNER.lock();
        if let Some(existing) = table.get(text) {
            return existing.clone();
        }
        let name = Name(Arc::new(NameData {
            text: Box::from(text),
            hash: hash_str64(text),
        }));
        table.insert(Box::from(text), name.clone());
        name
    }

    /// The empty name. Used as "no parent", "no setter", and so on.
    pub fn none() -> Self {
        Self::new("")
    }

    /// True for the empty name.
    pub fn is_none(&self) -> bool {
        self.0.text.is_empty()
    }

    /// The interned text.
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// The stable 64-bit hash computed at intern time.
    pub fn hash64(&self) -> u64 {
        self.0.hash
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.text.cmp(&other.0.text)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::none()
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_yields_pointer_equality() {
        let a = Name::new("Sprite");
        let b = Name::new("Sprite");
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_distinct_handles() {
        assert_ne!(Name::new("Node"), Name::new("node"));
    }

    #[test]
    fn hash_matches_string_hash() {
        let n = Name::new("position");
        assert_eq!(n.hash64(), hash_str64("position"));
    }

    #[test]
    fn none_is_empty_and_default() {
        assert!(Name::none().is_none());
        assert_eq!(Name::default(), Name::none());
        assert!(!Name::new("x").is_none());
    }

    #[test]
    fn ordering_is_bytewise() {
        let mut names = vec![Name::new("Zebra"), Name::new("Alpha"), Name::new("alpha")];
        names.sort();
        let text: Vec<&str> = names.iter().map(Name::as_str).collect();
        assert_eq!(text, ["Alpha", "Zebra", "alpha"]);
    }
}
