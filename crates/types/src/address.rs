//! Hierarchical node addresses.

use std::fmt;

/// Separator between address segments.
const SEPARATOR: char = '.';

/// A dotted-path identifier locating a node or subnode.
///
/// The first segment names the root node that owns the dispatch worker for
/// the whole hierarchy; the full path names the handling node within it. By
/// convention a subnode's address is its parent's address with one more
/// segment appended, e.g. `"le"` owns `"le.pfd"`.
///
/// Equality is string equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Create an address from a dotted path.
    ///
    /// # Panics
    /// Panics if the path is empty or contains an empty segment
    /// (`""`, `"a..b"`, `"a."`).
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        assert!(
            !path.is_empty() && path.split(SEPARATOR).all(|s| !s.is_empty()),
            "address segments must be non-empty: {path:?}"
        );
        Address(path)
    }

    /// The full dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first segment: the root node owning this hierarchy.
    pub fn root(&self) -> Address {
        match self.0.split_once(SEPARATOR) {
            Some((root, _)) => Address(root.to_owned()),
            None => self.clone(),
        }
    }

    /// Append a segment, producing a child address.
    ///
    /// # Panics
    /// Panics if `segment` is empty or contains a separator.
    pub fn child(&self, segment: &str) -> Address {
        assert!(
            !segment.is_empty() && !segment.contains(SEPARATOR),
            "child segment must be a single non-empty segment: {segment:?}"
        );
        Address(format!("{}{SEPARATOR}{segment}", self.0))
    }

    /// Whether this address is a root (single segment).
    pub fn is_root(&self) -> bool {
        !self.0.contains(SEPARATOR)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl From<&str> for Address {
    fn from(path: &str) -> Self {
        Address::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_of_single_segment_is_itself() {
        let a = Address::new("server");
        assert_eq!(a.root(), a);
        assert!(a.is_root());
    }

    #[test]
    fn root_of_nested_address_is_first_segment() {
        let a = Address::new("le.pfd.inner");
        assert_eq!(a.root(), Address::new("le"));
        assert!(!a.is_root());
    }

    #[test]
    fn child_appends_segment() {
        let a = Address::new("le");
        assert_eq!(a.child("pfd"), Address::new("le.pfd"));
        assert_eq!(a.child("pfd").child("x").as_str(), "le.pfd.x");
    }

    #[test]
    fn child_preserves_root() {
        let a = Address::new("le");
        assert_eq!(a.child("pfd").root(), a.root());
    }

    #[test]
    fn equality_is_string_equality() {
        assert_eq!(Address::new("a.b"), Address::new("a.b"));
        assert_ne!(Address::new("a.b"), Address::new("a.c"));
    }

    #[test]
    #[should_panic]
    fn empty_segment_rejected() {
        let _ = Address::new("a..b");
    }

    #[test]
    #[should_panic]
    fn empty_path_rejected() {
        let _ = Address::new("");
    }
}
