//! Tag sets scoping cache entries.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered, de-duplicated set of cache tag names.
///
/// An empty set means "untagged": entries live in the global key space and
/// there is nothing to invalidate by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Create an empty (untagged) set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `tag` is a member.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    /// Iterate tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}
