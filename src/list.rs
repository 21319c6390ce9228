use std::fmt;

use derive_more::{Deref, From, IntoIterator};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Set, Version};

/// An ordered, finite sequence of versions.
///
/// Usually produced by [`Set::list`], or collected from the available versions of a package
/// so that the newest acceptable one can be selected:
///
/// ```
/// # use version_set::{List, Set, version};
/// let available = List::from(vec![version!(1, 0, 0), version!(1, 2, 0), version!(2, 0, 0)]);
/// let acceptable = version_set::set!("^1.0");
/// assert_eq!(available.newest_in(&acceptable), Some(&version!(1, 2, 0)));
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Deref, From, IntoIterator,
)]
#[into_iterator(owned, ref)]
pub struct List(Vec<Version>);

impl List {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a version.
    pub fn push(&mut self, version: Version) {
        self.0.push(version);
    }

    /// Sort in ascending order.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Remove consecutive duplicates; sort first to remove all duplicates.
    pub fn dedup(&mut self) {
        self.0.dedup();
    }

    /// The versions in this list that are members of `set`, in the same order.
    pub fn filter(&self, set: &Set) -> List {
        self.0.iter().filter(|version| set.has(version)).cloned().collect()
    }

    /// A finite set of exactly the versions in this list.
    pub fn set(&self) -> Set {
        Set::selection(self.0.iter().cloned())
    }

    /// The version with the highest precedence, if any.
    ///
    /// Among versions of equal precedence that differ only in metadata, the last is returned.
    pub fn newest(&self) -> Option<&Version> {
        self.0.iter().max_by(|a, b| a.precedence(b))
    }

    /// The newest version that is a member of `set`, if any.
    pub fn newest_in(&self, set: &Set) -> Option<&Version> {
        self.0
            .iter()
            .filter(|version| set.has(version))
            .max_by(|a, b| a.precedence(b))
    }

    /// Every version sharing the highest precedence in this list.
    ///
    /// More than one version is returned only when they differ in metadata alone.
    pub fn newest_list(&self) -> List {
        let Some(newest) = self.newest() else {
            return List::new();
        };
        self.0
            .iter()
            .filter(|version| version.precedence(newest).is_eq())
            .cloned()
            .collect()
    }
}

impl FromIterator<Version> for List {
    fn from_iter<T: IntoIterator<Item = Version>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Version> for List {
    fn extend<T: IntoIterator<Item = Version>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}
