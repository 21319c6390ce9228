use std::{collections::BTreeSet, fmt, sync::Arc};

use enum_assoc::Assoc;
use itertools::Itertools;

use crate::{List, Version};

/// A set of versions, usually created by parsing a constraint string.
///
/// Sets may be infinite: membership is tested with [`Set::has`] without ever
/// enumerating the members. Finite sets can additionally be listed with [`Set::list`].
///
/// Sets are immutable; combinators return new sets and share their operands.
///
/// ```
/// # use version_set::{Set, Version};
/// let set = Set::at_least(Version::new(1, 0, 0)).intersection(&Set::older_than(Version::new(2, 0, 0)));
/// assert!(set.has(&Version::new(1, 5, 0)));
/// assert!(!set.has(&Version::new(2, 0, 0)));
/// assert!(!set.is_finite());
/// ```
///
/// The special version [`Version::UNSPECIFIED`] is a member only of [`Set::ALL`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Set(Kind);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Kind {
    /// Every version, or no version.
    Extreme(bool),

    /// Exactly the listed versions.
    Exact(BTreeSet<Version>),

    /// Versions on one side of a boundary, compared by precedence.
    Bound(BoundOp, Version),

    Union(Arc<[Set]>),
    Intersection(Arc<[Set]>),
    Subtract(Arc<Set>, Arc<Set>),

    /// Versions without a prerelease tag, or versions with one.
    Released(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Assoc)]
#[func(const fn constructor(&self) -> &'static str)]
enum BoundOp {
    #[assoc(constructor = "newer_than")]
    Greater,
    #[assoc(constructor = "at_least")]
    GreaterOrEqual,
    #[assoc(constructor = "older_than")]
    Less,
    #[assoc(constructor = "at_most")]
    LessOrEqual,
}

impl Set {
    /// Every version, including [`Version::UNSPECIFIED`].
    pub const ALL: Set = Set(Kind::Extreme(true));

    /// No versions at all.
    pub const NONE: Set = Set(Kind::Extreme(false));

    /// Every version without a prerelease tag.
    pub const RELEASED: Set = Set(Kind::Released(true));

    /// Every version with a prerelease tag.
    pub const PRERELEASE: Set = Set(Kind::Released(false));

    /// Versions below `1.0.0`, conventionally used for initial development.
    pub const INITIAL_DEVELOPMENT: Set = Set(Kind::Bound(BoundOp::Less, Version::new(1, 0, 0)));

    /// A finite set containing only the given version.
    pub fn only(version: Version) -> Set {
        Set(Kind::Exact(BTreeSet::from([version])))
    }

    /// A finite set containing exactly the given versions.
    pub fn selection(versions: impl IntoIterator<Item = Version>) -> Set {
        Set(Kind::Exact(versions.into_iter().collect()))
    }

    /// Versions with precedence greater than or equal to `version`.
    pub fn at_least(version: Version) -> Set {
        Set(Kind::Bound(BoundOp::GreaterOrEqual, version))
    }

    /// Versions with precedence less than or equal to `version`.
    pub fn at_most(version: Version) -> Set {
        Set(Kind::Bound(BoundOp::LessOrEqual, version))
    }

    /// Versions with precedence strictly greater than `version`.
    pub fn newer_than(version: Version) -> Set {
        Set(Kind::Bound(BoundOp::Greater, version))
    }

    /// Versions with precedence strictly less than `version`.
    pub fn older_than(version: Version) -> Set {
        Set(Kind::Bound(BoundOp::Less, version))
    }

    /// Versions in any of the given sets.
    ///
    /// The result is finite only if every given set is finite.
    pub fn union_all(sets: impl IntoIterator<Item = Set>) -> Set {
        let mut members = Vec::new();
        for set in sets {
            match set {
                Set(Kind::Extreme(false)) => {}
                Set(Kind::Union(nested)) => members.extend(nested.iter().cloned()),
                set => members.push(set),
            }
        }

        match members.len() {
            0 => Set::NONE,
            1 => members.pop().unwrap_or(Set::NONE),
            _ => Set(Kind::Union(members.into())),
        }
    }

    /// Versions in every one of the given sets.
    ///
    /// The result is finite if any given set is finite.
    /// Intersecting no sets at all gives [`Set::NONE`].
    pub fn intersect_all(sets: impl IntoIterator<Item = Set>) -> Set {
        let mut sets = sets.into_iter().peekable();
        if sets.peek().is_none() {
            return Set::NONE;
        }

        let mut members = Vec::new();
        for set in sets {
            match set {
                Set(Kind::Extreme(true)) => {}
                Set(Kind::Extreme(false)) => return Set::NONE,
                Set(Kind::Intersection(nested)) => members.extend(nested.iter().cloned()),
                set => members.push(set),
            }
        }

        match members.len() {
            0 => Set::ALL,
            1 => members.pop().unwrap_or(Set::ALL),
            _ => Set(Kind::Intersection(members.into())),
        }
    }

    /// Versions in either this set or `other`.
    pub fn union(&self, other: &Set) -> Set {
        Set::union_all([self.clone(), other.clone()])
    }

    /// Versions in both this set and `other`.
    pub fn intersection(&self, other: &Set) -> Set {
        Set::intersect_all([self.clone(), other.clone()])
    }

    /// Versions in this set but not in `other`.
    ///
    /// If this set is finite, so is the result.
    pub fn subtract(&self, other: &Set) -> Set {
        if other.is_none() || self.is_none() {
            return self.clone();
        }
        if other.is_all() {
            return Set::NONE;
        }
        Set(Kind::Subtract(Arc::new(self.clone()), Arc::new(other.clone())))
    }

    /// Whether this is the universal set.
    pub fn is_all(&self) -> bool {
        matches!(self.0, Kind::Extreme(true))
    }

    /// Whether this is the empty set by construction.
    ///
    /// A set built from contradictory constraints may still have no members
    /// without being [`Set::NONE`].
    pub fn is_none(&self) -> bool {
        matches!(self.0, Kind::Extreme(false))
    }

    /// Whether `version` is a member of this set.
    pub fn has(&self, version: &Version) -> bool {
        // Any constraint at all excludes the unspecified version.
        if version.is_unspecified() {
            return self.is_all();
        }
        self.contains(version)
    }

    fn contains(&self, version: &Version) -> bool {
        match &self.0 {
            Kind::Extreme(all) => *all,
            Kind::Exact(versions) => versions.contains(version),
            Kind::Bound(op, boundary) => {
                let ordering = version.precedence(boundary);
                match op {
                    BoundOp::Greater => ordering.is_gt(),
                    BoundOp::GreaterOrEqual => ordering.is_ge(),
                    BoundOp::Less => ordering.is_lt(),
                    BoundOp::LessOrEqual => ordering.is_le(),
                }
            }
            Kind::Union(sets) => sets.iter().any(|set| set.contains(version)),
            Kind::Intersection(sets) => sets.iter().all(|set| set.contains(version)),
            Kind::Subtract(from, sub) => from.contains(version) && !sub.contains(version),
            Kind::Released(released) => version.is_prerelease() != *released,
        }
    }

    /// Whether the members of this set can be listed.
    ///
    /// This is structural: an intersection of two infinite sets that happen to share
    /// no members is still reported as infinite.
    pub fn is_finite(&self) -> bool {
        match &self.0 {
            Kind::Extreme(all) => !all,
            Kind::Exact(_) => true,
            Kind::Bound(..) | Kind::Released(_) => false,
            Kind::Union(sets) => sets.iter().all(Set::is_finite),
            Kind::Intersection(sets) => sets.is_empty() || sets.iter().any(Set::is_finite),
            Kind::Subtract(from, _) => from.is_finite(),
        }
    }

    /// The members of this set in ascending order, or `None` if the set is infinite.
    pub fn list(&self) -> Option<List> {
        let members = self.members()?;
        Some(members.into_iter().sorted().dedup().collect())
    }

    fn members(&self) -> Option<Vec<Version>> {
        match &self.0 {
            Kind::Extreme(true) | Kind::Bound(..) | Kind::Released(_) => None,
            Kind::Extreme(false) => Some(Vec::new()),
            Kind::Exact(versions) => Some(
                versions
                    .iter()
                    .filter(|version| !version.is_unspecified())
                    .cloned()
                    .collect(),
            ),
            Kind::Union(sets) => sets
                .iter()
                .map(Set::members)
                .collect::<Option<Vec<_>>>()
                .map(|lists| lists.concat()),
            Kind::Intersection(_) if !self.is_finite() => None,
            Kind::Intersection(sets) => Some(
                sets.iter()
                    .filter_map(Set::members)
                    .flatten()
                    .filter(|version| self.contains(version))
                    .collect(),
            ),
            Kind::Subtract(from, sub) => Some(
                from.members()?
                    .into_iter()
                    .filter(|version| !sub.contains(version))
                    .collect(),
            ),
        }
    }

    /// Whether this set is finite and contains exactly `version` and nothing else.
    pub fn exactly(&self, version: &Version) -> bool {
        self.list()
            .is_some_and(|list| list.len() == 1 && list.iter().all(|member| member.same(version)))
    }

    /// Whether this set is finite and `version` is one of its members.
    ///
    /// A weaker form of [`Set::exactly`] that allows other members.
    pub fn selects(&self, version: &Version) -> bool {
        self.list()
            .is_some_and(|list| list.iter().any(|member| member.same(version)))
    }

    /// The versions this set explicitly names, restricted to those it still contains.
    ///
    /// A version is requested when an exact selection names it,
    /// for example `1.0.0` in `>=2.0.0 || 1.0.0`.
    /// The result is always finite.
    pub fn all_requested(&self) -> Set {
        match &self.0 {
            Kind::Exact(_) => self.clone(),
            Kind::Union(sets) => Set::union_all(sets.iter().map(Set::all_requested)),
            Kind::Intersection(sets) => {
                Set::union_all(sets.iter().map(Set::all_requested)).intersection(self)
            }
            Kind::Subtract(from, sub) => from.all_requested().subtract(sub),
            Kind::Extreme(_) | Kind::Bound(..) | Kind::Released(_) => Set::NONE,
        }
    }

    /// This set without any prerelease versions, except those it explicitly requests.
    pub fn without_unrequested_prereleases(&self) -> Set {
        Set::union_all([Set::RELEASED, self.all_requested()]).intersection(self)
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Extreme(true) => f.write_str("Set::ALL"),
            Kind::Extreme(false) => f.write_str("Set::NONE"),
            Kind::Released(true) => f.write_str("Set::RELEASED"),
            Kind::Released(false) => f.write_str("Set::PRERELEASE"),
            Kind::Exact(versions) if versions.len() == 1 => {
                write!(f, "Set::only({})", versions.iter().format(""))
            }
            Kind::Exact(versions) => write!(f, "Set::selection([{}])", versions.iter().format(", ")),
            Kind::Bound(op, version) => write!(f, "Set::{}({version})", op.constructor()),
            Kind::Union(sets) => write!(f, "Set::union_all([{:?}])", sets.iter().format(", ")),
            Kind::Intersection(sets) => {
                write!(f, "Set::intersect_all([{:?}])", sets.iter().format(", "))
            }
            Kind::Subtract(from, sub) => write!(f, "{from:?}.subtract({sub:?})"),
        }
    }
}
