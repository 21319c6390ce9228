use std::str::FromStr;

use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use super::{
    IntersectionSpec, Segment, SelectionOp, SelectionSpec, UnionSpec, VersionSpec, parse,
    parse_ruby_style_multi,
};
use crate::{Error, Set, Version};

impl VersionSpec {
    /// The versions matching this boundary on its own:
    /// concrete portions must be equal and wildcards match anything.
    ///
    /// A boundary without wildcards matches exactly one version.
    pub fn to_set(&self) -> Set {
        let lower = self.constrain_to_zero();
        match self.first_unconstrained() {
            None => Set::only(lower),
            Some(Segment::Major) => Set::RELEASED.union(&Set::PRERELEASE),
            Some(_) => below(lower, self.wildcard_upper_bound()),
        }
    }
}

impl SelectionSpec {
    /// The versions meeting this selection.
    pub fn to_set(&self) -> Set {
        let boundary = self.boundary();
        let lower = boundary.constrain_to_zero();
        match self.operator() {
            SelectionOp::Equal => Set::only(lower),
            SelectionOp::NotEqual => Set::ALL.subtract(&Set::only(lower)),
            SelectionOp::Greater => Set::newer_than(lower),
            SelectionOp::GreaterOrEqual => Set::at_least(lower),
            SelectionOp::Less => Set::older_than(lower),
            SelectionOp::LessOrEqual => Set::at_most(lower),
            SelectionOp::Match => boundary.to_set(),
            SelectionOp::CompatiblePatch => below(lower, boundary.bump(Segment::Minor)),
            SelectionOp::CompatibleMinor => below(lower, boundary.bump(Segment::Major)),
        }
    }
}

/// At least `lower`, and older than `upper` if there is one.
fn below(lower: Version, upper: Option<Version>) -> Set {
    match upper {
        Some(upper) => Set::at_least(lower).intersection(&Set::older_than(upper)),
        None => Set::at_least(lower),
    }
}

impl IntersectionSpec {
    /// The versions meeting every selection. An empty intersection allows everything.
    pub fn to_set(&self) -> Set {
        if self.is_empty() {
            return Set::ALL;
        }
        Set::intersect_all(self.iter().map(SelectionSpec::to_set))
    }
}

impl UnionSpec {
    /// The versions meeting any of the intersections.
    pub fn to_set(&self) -> Set {
        Set::union_all(self.iter().map(IntersectionSpec::to_set))
    }
}

/// Compile a parsed constraint into the set of versions meeting it.
///
/// Unlike [`meeting_constraints_string`], prerelease versions are not filtered out.
pub fn meeting_constraints(spec: &UnionSpec) -> Set {
    spec.to_set()
}

/// Parse a constraint in the canonical grammar and compile it.
///
/// Prerelease versions are excluded unless a boundary in the constraint names that exact prerelease,
/// so `>=1.0.0` does not admit `2.0.0-beta.1` but `>=1.0.0-beta.1` admits `1.0.0-beta.1`.
///
/// ```
/// # use version_set::{Version, constraint::meeting_constraints_string};
/// let set = meeting_constraints_string("^1.2 || 2.0.0-rc.1").expect("must parse");
/// assert!(set.has(&Version::parse("1.9.0")?));
/// assert!(set.has(&Version::parse("2.0.0-rc.1")?));
/// assert!(!set.has(&Version::parse("1.3.0-beta.1")?));
/// # Ok::<(), version_set::Error>(())
/// ```
#[tracing::instrument]
pub fn meeting_constraints_string(input: &str) -> Result<Set, Error> {
    let spec = parse(input)?;
    let selections = spec.iter().flat_map(|intersection| intersection.iter());
    Ok(released_unless_requested(spec.to_set(), selections))
}

/// Parse a comma-separated Rubygems-style constraint and compile it.
///
/// Prereleases are filtered the same way as [`meeting_constraints_string`].
#[tracing::instrument]
pub fn meeting_constraints_string_ruby(input: &str) -> Result<Set, Error> {
    let spec = parse_ruby_style_multi(input)?;
    Ok(released_unless_requested(spec.to_set(), spec.iter()))
}

/// Restrict `set` to released versions, plus the prereleases named by `selections`.
fn released_unless_requested<'a>(
    set: Set,
    selections: impl IntoIterator<Item = &'a SelectionSpec>,
) -> Set {
    let requested = selections
        .into_iter()
        .map(SelectionSpec::boundary)
        .filter(|boundary| !boundary.prerelease().is_empty())
        .map(VersionSpec::constrain_to_zero)
        .collect_vec();

    if requested.is_empty() {
        return Set::RELEASED.intersection(&set);
    }

    debug!(requested = %requested.iter().join(", "), "admitting explicitly named prereleases");
    Set::RELEASED
        .union(&Set::selection(requested))
        .intersection(&set)
}

impl FromStr for Set {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        meeting_constraints_string(s)
    }
}

impl<'de> Deserialize<'de> for Set {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        meeting_constraints_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Create a [`Set`] from a constraint literal known to be valid.
///
/// ```
/// # use version_set::{Set, version};
/// let set = version_set::set!(">=1.0.0 <2.0.0");
/// assert!(set.has(&version!(1, 2, 3)));
///
/// let set = version_set::set!(ruby => "~> 1.2, != 1.4.0");
/// assert!(set.has(&version!(1, 3, 0)));
/// assert!(!set.has(&version!(1, 4, 0)));
/// ```
///
/// Panics if the literal does not parse, so it must never be used with untrusted input.
#[macro_export]
macro_rules! set {
    (ruby => $input:expr) => {
        $crate::constraint::meeting_constraints_string_ruby($input)
            .expect("parse ruby-style constraint literal")
    };
    ($input:expr) => {
        $crate::constraint::meeting_constraints_string($input).expect("parse constraint literal")
    };
}
