//! # Version Constraints
//!
//! Constraint strings are parsed into a small tree of specs,
//! which are then compiled into a [`Set`](crate::Set) of versions:
//!
//! - [`VersionSpec`]: a boundary version, which may contain wildcards.
//! - [`SelectionSpec`]: a single operator and boundary, like `>=1.2.0`.
//! - [`IntersectionSpec`]: selections that must all hold.
//! - [`UnionSpec`]: intersections of which at least one must hold.
//!
//! ## Grammars
//!
//! - [`parse`]: the canonical grammar, supporting `= ! != > >= < <= ~ ^`,
//!   wildcards (`*`, `x`, `X`), ranges (`1.0.0 - 2.0.0`) and unions (`||`).
//!   Selections in an intersection are separated by whitespace.
//! - [`parse_ruby_style`] and [`parse_ruby_style_multi`]: the Rubygems conventions,
//!   supporting `= != > >= < <= ~>` with exactly one space after the operator
//!   and commas between selections. Omitted segments are unconstrained.
//! - [`parse_exact_version`]: a single exact version with no operator.
//!
//! Specs are plain data: the grammar-specific rules (wildcard rounding, the scope
//! of `~`, `^` and `~>`) are resolved while parsing, so compiling a spec into a
//! set never needs to know which grammar produced it.

use bon::Builder;
use compact_str::CompactString;
use derive_more::{Deref, Display, From, IntoIterator};
use derive_new::new;
use documented::Documented;
use enum_assoc::Assoc;
use getset::{CopyGetters, Getters};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Error, ParseErrorKind, Version, error::fatal};

mod canon;
mod compile;
mod exact;
mod ruby;
mod scan;

pub use canon::parse;
pub use compile::{meeting_constraints, meeting_constraints_string, meeting_constraints_string_ruby};
pub use exact::parse_exact_version;
pub use ruby::{parse_ruby_style, parse_ruby_style_multi};

/// One of the three numbered portions of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Segment {
    /// The first portion.
    #[display("major")]
    Major,

    /// The second portion.
    #[display("minor")]
    Minor,

    /// The third portion.
    #[display("patch")]
    Patch,
}

impl Segment {
    /// All segments, most significant first.
    pub const ALL: [Segment; 3] = [Segment::Major, Segment::Minor, Segment::Patch];

    /// The position of the segment in a version, starting at zero.
    pub const fn index(self) -> usize {
        match self {
            Segment::Major => 0,
            Segment::Minor => 1,
            Segment::Patch => 2,
        }
    }
}

/// A numbered portion of a boundary: either a concrete number or a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Documented, Display)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum NumConstraint {
    /// A concrete number.
    #[display("{_0}")]
    Num(u64),

    /// Any number is acceptable.
    #[display("*")]
    Unconstrained,
}

impl NumConstraint {
    /// Whether this portion is a wildcard.
    pub const fn is_unconstrained(self) -> bool {
        matches!(self, NumConstraint::Unconstrained)
    }

    /// The concrete number, if any.
    pub const fn num(self) -> Option<u64> {
        match self {
            NumConstraint::Num(n) => Some(n),
            NumConstraint::Unconstrained => None,
        }
    }

    /// The concrete number, or zero for a wildcard.
    pub const fn or_zero(self) -> u64 {
        match self {
            NumConstraint::Num(n) => n,
            NumConstraint::Unconstrained => 0,
        }
    }
}

impl From<u64> for NumConstraint {
    fn from(value: u64) -> Self {
        Self::Num(value)
    }
}

/// A boundary version used as the comparison point of a selection.
///
/// Unlike [`Version`], any of the numbered portions may be unconstrained.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Builder,
    Getters,
    CopyGetters,
    Documented,
)]
pub struct VersionSpec {
    /// The major portion.
    #[builder(into)]
    #[getset(get_copy = "pub")]
    major: NumConstraint,

    /// The minor portion.
    #[builder(into)]
    #[getset(get_copy = "pub")]
    minor: NumConstraint,

    /// The patch portion.
    #[builder(into)]
    #[getset(get_copy = "pub")]
    patch: NumConstraint,

    /// The prerelease tag, without the leading `-`.
    #[builder(default, into)]
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    prerelease: CompactString,

    /// The build metadata, without the leading `+`.
    #[builder(default, into)]
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    metadata: CompactString,
}

impl VersionSpec {
    /// A boundary with all three portions given.
    pub fn exact(major: u64, minor: u64, patch: u64) -> Self {
        Self::builder().major(major).minor(minor).patch(patch).build()
    }

    pub(crate) fn from_parts(
        [major, minor, patch]: [NumConstraint; 3],
        prerelease: &str,
        metadata: &str,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: prerelease.into(),
            metadata: metadata.into(),
        }
    }

    /// The portion at the given segment.
    pub fn segment(&self, segment: Segment) -> NumConstraint {
        match segment {
            Segment::Major => self.major,
            Segment::Minor => self.minor,
            Segment::Patch => self.patch,
        }
    }

    /// The most significant unconstrained segment, if any.
    pub fn first_unconstrained(&self) -> Option<Segment> {
        Segment::ALL
            .into_iter()
            .find(|&segment| self.segment(segment).is_unconstrained())
    }

    /// The lowest version matching this boundary: every wildcard becomes zero.
    pub fn constrain_to_zero(&self) -> Version {
        Version::builder()
            .major(self.major.or_zero())
            .minor(self.minor.or_zero())
            .patch(self.patch.or_zero())
            .prerelease(self.prerelease.clone())
            .metadata(self.metadata.clone())
            .build()
    }

    /// The first release after every version sharing this boundary's portions up to `segment`.
    ///
    /// `1.2.3` bumped at [`Segment::Minor`] is `1.3.0`.
    /// `None` when the portion at `segment` is already `u64::MAX`.
    pub fn bump(&self, segment: Segment) -> Option<Version> {
        let major = self.major.or_zero();
        let minor = self.minor.or_zero();
        let patch = self.patch.or_zero();
        Some(match segment {
            Segment::Major => Version::new(major.checked_add(1)?, 0, 0),
            Segment::Minor => Version::new(major, minor.checked_add(1)?, 0),
            Segment::Patch => Version::new(major, minor, patch.checked_add(1)?),
        })
    }

    /// The exclusive upper bound implied by this boundary's wildcards.
    ///
    /// `None` when there are no wildcards, when the major portion is a wildcard,
    /// or when the bounding portion is `u64::MAX`. In the last two cases
    /// no version above the boundary is excluded.
    pub fn wildcard_upper_bound(&self) -> Option<Version> {
        match self.first_unconstrained()? {
            Segment::Major => None,
            Segment::Minor => self.bump(Segment::Major),
            Segment::Patch => self.bump(Segment::Minor),
        }
    }

    /// The same boundary with every wildcard set to zero.
    pub(crate) fn zeroed(&self) -> Self {
        Self {
            major: self.major.or_zero().into(),
            minor: self.minor.or_zero().into(),
            patch: self.patch.or_zero().into(),
            prerelease: self.prerelease.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        if !self.metadata.is_empty() {
            write!(f, "+{}", self.metadata)?;
        }
        Ok(())
    }
}

/// The operator of a [`SelectionSpec`].
///
/// The two `Compatible` variants carry the scope of their implicit upper bound,
/// decided by the grammar that parsed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Documented, Assoc)]
#[serde(rename_all = "snake_case")]
#[func(const fn symbol(&self) -> &'static str)]
pub enum SelectionOp {
    /// Exactly the boundary.
    #[assoc(symbol = "=")]
    Equal,

    /// Anything but the boundary.
    #[assoc(symbol = "!=")]
    NotEqual,

    /// Strictly newer than the boundary.
    #[assoc(symbol = ">")]
    Greater,

    /// The boundary or newer.
    #[assoc(symbol = ">=")]
    GreaterOrEqual,

    /// Strictly older than the boundary.
    #[assoc(symbol = "<")]
    Less,

    /// The boundary or older.
    #[assoc(symbol = "<=")]
    LessOrEqual,

    /// Any version matching the boundary's concrete portions; wildcards match anything.
    #[assoc(symbol = "")]
    Match,

    /// The boundary or newer, below the next minor version (`~1.2.3` is `>=1.2.3 <1.3.0`).
    #[assoc(symbol = "~")]
    CompatiblePatch,

    /// The boundary or newer, below the next major version (`^1.2.3` is `>=1.2.3 <2.0.0`).
    #[assoc(symbol = "^")]
    CompatibleMinor,
}

impl std::fmt::Display for SelectionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single operator and boundary: the atomic unit of a constraint.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Documented, Getters, CopyGetters, new,
)]
pub struct SelectionSpec {
    /// How versions are compared against the boundary.
    #[getset(get_copy = "pub")]
    operator: SelectionOp,

    /// The comparison point.
    #[getset(get = "pub")]
    boundary: VersionSpec,
}

/// Scoped operators render as their explicit bounds, since `~` and `^` alone
/// do not carry the scope: `^0.2.0` is `>=0.2.0 <0.3.0` in the canonical grammar
/// but [`SelectionOp::CompatibleMinor`] of `0.2.0` allows up to `1.0.0`.
impl std::fmt::Display for SelectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = match self.operator {
            SelectionOp::CompatiblePatch => Segment::Minor,
            SelectionOp::CompatibleMinor => Segment::Major,
            _ => return write!(f, "{}{}", self.operator, self.boundary),
        };
        write!(f, ">={}", self.boundary.constrain_to_zero())?;
        match self.boundary.bump(scope) {
            Some(upper) => write!(f, " <{upper}"),
            None => Ok(()),
        }
    }
}

/// Selections that must all hold. Empty means unconstrained.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Documented,
    Deref,
    From,
    IntoIterator,
)]
#[into_iterator(owned, ref)]
pub struct IntersectionSpec(Vec<SelectionSpec>);

impl FromIterator<SelectionSpec> for IntersectionSpec {
    fn from_iter<T: IntoIterator<Item = SelectionSpec>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for IntersectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

/// Intersections of which at least one must hold.
///
/// A successful parse always produces at least one intersection.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Documented,
    Deref,
    From,
    IntoIterator,
)]
#[into_iterator(owned, ref)]
pub struct UnionSpec(Vec<IntersectionSpec>);

impl FromIterator<IntersectionSpec> for UnionSpec {
    fn from_iter<T: IntoIterator<Item = IntersectionSpec>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for UnionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" || "))
    }
}

impl From<Version> for VersionSpec {
    fn from(value: Version) -> Self {
        Self {
            major: value.major().into(),
            minor: value.minor().into(),
            patch: value.patch().into(),
            prerelease: value.prerelease().clone(),
            metadata: value.metadata().clone(),
        }
    }
}

/// A scanned segment after numeric conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part {
    /// The segment was not written at all.
    Missing,
    Wildcard,
    Num(u64),
}

impl Part {
    pub(crate) fn is_wildcard(self) -> bool {
        self == Part::Wildcard
    }

    /// Treat missing segments as zero; wildcards stay unconstrained.
    pub(crate) fn or_zero(self) -> NumConstraint {
        match self {
            Part::Missing => NumConstraint::Num(0),
            Part::Wildcard => NumConstraint::Unconstrained,
            Part::Num(n) => NumConstraint::Num(n),
        }
    }
}

/// Convert the scanned segments into numbers, rejecting too many segments and overflow.
pub(crate) fn parts(input: &str, raw: &scan::RawConstraint<'_>) -> Result<[Part; 3], Error> {
    if raw.num_count > 3 {
        fatal!(input => raw.nums[0], ParseErrorKind::TooManySegments);
    }

    let mut parts = [Part::Missing; 3];
    let scanned = parts.iter_mut().zip(raw.nums).zip(Segment::ALL);
    for ((part, text), segment) in scanned.take(raw.num_count) {
        *part = if scan::is_wildcard(text) {
            Part::Wildcard
        } else {
            match text.parse::<u64>() {
                Ok(n) => Part::Num(n),
                Err(_) => fatal!(input => text, ParseErrorKind::SegmentTooLarge {
                    segment,
                    text: text.to_string(),
                }),
            }
        };
    }
    Ok(parts)
}

/// The operator a common misspelling was probably meant to be.
pub(crate) fn operator_typo(op: &str) -> Option<&'static str> {
    match op {
        "=>" => Some(">="),
        "=<" => Some("<="),
        _ => None,
    }
}

/// Whether the scanner's separator carries a `v` prefix.
pub(crate) fn has_v_prefix(sep: &str) -> bool {
    sep.contains(['v', 'V'])
}

/// If `extra` continues a range (`" - B"`), return the text after the dash.
pub(crate) fn range_tail(extra: &str) -> Option<&str> {
    let trimmed = extra.trim_start();
    if trimmed.len() == extra.len() {
        return None;
    }
    let tail = trimmed.strip_prefix('-')?;
    tail.starts_with(char::is_whitespace)
        .then(|| tail.trim_start())
}

/// Build a [`SelectionSpec`] in a manner that is known to not fail at compile time.
///
/// ```
/// # use version_set::constraint::{SelectionOp, SelectionSpec, VersionSpec};
/// let selection = version_set::selection!(GreaterOrEqual => 1, 2, 3);
/// let expected = SelectionSpec::new(SelectionOp::GreaterOrEqual, VersionSpec::exact(1, 2, 3));
/// assert_eq!(selection, expected);
/// ```
#[macro_export]
macro_rules! selection {
    ($op:ident => $major:expr, $minor:expr, $patch:expr) => {
        $crate::constraint::SelectionSpec::new(
            $crate::constraint::SelectionOp::$op,
            $crate::constraint::VersionSpec::exact($major, $minor, $patch),
        )
    };
}
