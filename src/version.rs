use std::{borrow::Cow, cmp::Ordering, fmt, str::FromStr};

use bon::Builder;
use compact_str::CompactString;
use documented::Documented;
use duplicate::duplicate;
use getset::{CopyGetters, Getters};
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{ObjectBuilder, Type},
};

use crate::{Error, constraint::parse_exact_version};

/// A concrete, fully resolved version: `MAJOR.MINOR.PATCH[-PRERELEASE][+METADATA]`.
///
/// Unlike a [`VersionSpec`](crate::constraint::VersionSpec), a version has no wildcards.
/// Prerelease and metadata are opaque strings; an empty string means "none".
///
/// There is one special value, [`Version::UNSPECIFIED`], used to represent
/// "no version was requested at all". It is distinct from `0.0.0` and is only
/// a member of [`Set::ALL`](crate::Set::ALL).
#[derive(Clone, PartialEq, Eq, Hash, Builder, Getters, CopyGetters, Documented)]
pub struct Version {
    /// The major number.
    #[getset(get_copy = "pub")]
    major: u64,

    /// The minor number.
    #[getset(get_copy = "pub")]
    minor: u64,

    /// The patch number.
    #[getset(get_copy = "pub")]
    patch: u64,

    /// The prerelease tag, without the leading `-`.
    #[builder(default, into)]
    #[getset(get = "pub")]
    prerelease: CompactString,

    /// The build metadata, without the leading `+`.
    #[builder(default, into)]
    #[getset(get = "pub")]
    metadata: CompactString,

    #[builder(skip)]
    unspecified: bool,
}

impl Version {
    /// The "no version was requested" sentinel.
    pub const UNSPECIFIED: Version = Version {
        major: 0,
        minor: 0,
        patch: 0,
        prerelease: CompactString::const_new(""),
        metadata: CompactString::const_new(""),
        unspecified: true,
    };

    /// Create a version with no prerelease or metadata.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: CompactString::const_new(""),
            metadata: CompactString::const_new(""),
            unspecified: false,
        }
    }

    /// Parse a single exact version, like `1.2.3-beta.1+build.5`.
    ///
    /// Missing trailing segments default to zero, so `1.2` parses as `1.2.0`.
    /// Operators, wildcards, ranges and lists are rejected.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, Error> {
        let spec = parse_exact_version(input.as_ref())?;
        Ok(spec.constrain_to_zero())
    }

    /// Whether this is [`Version::UNSPECIFIED`].
    pub fn is_unspecified(&self) -> bool {
        self.unspecified
    }

    /// Whether this version carries a prerelease tag.
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// Whether the two versions are identical, including metadata.
    pub fn same(&self, other: &Version) -> bool {
        self == other
    }

    /// Compare by version precedence, which ignores metadata.
    ///
    /// The unspecified sentinel has lower precedence than every other version.
    pub fn precedence(&self, other: &Version) -> Ordering {
        match (self.unspecified, other.unspecified) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => (self.major, self.minor, self.patch)
                .cmp(&(other.major, other.minor, other.patch))
                .then_with(|| compare_prerelease(&self.prerelease, &other.prerelease)),
        }
    }

    /// Whether this version has lower precedence than `other`.
    pub fn older_than(&self, other: &Version) -> bool {
        self.precedence(other) == Ordering::Less
    }

    /// Whether this version has higher precedence than `other`.
    pub fn newer_than(&self, other: &Version) -> bool {
        self.precedence(other) == Ordering::Greater
    }

    /// The same version without prerelease and metadata.
    pub fn release(&self) -> Version {
        Self::new(self.major, self.minor, self.patch)
    }
}

/// Prerelease precedence: a release is newer than any of its prereleases.
///
/// Dot-separated identifiers are compared in order: numeric identifiers by value and below
/// any alphanumeric one, alphanumeric identifiers by bytes, and a longer list wins a tie.
/// Strings of equal precedence are then ordered by bytes, so only identical tags are equal.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a
            .split('.')
            .zip_longest(b.split('.'))
            .map(|pair| match pair {
                EitherOrBoth::Both(a, b) => compare_identifier(a, b),
                EitherOrBoth::Left(_) => Ordering::Greater,
                EitherOrBoth::Right(_) => Ordering::Less,
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.cmp(b)),
    }
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    let numeric = |id: &str| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit());
    match (numeric(a), numeric(b)) {
        (true, true) => {
            let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence(other)
            .then_with(|| self.metadata.cmp(&other.metadata))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unspecified {
            return write!(f, "unspecified");
        }

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

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unspecified {
            write!(f, "Version::UNSPECIFIED")
        } else {
            write!(f, "Version({self})")
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

duplicate! {
    [
        ty;
        [ &str ];
        [ &String ];
        [ String ];
    ]
    impl TryFrom<ty> for Version {
        type Error = Error;

        fn try_from(value: ty) -> Result<Self, Self::Error> {
            Self::parse(value)
        }
    }
}

impl From<semver::Version> for Version {
    fn from(value: semver::Version) -> Self {
        Self::from(&value)
    }
}

impl From<&semver::Version> for Version {
    fn from(value: &semver::Version) -> Self {
        Self::builder()
            .major(value.major)
            .minor(value.minor)
            .patch(value.patch)
            .prerelease(value.pre.as_str())
            .metadata(value.build.as_str())
            .build()
    }
}

impl TryFrom<&Version> for semver::Version {
    type Error = semver::Error;

    fn try_from(value: &Version) -> Result<Self, Self::Error> {
        Ok(semver::Version {
            major: value.major,
            minor: value.minor,
            patch: value.patch,
            pre: semver::Prerelease::new(&value.prerelease)?,
            build: semver::BuildMetadata::new(&value.metadata)?,
        })
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.unspecified {
            serializer.serialize_none()
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self::UNSPECIFIED),
            Some(s) => Self::parse(s).map_err(serde::de::Error::custom),
        }
    }
}

impl PartialSchema for Version {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ObjectBuilder::new()
            .description(Some(Self::DOCS))
            .examples([
                json!("1.0.0"),
                json!("1.2.3-beta.1"),
                json!("1.2.3-beta.1+tci.12345"),
            ])
            .min_length(Some(5))
            .schema_type(Type::String)
            .build()
            .into()
    }
}

impl ToSchema for Version {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Version")
    }
}

/// Create a [`Version`] in a manner that is known to not fail at compile time.
///
/// ```
/// # use version_set::Version;
/// let version = version_set::version!(1, 2, 3);
/// assert_eq!(version, Version::new(1, 2, 3));
///
/// let version = version_set::version!("1.2.3-beta.1");
/// assert_eq!(version.prerelease(), "beta.1");
/// ```
///
/// The string form panics if the literal is not an exact version,
/// so it must only be used with literals known to be valid.
#[macro_export]
macro_rules! version {
    ($major:expr, $minor:expr, $patch:expr) => {
        $crate::Version::new($major, $minor, $patch)
    };
    ($input:expr) => {
        $crate::Version::parse($input).expect("parse version literal")
    };
}
