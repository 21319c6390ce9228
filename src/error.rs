use getset::{CopyGetters, Getters};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::constraint::Segment;

/// Records all errors reported by this library.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors encountered while parsing a version or a constraint.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// The kind of parse failure, if this is a parse error.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            Error::Parse(err) => Some(err.kind()),
        }
    }
}

/// Errors encountered when parsing a version or constraint string.
///
/// The `Display` form is exactly the message of the [`ParseErrorKind`];
/// the input and the span of the offending fragment are attached for rendering with `miette`.
#[derive(Error, Diagnostic, Clone, PartialEq, Eq, Debug, Getters, CopyGetters)]
#[error("{kind}")]
pub struct ParseError {
    /// The input originally provided.
    #[source_code]
    #[getset(get = "pub")]
    input: String,

    /// The location of the offending fragment.
    #[label("here")]
    #[getset(get_copy = "pub")]
    span: SourceSpan,

    /// What went wrong.
    #[getset(get = "pub")]
    kind: ParseErrorKind,
}

impl ParseError {
    /// Create an error pointing at `fragment`, which should be a slice of `input`.
    pub(crate) fn new(input: &str, fragment: &str, kind: ParseErrorKind) -> Self {
        Self {
            input: input.to_string(),
            span: span(input, fragment),
            kind,
        }
    }
}

/// The specific reason a parse failed.
///
/// Messages are stable: callers may show them to end users verbatim.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The input was empty.
    #[error("empty specification")]
    Empty,

    /// More than three dot-separated segments were given.
    #[error("too many numbered portions; only three are allowed (major, minor, patch)")]
    TooManySegments,

    /// A segment does not fit in a `u64`.
    #[error("{segment} number {text:?} is too large")]
    SegmentTooLarge {
        /// The segment that overflowed.
        segment: Segment,
        /// The digits as written.
        text: String,
    },

    /// A `v` prefix was used in the canonical grammar.
    #[error("a \"v\" prefix should not be used when specifying versions")]
    CanonicalVPrefix,

    /// A `v` prefix was used in the Ruby-style or exact grammar.
    #[error("a \"v\" prefix should not be used")]
    VPrefix,

    /// Trailing text that the canonical grammar could not interpret.
    #[error("the sequence {0:?} is not valid")]
    InvalidSequence(String),

    /// An unknown operator.
    #[error("invalid constraint operator {0:?}")]
    InvalidOperator(String),

    /// A common misspelling of a known operator.
    #[error("invalid constraint operator {given:?}; did you mean {suggestion:?}?")]
    OperatorTypo {
        /// The operator as written.
        given: String,
        /// The operator that was probably intended.
        suggestion: &'static str,
    },

    /// The canonical grammar forbids whitespace after an operator.
    #[error("no spaces allowed after operator {0:?}")]
    SpaceAfterOperator(String),

    /// The canonical grammar separates selections with spaces, not commas.
    #[error(
        "commas are not needed to separate version selections; separate with spaces instead"
    )]
    CommaSeparator,

    /// The left side of a range carried an operator.
    #[error("lower bound of range specified with \"-\" operator must be an exact version")]
    RangeLowerNotExact,

    /// The right side of a range carried an operator.
    #[error("upper bound of range specified with \"-\" operator must be an exact version")]
    RangeUpperNotExact,

    /// A wildcard major version combined with an operator that has no meaning for it.
    #[error("operator {0:?} cannot be used with a wildcard major version")]
    WildcardMajorOperator(String),

    /// Text that the Ruby-style grammar could not interpret.
    #[error("invalid characters {0:?}")]
    InvalidCharacters(String),

    /// The Ruby-style grammar requires a space after an operator.
    #[error("a space separator is required after the operator {0:?}")]
    SpaceRequired(String),

    /// The Ruby-style grammar allows exactly one space after an operator.
    #[error("only one space is expected after the operator {0:?}")]
    OneSpaceExpected(String),

    /// The Ruby-style grammar has no wildcards.
    #[error("can't use wildcard for {0} number; omit segments that should be unconstrained")]
    WildcardNotAllowed(Segment),

    /// The single-selection Ruby-style entry point got several selections.
    #[error("only one constraint may be specified")]
    SingleConstraintOnly,

    /// The Ruby-style grammar has no ranges.
    #[error("range constraints are not supported")]
    RangeNotSupported,

    /// The Ruby-style grammar has no unions.
    #[error("union constraints (\"||\") are not supported; separate constraints with commas")]
    UnionNotSupported,

    /// Two Ruby-style selections were not separated by a comma.
    #[error("missing comma after {0:?}")]
    MissingComma(String),

    /// An operator was given where an exact version is required.
    #[error("can't use constraint operator {0:?}; an exact version is required")]
    ExactOperator(String),

    /// An unknown leading symbol where an exact version is required.
    #[error("invalid sequence {0:?} at start of specification")]
    ExactInvalidStart(String),

    /// The input is not shaped like a version at all.
    #[error(
        "invalid specification; required format is three positive integers separated by periods"
    )]
    ExactInvalid,

    /// A wildcard where an exact version is required.
    #[error("can't use wildcard for {0} number; an exact version is required")]
    ExactWildcard(Segment),

    /// Several versions where an exact version is required.
    #[error("can't specify multiple versions; a single exact version is required")]
    ExactMultiple,

    /// A range where an exact version is required.
    #[error("can't specify version range; a single exact version is required")]
    ExactRange,
}

/// Return the span of `substr` inside `text`.
///
/// `substr` is normally a slice borrowed from `text`, in which case its position is exact;
/// otherwise the first occurrence is used.
pub(crate) fn span(text: &str, substr: &str) -> SourceSpan {
    let base = text.as_ptr() as usize;
    let start = (substr.as_ptr() as usize)
        .checked_sub(base)
        .filter(|start| start + substr.len() <= text.len())
        .or_else(|| text.find(substr))
        .unwrap_or(0);
    (start, substr.len()).into()
}

/// Shorthand for building a [`ParseError`], converting into [`Error`], and returning.
///
/// ```ignore
/// error::fatal!(input => fragment, ParseErrorKind::Empty);
/// ```
macro_rules! fatal {
    ($input:expr => $fragment:expr, $kind:expr) => {
        return Err($crate::error::Error::from($crate::error::ParseError::new(
            $input, $fragment, $kind,
        )))
    };
}
pub(crate) use fatal;
