//! The lexical scanner shared by every grammar.
//!
//! Scanning is purely lexical: it splits one selection into its raw fields and hands back
//! whatever it did not consume, leaving every judgement about validity to the grammars.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    multi::separated_list1,
    sequence::preceded,
};

/// The raw fields of one scanned selection, all borrowed from the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawConstraint<'a> {
    /// Operator characters as written, like `>=` or `=>`.
    pub op: &'a str,

    /// Whitespace and `v` characters between the operator and the first segment.
    pub sep: &'a str,

    /// The first three segments; unused slots are empty.
    pub nums: [&'a str; 3],

    /// How many segments were seen, including any past the third.
    pub num_count: usize,

    /// Prerelease tag without the `-`.
    pub pre: &'a str,

    /// Metadata without the `+`.
    pub meta: &'a str,
}

impl RawConstraint<'_> {
    /// Whether the version body failed to scan.
    pub fn is_empty(&self) -> bool {
        self.num_count == 0
    }
}

/// Scan a single selection from the start of `input`.
///
/// Returns the scanned fields and the unconsumed remainder.
/// If no version body could be scanned, the record is empty and the remainder is all of `input`.
pub(crate) fn scan(input: &str) -> (RawConstraint<'_>, &str) {
    match raw_constraint(input) {
        Ok((extra, raw)) => (raw, extra),
        Err(_) => (RawConstraint::default(), input),
    }
}

fn raw_constraint(input: &str) -> IResult<&str, RawConstraint<'_>> {
    let (input, op) = take_while(is_operator).parse(input)?;
    let (input, sep) = take_while(is_separator).parse(input)?;
    let (input, segments) = separated_list1(char('.'), segment).parse(input)?;
    let (input, pre) = opt(preceded(char('-'), take_while1(is_tag))).parse(input)?;
    let (input, meta) = opt(preceded(char('+'), take_while1(is_tag))).parse(input)?;

    let mut nums = [""; 3];
    for (slot, segment) in nums.iter_mut().zip(segments.iter().copied()) {
        *slot = segment;
    }

    let raw = RawConstraint {
        op,
        sep,
        nums,
        num_count: segments.len(),
        pre: pre.unwrap_or_default(),
        meta: meta.unwrap_or_default(),
    };
    Ok((input, raw))
}

fn segment(input: &str) -> IResult<&str, &str> {
    alt((digit1, recognize(one_of("*xX")))).parse(input)
}

fn is_operator(c: char) -> bool {
    !(c.is_whitespace() || c.is_alphanumeric() || c == '*' || c == '.')
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == 'v' || c == 'V'
}

fn is_tag(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

/// Whether a scanned segment is a wildcard marker.
pub(crate) fn is_wildcard(segment: &str) -> bool {
    matches!(segment, "*" | "x" | "X")
}
