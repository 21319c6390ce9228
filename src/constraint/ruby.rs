//! Rubygems-style constraints.
//!
//! Per https://guides.rubygems.org/patterns/#declaring-dependencies, a gem requirement
//! is a list of comma-separated selections, each an operator followed by one space and a version:
//!
//! ```text
//! >= 1.0, < 2
//! ~> 2.2.3
//! ```
//!
//! Compared to the canonical grammar:
//! - Exactly one space follows each operator.
//! - There are no wildcards; segments that should be unconstrained are simply omitted,
//!   so `>= 1` means "at least 1.x.x" rather than "at least 1.0.0".
//! - The only bump operator is the "twiddle-wakka" `~>`, which allows the last given
//!   segment to increase: `~> 1.2.3` is `>= 1.2.3, < 1.3.0` while `~> 1.2` is `>= 1.2, < 2.0`.
//! - There are no ranges and no unions.

use super::{
    IntersectionSpec, NumConstraint, Part, Segment, SelectionOp, SelectionSpec, VersionSpec,
    has_v_prefix, operator_typo, parts, range_tail,
    scan::{RawConstraint, scan},
};
use crate::{Error, ParseErrorKind, error::fatal};

/// Parse a single Rubygems-style selection, like `~> 1.2`.
#[tracing::instrument]
pub fn parse_ruby_style(input: &str) -> Result<SelectionSpec, Error> {
    let remain = input.trim_start();
    if remain.trim_end().is_empty() {
        fatal!(input => input, ParseErrorKind::Empty);
    }

    let (raw, extra) = scan(remain);
    let spec = selection(input, raw, extra)?;

    let rest = extra.trim_start();
    if rest.is_empty() {
        return Ok(spec);
    }
    if rest.starts_with("||") || rest.starts_with(',') {
        fatal!(input => rest, ParseErrorKind::SingleConstraintOnly);
    }
    if range_tail(extra).is_some() {
        fatal!(input => rest, ParseErrorKind::RangeNotSupported);
    }
    fatal!(input => rest, ParseErrorKind::InvalidCharacters(rest.to_string()))
}

/// Parse a comma-separated list of Rubygems-style selections, like `>= 1.0, < 2`.
///
/// An empty input is an empty intersection, which constrains nothing.
#[tracing::instrument]
pub fn parse_ruby_style_multi(input: &str) -> Result<IntersectionSpec, Error> {
    let mut remain = input.trim_start();
    let mut selections = Vec::new();
    if remain.trim_end().is_empty() {
        return Ok(IntersectionSpec(selections));
    }

    loop {
        let (raw, extra) = scan(remain);
        selections.push(selection(input, raw, extra)?);

        let rest = extra.trim_start();
        if rest.is_empty() {
            return Ok(IntersectionSpec(selections));
        }
        if let Some(next) = rest.strip_prefix(',') {
            remain = next.trim_start();
            if remain.is_empty() {
                fatal!(input => rest, ParseErrorKind::InvalidCharacters(rest.to_string()));
            }
            continue;
        }
        if rest.starts_with("||") {
            fatal!(input => &rest[..2], ParseErrorKind::UnionNotSupported);
        }
        if range_tail(extra).is_some() {
            fatal!(input => rest, ParseErrorKind::RangeNotSupported);
        }
        if rest.len() < extra.len() {
            let fragment = remain[..remain.len() - extra.len()].trim_end();
            fatal!(input => fragment, ParseErrorKind::MissingComma(fragment.to_string()));
        }
        fatal!(input => rest, ParseErrorKind::InvalidCharacters(rest.to_string()));
    }
}

fn operator(input: &str, op: &str) -> Result<SelectionOp, Error> {
    Ok(match op {
        "" | "=" => SelectionOp::Equal,
        "!=" => SelectionOp::NotEqual,
        ">" => SelectionOp::Greater,
        ">=" => SelectionOp::GreaterOrEqual,
        "<" => SelectionOp::Less,
        "<=" => SelectionOp::LessOrEqual,
        // Resolved into the right scope once the number of segments is known.
        "~>" => SelectionOp::CompatiblePatch,
        _ => match operator_typo(op) {
            Some(suggestion) => fatal!(input => op, ParseErrorKind::OperatorTypo {
                given: op.to_string(),
                suggestion,
            }),
            None => fatal!(input => op, ParseErrorKind::InvalidOperator(op.to_string())),
        },
    })
}

fn selection(input: &str, raw: RawConstraint<'_>, extra: &str) -> Result<SelectionSpec, Error> {
    if raw.is_empty() {
        fatal!(input => extra, ParseErrorKind::InvalidCharacters(extra.to_string()));
    }
    if has_v_prefix(raw.sep) {
        fatal!(input => raw.sep, ParseErrorKind::VPrefix);
    }

    let operator = operator(input, raw.op)?;
    if !raw.op.is_empty() {
        match raw.sep {
            "" => fatal!(input => raw.op, ParseErrorKind::SpaceRequired(raw.op.to_string())),
            " " => {}
            sep => fatal!(input => sep, ParseErrorKind::OneSpaceExpected(raw.op.to_string())),
        }
    }

    let parts = parts(input, &raw)?;
    let wildcard = parts.iter().zip(Segment::ALL).find(|(part, _)| part.is_wildcard());
    if let Some((_, segment)) = wildcard {
        fatal!(input => raw.nums[segment.index()], ParseErrorKind::WildcardNotAllowed(segment));
    }

    // A prerelease pins an exact point, so omitted segments can't stay open.
    let pinned = !raw.pre.is_empty();
    let nums = parts.map(|part| match part {
        Part::Missing if !pinned => NumConstraint::Unconstrained,
        part => part.or_zero(),
    });
    let boundary = VersionSpec::from_parts(nums, raw.pre, raw.meta);

    let operator = match operator {
        SelectionOp::CompatiblePatch if raw.num_count < 3 => SelectionOp::CompatibleMinor,
        operator => operator,
    };
    Ok(SelectionSpec::new(operator, boundary))
}
