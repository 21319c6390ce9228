use tracing::debug;

use super::{
    IntersectionSpec, Part, Segment, SelectionOp, SelectionSpec, UnionSpec, VersionSpec,
    has_v_prefix, operator_typo, parts, range_tail,
    scan::{RawConstraint, scan},
};
use crate::{Error, ParseErrorKind, Version, error::fatal};

/// An operator as written in the canonical grammar.
///
/// Tilde and caret are resolved into scoped [`SelectionOp`] variants
/// only once the boundary is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Bare,
    Compare(SelectionOp),
    Tilde,
    Caret,
}

/// Parse a constraint in the canonical grammar.
///
/// ```
/// # use version_set::constraint;
/// let spec = constraint::parse(">=1.0 <2 || 2.0.0-beta.1").expect("must parse");
/// assert_eq!(spec.len(), 2);
/// assert_eq!(spec.to_string(), ">=1.0.0 <2.0.0 || =2.0.0-beta.1");
/// ```
///
/// Selections within an intersection are separated by whitespace,
/// intersections are separated by `||`, and `A - B` specifies an inclusive range.
#[tracing::instrument]
pub fn parse(input: &str) -> Result<UnionSpec, Error> {
    let mut remain = input.trim_start();
    if remain.trim_end().is_empty() {
        fatal!(input => input, ParseErrorKind::Empty);
    }

    let mut union = Vec::new();
    loop {
        let (selections, rest) = intersection(input, remain)?;
        union.push(selections);

        // Intersections end either at the end of input or at a union separator.
        let Some(next) = rest.strip_prefix("||") else {
            break;
        };
        remain = next.trim_start();
        if remain.is_empty() {
            fatal!(input => rest, ParseErrorKind::InvalidSequence(rest.to_string()));
        }
    }

    Ok(UnionSpec(union))
}

/// Parse one intersection from `remain`, returning it with the unparsed rest.
///
/// The rest is either empty or starts with `||`.
fn intersection<'a>(input: &str, remain: &'a str) -> Result<(IntersectionSpec, &'a str), Error> {
    let mut selections = Vec::new();
    let (mut raw, mut extra) = scan(remain);

    if let Some(upper) = range_tail(extra).filter(|_| !raw.is_empty()) {
        let rest = range(input, raw, upper, &mut selections)?;
        return Ok((IntersectionSpec(selections), rest));
    }

    loop {
        selection(input, raw, extra, &mut selections)?;
        let rest = continuation(input, extra)?;
        if rest.is_empty() || rest.starts_with("||") {
            return Ok((IntersectionSpec(selections), rest));
        }
        (raw, extra) = scan(rest);
    }
}

/// Validate what follows a selection and return it with leading whitespace removed.
fn continuation<'a>(input: &str, extra: &'a str) -> Result<&'a str, Error> {
    let rest = extra.trim_start();
    if rest.starts_with("||") {
        return Ok(rest);
    }
    if rest.starts_with(',') {
        fatal!(input => &rest[..1], ParseErrorKind::CommaSeparator);
    }
    if !rest.is_empty() && rest.len() == extra.len() {
        fatal!(input => extra, ParseErrorKind::InvalidSequence(extra.to_string()));
    }
    Ok(rest)
}

/// Parse the range `lower - upper`, given the already-scanned lower side.
fn range<'a>(
    input: &str,
    lower: RawConstraint<'_>,
    upper_text: &'a str,
    selections: &mut Vec<SelectionSpec>,
) -> Result<&'a str, Error> {
    if !lower.op.is_empty() {
        fatal!(input => lower.op, ParseErrorKind::RangeLowerNotExact);
    }
    let lower = boundary(input, &lower)?;

    let (upper, extra) = scan(upper_text);
    if upper.is_empty() {
        fatal!(input => upper_text, ParseErrorKind::InvalidSequence(upper_text.to_string()));
    }
    if !upper.op.is_empty() {
        fatal!(input => upper.op, ParseErrorKind::RangeUpperNotExact);
    }
    let upper = boundary(input, &upper)?;

    selections.push(SelectionSpec::new(SelectionOp::GreaterOrEqual, lower.zeroed()));
    if upper.first_unconstrained().is_none() {
        selections.push(SelectionSpec::new(SelectionOp::LessOrEqual, upper));
    } else if let Some(bound) = upper.wildcard_upper_bound() {
        selections.push(SelectionSpec::new(SelectionOp::Less, bound.into()));
    }

    let rest = continuation(input, extra)?;
    if !rest.is_empty() && !rest.starts_with("||") {
        fatal!(input => rest, ParseErrorKind::InvalidSequence(rest.to_string()));
    }
    Ok(rest)
}

/// The boundary of a range endpoint: wildcards are kept, missing segments are zero.
fn boundary(input: &str, raw: &RawConstraint<'_>) -> Result<VersionSpec, Error> {
    if has_v_prefix(raw.sep) {
        fatal!(input => raw.sep, ParseErrorKind::CanonicalVPrefix);
    }
    let parts = unconstrain_after_wildcard(parts(input, raw)?);
    Ok(VersionSpec::from_parts(parts.map(Part::or_zero), raw.pre, raw.meta))
}

/// Once a wildcard appears, every later segment is a wildcard too.
fn unconstrain_after_wildcard(mut parts: [Part; 3]) -> [Part; 3] {
    if let Some(at) = parts.iter().position(|part| part.is_wildcard()) {
        parts[at..].fill(Part::Wildcard);
    }
    parts
}

fn operator(input: &str, op: &str) -> Result<Operator, Error> {
    Ok(match op {
        "" => Operator::Bare,
        "=" => Operator::Compare(SelectionOp::Equal),
        "!" | "!=" => Operator::Compare(SelectionOp::NotEqual),
        ">" => Operator::Compare(SelectionOp::Greater),
        ">=" => Operator::Compare(SelectionOp::GreaterOrEqual),
        "<" => Operator::Compare(SelectionOp::Less),
        "<=" => Operator::Compare(SelectionOp::LessOrEqual),
        "~" => Operator::Tilde,
        "^" => Operator::Caret,
        _ => match operator_typo(op) {
            Some(suggestion) => fatal!(input => op, ParseErrorKind::OperatorTypo {
                given: op.to_string(),
                suggestion,
            }),
            None => fatal!(input => op, ParseErrorKind::InvalidOperator(op.to_string())),
        },
    })
}

/// Parse one selection, pushing the selections it expands to.
fn selection(
    input: &str,
    raw: RawConstraint<'_>,
    extra: &str,
    selections: &mut Vec<SelectionSpec>,
) -> Result<(), Error> {
    if raw.is_empty() {
        fatal!(input => extra, ParseErrorKind::InvalidSequence(extra.to_string()));
    }
    if has_v_prefix(raw.sep) {
        fatal!(input => raw.sep, ParseErrorKind::CanonicalVPrefix);
    }
    let operator = operator(input, raw.op)?;
    if operator != Operator::Bare && !raw.sep.is_empty() {
        fatal!(input => raw.sep, ParseErrorKind::SpaceAfterOperator(raw.op.to_string()));
    }

    let parts = unconstrain_after_wildcard(parts(input, &raw)?);
    let spec = VersionSpec::from_parts(parts.map(Part::or_zero), raw.pre, raw.meta);
    let mut push =
        |op: SelectionOp, boundary: VersionSpec| selections.push(SelectionSpec::new(op, boundary));

    let Some(wildcard) = parts.iter().position(|part| part.is_wildcard()) else {
        let given = raw.num_count;
        match operator {
            Operator::Bare => push(SelectionOp::Equal, spec),
            Operator::Compare(op) => push(op, spec),
            Operator::Tilde => push(tilde_scope(given), spec),
            Operator::Caret => caret(input, &raw, spec, given, &mut push)?,
        }
        return Ok(());
    };

    if wildcard == 0 {
        return match operator {
            Operator::Bare
            | Operator::Tilde
            | Operator::Caret
            | Operator::Compare(
                SelectionOp::Equal | SelectionOp::GreaterOrEqual | SelectionOp::LessOrEqual,
            ) => {
                push(SelectionOp::Match, spec);
                Ok(())
            }
            Operator::Compare(_) => {
                fatal!(input => raw.op, ParseErrorKind::WildcardMajorOperator(raw.op.to_string()))
            }
        };
    }

    let scope = Segment::ALL[wildcard - 1];
    match operator {
        Operator::Bare => push(SelectionOp::Match, spec),
        Operator::Compare(SelectionOp::Greater) => {
            let rounded = bump(input, &raw, &spec, scope)?;
            debug!(%spec, %rounded, "rounded wildcard boundary of '>' up to '>='");
            push(SelectionOp::GreaterOrEqual, rounded.into());
        }
        Operator::Compare(SelectionOp::LessOrEqual) => {
            let rounded = bump(input, &raw, &spec, scope)?;
            debug!(%spec, %rounded, "rounded wildcard boundary of '<=' up to '<'");
            push(SelectionOp::Less, rounded.into());
        }
        Operator::Compare(op) => push(op, spec.zeroed()),
        Operator::Tilde => push(tilde_scope(wildcard), spec.zeroed()),
        Operator::Caret => caret(input, &raw, spec.zeroed(), wildcard, &mut push)?,
    }
    Ok(())
}

/// The first release after `spec` at `segment`, failing when that portion cannot grow.
fn bump(
    input: &str,
    raw: &RawConstraint<'_>,
    spec: &VersionSpec,
    segment: Segment,
) -> Result<Version, Error> {
    match spec.bump(segment) {
        Some(next) => Ok(next),
        None => {
            let text = raw.nums[segment.index()];
            fatal!(input => text, ParseErrorKind::SegmentTooLarge {
                segment,
                text: text.to_string(),
            })
        }
    }
}

/// Tilde allows patch updates if a minor was given, and minor updates otherwise.
fn tilde_scope(given: usize) -> SelectionOp {
    if given >= 2 {
        SelectionOp::CompatiblePatch
    } else {
        SelectionOp::CompatibleMinor
    }
}

/// Caret allows updates that do not change the leftmost nonzero segment that was given.
fn caret(
    input: &str,
    raw: &RawConstraint<'_>,
    spec: VersionSpec,
    given: usize,
    mut push: impl FnMut(SelectionOp, VersionSpec),
) -> Result<(), Error> {
    let major = spec.major().or_zero();
    let minor = spec.minor().or_zero();
    if major != 0 || given == 1 {
        push(SelectionOp::CompatibleMinor, spec);
    } else if minor != 0 || given == 2 {
        push(SelectionOp::CompatiblePatch, spec);
    } else {
        let next = bump(input, raw, &spec, Segment::Patch)?;
        push(SelectionOp::GreaterOrEqual, spec);
        push(SelectionOp::Less, next.into());
    }
    Ok(())
}
