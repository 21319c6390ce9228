use super::{
    Part, Segment, VersionSpec, has_v_prefix, operator_typo, parts, range_tail, scan::scan,
};
use crate::{Error, ParseErrorKind, error::fatal};

/// Operators recognized by any grammar; the exact grammar rejects all of them by name.
const KNOWN_OPERATORS: &[&str] = &["=", "!", "!=", ">", ">=", "<", "<=", "~", "~>", "^"];

/// Parse a single exact version, like `1.2.3-beta.1+build.5`.
///
/// The result has no wildcards: missing trailing segments are zero.
///
/// ```
/// # use version_set::constraint::{parse_exact_version, VersionSpec};
/// let spec = parse_exact_version("1.2").expect("must parse");
/// assert_eq!(spec, VersionSpec::exact(1, 2, 0));
///
/// let err = parse_exact_version(">1.2").expect_err("must fail");
/// assert_eq!(
///     err.to_string(),
///     r#"can't use constraint operator ">"; an exact version is required"#,
/// );
/// ```
#[tracing::instrument]
pub fn parse_exact_version(input: &str) -> Result<VersionSpec, Error> {
    let remain = input.trim();
    if remain.is_empty() {
        fatal!(input => input, ParseErrorKind::Empty);
    }

    let (raw, extra) = scan(remain);
    if raw.is_empty() {
        fatal!(input => remain, ParseErrorKind::ExactInvalid);
    }
    if has_v_prefix(raw.sep) {
        fatal!(input => raw.sep, ParseErrorKind::VPrefix);
    }
    if !raw.op.is_empty() {
        if KNOWN_OPERATORS.contains(&raw.op) || operator_typo(raw.op).is_some() {
            fatal!(input => raw.op, ParseErrorKind::ExactOperator(raw.op.to_string()));
        }
        fatal!(input => raw.op, ParseErrorKind::ExactInvalidStart(raw.op.to_string()));
    }

    let parts = parts(input, &raw)?;
    let wildcard = parts.iter().zip(Segment::ALL).find(|(part, _)| part.is_wildcard());
    if let Some((_, segment)) = wildcard {
        fatal!(input => raw.nums[segment.index()], ParseErrorKind::ExactWildcard(segment));
    }

    let rest = extra.trim_start();
    if !rest.is_empty() {
        if rest.starts_with("||") || rest.starts_with(',') {
            fatal!(input => rest, ParseErrorKind::ExactMultiple);
        }
        if range_tail(extra).is_some() {
            fatal!(input => rest, ParseErrorKind::ExactRange);
        }
        fatal!(input => rest, ParseErrorKind::ExactInvalid);
    }

    Ok(VersionSpec::from_parts(
        parts.map(Part::or_zero),
        raw.pre,
        raw.meta,
    ))
}
