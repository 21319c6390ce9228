use maplit::btreeset;
use proptest::prelude::*;
use simple_test_case::test_case;

use version_set::{List, Set, Version, set, version};

#[test_case(Set::ALL, Version::UNSPECIFIED, true; "all_has_unspecified")]
#[test_case(Set::NONE, Version::UNSPECIFIED, false; "none_lacks_unspecified")]
#[test_case(Set::ALL.subtract(&Set::only(version!(1, 0, 0))), Version::UNSPECIFIED, false; "constraint_removes_unspecified")]
#[test_case(Set::ALL.subtract(&Set::ALL.subtract(&Set::only(version!(1, 0, 0)))), Version::UNSPECIFIED, false; "double_negation_removes_unspecified")]
#[test_case(Set::INITIAL_DEVELOPMENT, Version::UNSPECIFIED, false; "initial_development_unspecified")]
#[test_case(Set::INITIAL_DEVELOPMENT, version!(0, 0, 2), true; "initial_development_has_zero")]
#[test_case(Set::INITIAL_DEVELOPMENT, version!(1, 0, 0), false; "initial_development_lacks_one")]
#[test_case(Set::RELEASED, version!(1, 0, 0), true; "released_has_release")]
#[test_case(Set::RELEASED, version!("1.0.0-beta1"), false; "released_lacks_prerelease")]
#[test_case(Set::PRERELEASE, version!(1, 0, 0), false; "prerelease_lacks_release")]
#[test_case(Set::PRERELEASE, version!("1.0.0-beta1"), true; "prerelease_has_prerelease")]
#[test_case(Set::only(version!(1, 0, 0)).union(&Set::only(version!(1, 1, 0))), version!(1, 0, 0), true; "union_first")]
#[test_case(Set::only(version!(1, 0, 0)).union(&Set::only(version!(1, 1, 0))), version!(1, 1, 0), true; "union_second")]
#[test_case(Set::only(version!(1, 0, 0)).union(&Set::only(version!(1, 1, 0))), version!(1, 2, 0), false; "union_neither")]
#[test_case(Set::at_least(version!(1, 0, 0)).intersection(&Set::older_than(version!(2, 0, 0))), version!(0, 0, 2), false; "intersection_below")]
#[test_case(Set::at_least(version!(1, 0, 0)).intersection(&Set::older_than(version!(2, 0, 0))), version!(1, 0, 0), true; "intersection_lower_edge")]
#[test_case(Set::at_least(version!(1, 0, 0)).intersection(&Set::older_than(version!(2, 0, 0))), version!(1, 2, 3), true; "intersection_inside")]
#[test_case(Set::at_least(version!(1, 0, 0)).intersection(&Set::older_than(version!(2, 0, 0))), version!(2, 0, 0), false; "intersection_upper_edge")]
#[test_case(Set::ALL.subtract(&Set::only(version!(0, 9, 0))), version!(0, 9, 0), false; "subtract_removed")]
#[test_case(Set::ALL.subtract(&Set::only(version!(0, 9, 0))), version!(0, 9, 1), true; "subtract_kept")]
#[test_case(Set::at_least(version!(1, 0, 0)), version!("1.0.0+build"), true; "bound_ignores_metadata")]
#[test_case(Set::older_than(version!(1, 0, 0)), version!("1.0.0-rc.1"), true; "prerelease_precedes_release")]
#[test]
fn has(set: Set, version: Version, expected: bool) {
    assert_eq!(set.has(&version), expected, "{set:?} has {version:?}");
}

#[test_case(Set::ALL.union(&Set::only(version!(1, 0, 1))).all_requested(), version!(1, 0, 1), true; "union_requested")]
#[test_case(Set::ALL.union(&Set::only(version!(1, 0, 1))).all_requested(), version!(1, 0, 2), false; "union_unrequested")]
#[test_case(Set::intersect_all([Set::RELEASED, Set::only(version!(1, 0, 1))]).all_requested(), version!(1, 0, 1), true; "intersection_requested")]
#[test_case(Set::intersect_all([Set::RELEASED, Set::only(version!(1, 0, 1))]).all_requested(), version!(1, 0, 2), false; "intersection_unrequested")]
#[test_case(Set::at_least(version!(2, 0, 0)).intersection(&Set::only(version!(1, 0, 1))).all_requested(), version!(1, 0, 1), false; "intersection_excludes")]
#[test_case(Set::only(version!(1, 0, 1)).subtract(&Set::at_least(version!(1, 0, 0))).all_requested(), version!(1, 0, 1), false; "subtract_excludes")]
#[test]
fn all_requested(set: Set, version: Version, expected: bool) {
    assert_eq!(set.has(&version), expected, "{set:?} has {version:?}");
}

#[test_case(">= 1.0.0", version!(1, 0, 0), true; "release")]
#[test_case(">= 1.0.0", version!(1, 0, 1), true; "newer_release")]
#[test_case(">= 1.0.0", version!("1.0.0-beta1"), false; "older_prerelease")]
#[test_case(">= 1.0.0", version!("2.0.0-beta1"), false; "unrequested_prerelease")]
#[test_case("2.0.0-beta1", version!("2.0.0-beta1"), true; "requested_prerelease")]
#[test_case("!= 2.0.0-beta1, 2.0.0-beta1", version!("2.0.0-beta1"), false; "contradiction")]
#[test_case("~> 1.2.3", version!(1, 2, 3), true; "patch_scope_lower")]
#[test_case("~> 1.2.3", version!(1, 2, 5), true; "patch_scope_inside")]
#[test_case("~> 1.2.3", version!(1, 3, 0), false; "patch_scope_upper")]
#[test_case("~> 1.2", version!(1, 2, 3), true; "minor_scope_lower")]
#[test_case("~> 1.2", version!(1, 3, 0), true; "minor_scope_inside")]
#[test_case("~> 1.2", version!(2, 0, 0), false; "minor_scope_upper")]
#[test_case("~> 1", version!(1, 2, 5), true; "major_scope_inside")]
#[test_case("~> 1", version!(2, 0, 0), false; "major_scope_upper")]
#[test]
fn meeting_constraints_ruby(input: &str, version: Version, expected: bool) {
    let set = set!(ruby => input);
    assert_eq!(set.has(&version), expected, "{set:?} has {version:?}");
}

#[test_case(">= 1.0.0", version!(0, 0, 1), false; "below")]
#[test_case(">= 1.0.0", version!(1, 0, 0), false; "not_named")]
#[test_case(">= 1.0.0", version!("2.0.0-beta1"), false; "prerelease")]
#[test_case("2.0.0-beta1", version!("2.0.0-beta1"), true; "named")]
#[test]
fn all_requested_from_constraints(input: &str, version: Version, expected: bool) {
    let set = set!(ruby => input).all_requested();
    assert_eq!(set.has(&version), expected, "{set:?} has {version:?}");
}

#[test_case(">= 1.0.0", version!(0, 0, 1), false; "below")]
#[test_case(">= 1.0.0", version!(1, 0, 0), true; "release")]
#[test_case(">= 1.0.0", version!("1.0.0-beta1"), false; "older_prerelease")]
#[test_case(">= 1.0.0", version!("2.0.0-beta1"), false; "unrequested_prerelease")]
#[test_case("2.0.0-beta1", version!("2.0.0-beta1"), true; "requested_prerelease")]
#[test]
fn without_unrequested_prereleases(input: &str, version: Version, expected: bool) {
    let set = set!(ruby => input).without_unrequested_prereleases();
    assert_eq!(set.has(&version), expected, "{set:?} has {version:?}");
}

#[test]
fn raw_compilation_keeps_prereleases() {
    let spec = version_set::constraint::parse(">=1.0.0").expect("must parse");
    let raw = version_set::constraint::meeting_constraints(&spec);
    assert!(raw.has(&version!("2.0.0-beta1")));
    assert!(!raw.without_unrequested_prereleases().has(&version!("2.0.0-beta1")));
}

#[test]
fn canonical_prerelease_requested_by_range() {
    let set = set!(">=1.0.0-beta.1 <2.0.0");
    assert!(set.has(&version!("1.0.0-beta.1")));
    assert!(set.has(&version!(1, 5, 0)));
    assert!(!set.has(&version!("1.0.0-beta.2")));
}

#[test]
fn finiteness() {
    let only = Set::only(version!(1, 0, 0));

    let intersection = Set::ALL.intersection(&only);
    assert!(intersection.is_finite());

    let union = Set::ALL.union(&only);
    assert!(!union.is_finite());
    assert_eq!(union.list(), None);

    let subtract = only.subtract(&Set::ALL);
    assert!(subtract.is_finite());
    assert_eq!(subtract.list(), Some(List::new()));

    let bounded = Set::at_least(version!(1, 0, 0)).intersection(&Set::selection([
        version!(0, 9, 0),
        version!(1, 0, 0),
        version!(1, 1, 0),
    ]));
    assert!(bounded.is_finite());
    assert_eq!(
        bounded.list(),
        Some(List::from(vec![version!(1, 0, 0), version!(1, 1, 0)]))
    );
}

#[test]
fn listing_skips_unspecified() {
    let set = Set::selection([Version::UNSPECIFIED, version!(1, 0, 0)]);
    assert_eq!(set.list(), Some(List::from(vec![version!(1, 0, 0)])));
    assert!(!set.has(&Version::UNSPECIFIED));
}

#[test]
fn exactly_and_selects() {
    let one = Set::only(version!(1, 0, 0));
    assert!(one.exactly(&version!(1, 0, 0)));
    assert!(!one.exactly(&version!(2, 0, 0)));

    let two = one.union(&Set::only(version!(2, 0, 0)));
    assert!(!two.exactly(&version!(1, 0, 0)));
    assert!(two.selects(&version!(1, 0, 0)));
    assert!(!Set::at_least(version!(1, 0, 0)).selects(&version!(1, 0, 0)));
}

#[test]
fn selection_dedupes() {
    let versions = btreeset! { version!(1, 0, 0), version!(2, 0, 0) };
    let set = Set::selection(versions.iter().cloned().chain([version!(1, 0, 0)]));
    let listed = set.list().expect("finite");
    assert_eq!(listed.iter().cloned().collect::<std::collections::BTreeSet<_>>(), versions);
    assert_eq!(listed.len(), 2);
}

#[test]
fn set_json() {
    let set: Set = serde_json::from_str(r#""^1 || 2.0.0""#).expect("must deserialize");
    let expected = Set::RELEASED.intersection(&Set::union_all([
        Set::at_least(version!(1, 0, 0)).intersection(&Set::older_than(version!(2, 0, 0))),
        Set::only(version!(2, 0, 0)),
    ]));
    assert_eq!(set, expected);

    let err = serde_json::from_str::<Set>(r#""=>1.0""#).expect_err("must fail");
    assert!(err.to_string().contains("did you mean"), "unexpected error: {err}");
}

#[test]
fn from_str() -> color_eyre::Result<()> {
    let set: Set = ">=1.0.0 <2.0.0 || 3.x".parse()?;
    assert!(set.has(&Version::parse("1.4.2")?));
    assert!(set.has(&Version::parse("3.9.0")?));
    assert!(!set.has(&Version::parse("2.1.0")?));
    Ok(())
}

fn small_version() -> impl Strategy<Value = Version> {
    (0u64..4, 0u64..4, 0u64..4, prop::option::of("[a-c]")).prop_map(
        |(major, minor, patch, pre)| {
            Version::builder()
                .major(major)
                .minor(minor)
                .patch(patch)
                .prerelease(pre.unwrap_or_default())
                .build()
        },
    )
}

fn small_set() -> impl Strategy<Value = Set> {
    let leaf = prop_oneof![
        Just(Set::ALL),
        Just(Set::NONE),
        Just(Set::RELEASED),
        Just(Set::PRERELEASE),
        small_version().prop_map(Set::only),
        small_version().prop_map(Set::at_least),
        small_version().prop_map(Set::at_most),
        small_version().prop_map(Set::newer_than),
        small_version().prop_map(Set::older_than),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.union(&b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.intersection(&b)),
            (inner.clone(), inner).prop_map(|(a, b)| a.subtract(&b)),
        ]
    })
}

proptest! {
    #[test]
    fn intersection_membership(a in small_set(), b in small_set(), version in small_version()) {
        let set = a.intersection(&b);
        prop_assert_eq!(set.has(&version), a.has(&version) && b.has(&version));
    }

    #[test]
    fn union_membership(a in small_set(), b in small_set(), version in small_version()) {
        let set = a.union(&b);
        prop_assert_eq!(set.has(&version), a.has(&version) || b.has(&version));
    }

    #[test]
    fn subtract_membership(a in small_set(), b in small_set(), version in small_version()) {
        let set = a.subtract(&b);
        prop_assert_eq!(set.has(&version), a.has(&version) && !b.has(&version));
    }

    /// Only the universal set itself admits the unspecified version.
    #[test]
    fn unspecified_only_in_all(set in small_set()) {
        prop_assert_eq!(set.has(&Version::UNSPECIFIED), set.is_all());
    }

    /// Listing a finite set agrees with membership.
    #[test]
    fn list_agrees_with_has(a in small_set(), b in small_set(), versions in prop::collection::vec(small_version(), 0..6)) {
        let set = Set::selection(versions.clone()).intersection(&a).subtract(&b);
        let listed = set.list().expect("selection bounds the set");
        for version in &versions {
            prop_assert_eq!(listed.contains(version), set.has(version));
        }
    }
}
