use simple_test_case::test_case;

use version_set::{List, Version, set, version};

fn available() -> List {
    [
        "0.9.0",
        "1.0.0",
        "1.2.0",
        "1.2.1-rc.1",
        "1.3.0+build.1",
        "2.0.0-beta.1",
        "2.0.0",
    ]
    .into_iter()
    .map(|v| version!(v))
    .collect()
}

#[test_case("^1.0", Some(version!("1.3.0+build.1")); "caret")]
#[test_case("~1.2", Some(version!(1, 2, 0)); "tilde")]
#[test_case(">=2.0.0-beta.1", Some(version!(2, 0, 0)); "prerelease_boundary")]
#[test_case("2.0.0-beta.1", Some(version!("2.0.0-beta.1")); "requested_prerelease")]
#[test_case(">=3", None; "nothing")]
#[test]
fn newest_in(constraint: &str, expected: Option<Version>) {
    let list = available();
    let set = set!(constraint);
    assert_eq!(list.newest_in(&set), expected.as_ref());
}

#[test]
fn filter_then_list() {
    let list = available();
    let filtered = list.filter(&set!(">=1.0.0 <2.0.0"));
    assert_eq!(
        filtered.to_string(),
        "1.0.0, 1.2.0, 1.3.0+build.1"
    );
    assert_eq!(filtered.set().list(), Some(filtered.clone()));
}

#[test]
fn newest_overall() {
    let list = available();
    assert_eq!(list.newest(), Some(&version!(2, 0, 0)));
    assert_eq!(list.newest_list(), List::from(vec![version!(2, 0, 0)]));
}

#[test]
fn collect_sort_and_extend() {
    let mut list: List = [version!(2, 0, 0), version!(1, 0, 0)].into_iter().collect();
    list.extend([version!(1, 0, 0), version!("1.0.0-rc.1")]);
    list.push(version!(0, 1, 0));
    list.sort();
    list.dedup();
    assert_eq!(list.to_string(), "0.1.0, 1.0.0-rc.1, 1.0.0, 2.0.0");

    let owned = list.into_iter().map(|v| v.major()).collect::<Vec<_>>();
    assert_eq!(owned, vec![0, 1, 1, 2]);
}

#[test]
fn list_json() -> color_eyre::Result<()> {
    let list = List::from(vec![version!(1, 0, 0), version!("2.0.0-rc.1")]);
    let serialized = serde_json::to_string(&list)?;
    assert_eq!(serialized, r#"["1.0.0","2.0.0-rc.1"]"#);
    let deserialized: List = serde_json::from_str(&serialized)?;
    assert_eq!(deserialized, list);
    Ok(())
}
