//! Version Selection Tests
//!
//! The applicable entry for query `V` is the first versioned entry `>= V`,
//! falling back to the unversioned entry. An empty query takes the first
//! entry.

use crate::common::*;

fn typedef(name: &str) -> TypedefInfo {
    TypedefInfo {
        common_type: CommonTypeInfo {
            common: named(name),
            ..CommonTypeInfo::default()
        },
        swift_wrapper: None,
    }
}

/// Container with `NSInteger` at {unversioned, 2.0, 4.0} and `NSUInteger` at {2.0, 4.0}
fn container() -> Vec<u8> {
    build("Foundation", |w| {
        // added out of order on purpose
        w.add_typedef("NSInteger", &typedef("four"), v(4, 0));
        w.add_typedef("NSInteger", &typedef("default"), unversioned());
        w.add_typedef("NSInteger", &typedef("two"), v(2, 0));
        w.add_typedef("NSUInteger", &typedef("four"), v(4, 0));
        w.add_typedef("NSUInteger", &typedef("two"), v(2, 0));
    })
}

fn selected(bytes: &[u8], name: &str, query: VersionTuple) -> Option<String> {
    open(bytes, query)
        .lookup_typedef_info(name)
        .into_selected()
        .map(|info| info.common_type.common.swift_name)
}

#[test]
fn entries_are_stored_in_ascending_order() {
    let bytes = container();
    let reader = open(&bytes, unversioned());
    let info = reader.lookup_typedef_info("NSInteger");
    let versions: Vec<_> = info.iter().map(|(version, _)| *version).collect();
    assert_eq!(versions, vec![unversioned(), v(2, 0), v(4, 0)]);
}

#[test]
fn query_selects_least_newer_or_equal() {
    let bytes = container();
    assert_eq!(selected(&bytes, "NSInteger", v(1, 0)).as_deref(), Some("two"));
    assert_eq!(selected(&bytes, "NSInteger", v(2, 0)).as_deref(), Some("two"));
    assert_eq!(selected(&bytes, "NSInteger", v(3, 5)).as_deref(), Some("four"));
    assert_eq!(selected(&bytes, "NSInteger", v(4, 0)).as_deref(), Some("four"));
}

#[test]
fn query_past_every_version_falls_back_to_unversioned() {
    let bytes = container();
    assert_eq!(selected(&bytes, "NSInteger", v(5, 0)).as_deref(), Some("default"));
}

#[test]
fn query_past_every_version_without_default_is_not_found() {
    let bytes = container();
    let reader = open(&bytes, v(5, 0));
    let info = reader.lookup_typedef_info("NSUInteger");
    assert!(info.is_none());
    assert_eq!(info.selected_index(), None);
    // the history is still available
    assert_eq!(info.len(), 2);
}

#[test]
fn empty_query_selects_first_entry() {
    let bytes = container();
    assert_eq!(selected(&bytes, "NSInteger", unversioned()).as_deref(), Some("default"));
    assert_eq!(selected(&bytes, "NSUInteger", unversioned()).as_deref(), Some("two"));
}

#[test]
fn shorter_versions_compare_as_zero_padded() {
    let bytes = container();
    assert_eq!(
        selected(&bytes, "NSInteger", VersionTuple::new(4)).as_deref(),
        Some("four")
    );
    assert_eq!(
        selected(&bytes, "NSInteger", VersionTuple::with_subminor(2, 0, 1)).as_deref(),
        Some("four")
    );
}

#[test]
fn all_zero_version_is_the_unversioned_default() {
    let bytes = build("Foundation", |w| {
        w.add_typedef("NSZone", &typedef("zero"), v(0, 0));
        w.add_typedef("NSZone", &typedef("three"), v(3, 0));
    });

    let reader = open(&bytes, v(5, 0));
    let info = reader.lookup_typedef_info("NSZone");
    assert_eq!(info.len(), 2);
    assert_eq!(
        info.selected().map(|t| t.common_type.common.swift_name.as_str()),
        Some("zero")
    );
    assert!(info.selected_version().map_or(false, |version| version.is_empty()));

    assert_eq!(selected(&bytes, "NSZone", v(2, 0)).as_deref(), Some("three"));
    assert_eq!(selected(&bytes, "NSZone", unversioned()).as_deref(), Some("zero"));
}

#[test]
fn all_zero_version_replaces_unversioned_entry() {
    let bytes = build("Foundation", |w| {
        w.add_typedef("NSZone", &typedef("first"), unversioned());
        w.add_typedef("NSZone", &typedef("second"), v(0, 0));
    });
    let reader = open(&bytes, v(1, 0));
    let info = reader.lookup_typedef_info("NSZone");
    assert_eq!(info.len(), 1);
    assert_eq!(
        info.selected().map(|t| t.common_type.common.swift_name.as_str()),
        Some("second")
    );
}

#[test]
fn reader_config_carries_query_version() {
    let bytes = container();
    let reader =
        ApiNotesReader::with_config(&bytes[..], ReaderConfig::default().with_swift_version(v(1, 0)))
            .unwrap();
    assert_eq!(reader.swift_version(), v(1, 0));
    let info = reader.lookup_typedef_info("NSInteger");
    assert_eq!(info.selected_version(), Some(v(2, 0)));
    assert_eq!(info.selected_index(), Some(1));
}

#[test]
fn same_version_replaces_previous_entry() {
    let bytes = build("Foundation", |w| {
        w.add_typedef("NSTimeInterval", &typedef("first"), v(4, 2));
        w.add_typedef("NSTimeInterval", &typedef("second"), v(4, 2));
    });
    let reader = open(&bytes, v(4, 2));
    let info = reader.lookup_typedef_info("NSTimeInterval");
    assert_eq!(info.len(), 1);
    assert_eq!(
        info.selected().map(|t| t.common_type.common.swift_name.as_str()),
        Some("second")
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn version() -> impl Strategy<Value = VersionTuple> {
        (1u32..6, 0u32..3).prop_map(|(major, minor)| v(major, minor))
    }

    proptest! {
        #[test]
        fn stored_selection_matches_the_rule(
            versions in proptest::collection::btree_set(version(), 0..5),
            with_default in any::<bool>(),
            query in proptest::option::of(version()),
        ) {
            prop_assume!(with_default || !versions.is_empty());
            let query = query.unwrap_or_else(unversioned);

            let mut stored: BTreeSet<VersionTuple> = versions.clone();
            if with_default {
                stored.insert(unversioned());
            }
            let bytes = build("Random", |w| {
                for version in &stored {
                    w.add_typedef("T", &typedef(&version.to_string()), *version);
                }
            });

            let reader = open(&bytes, query);
            let info = reader.lookup_typedef_info("T");
            let ascending: Vec<VersionTuple> = info.iter().map(|(version, _)| *version).collect();
            prop_assert_eq!(&ascending, &stored.iter().copied().collect::<Vec<_>>());

            // least stored version at or above the query, else the default
            let expected = if query == unversioned() {
                stored.iter().next().copied()
            } else {
                versions
                    .iter()
                    .copied()
                    .filter(|version| *version >= query)
                    .min()
                    .or_else(|| with_default.then(unversioned))
            };
            prop_assert_eq!(info.selected_version(), expected);
            prop_assert_eq!(
                info.selected().map(|t| t.common_type.common.swift_name.clone()),
                expected.map(|version| version.to_string())
            );
        }
    }
}
