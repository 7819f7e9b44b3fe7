//! End-to-end Tests
//!
//! Write a container to disk, load it back and look things up across
//! threads.

use std::fs;
use std::sync::Arc;
use std::thread;

use crate::common::*;

fn foo_class() -> ObjCContextInfo {
    ObjCContextInfo {
        default_nullability: Some(NullabilityKind::NonNull),
        has_designated_inits: false,
        ..ObjCContextInfo::default()
    }
}

fn bar_property() -> ObjCPropertyInfo {
    ObjCPropertyInfo {
        variable: VariableInfo {
            common: named("baz"),
            nullability: Some(NullabilityKind::Nullable),
            type_name: String::new(),
        },
        swift_import_as_accessors: None,
    }
}

fn foo_container() -> Vec<u8> {
    build("FooKit", |w| {
        let foo = w.add_objc_context("Foo", ContextKind::Class, &foo_class(), unversioned());
        w.add_objc_property(foo, "bar", true, &bar_property(), v(2, 0));
    })
}

#[test]
fn class_and_versioned_property() {
    let bytes = foo_container();

    let reader = open(&bytes, v(3, 0));
    let foo = reader.lookup_objc_class_id("Foo").unwrap();
    let class = reader.lookup_objc_class_info("Foo");
    assert_eq!(class.selected(), Some(&foo_class()));
    assert_eq!(class.selected_version(), Some(unversioned()));

    // 2.0 is the least version at or above the query
    for query in [v(1, 0), v(2, 0)] {
        let reader = open(&bytes, query);
        let property = reader.lookup_objc_property_info(foo, "bar", true);
        assert_eq!(property.selected(), Some(&bar_property()), "query {}", query);
    }

    // nothing at or above 3.0 and no unversioned entry
    let property = reader.lookup_objc_property_info(foo, "bar", true);
    assert!(property.is_none());
    assert_eq!(property.get(0).map(|(version, _)| *version), Some(v(2, 0)));
}

#[test]
fn container_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let notes_path = dir.path().join("FooKit.apinotes");
    let binary_path = dir.path().join("FooKit.apinotesc");
    fs::write(&notes_path, b"Name: FooKit\n").unwrap();
    let source = SourceFileInfo::from_path(&notes_path).unwrap();

    let mut writer = ApiNotesWriter::with_config(
        WriterConfig::new("FooKit")
            .with_source_file(source)
            .with_module_options(ModuleOptions {
                swift_infer_import_as_member: true,
            }),
    );
    let foo = writer.add_objc_context("Foo", ContextKind::Class, &foo_class(), unversioned());
    writer.add_objc_property(foo, "bar", true, &bar_property(), v(2, 0));

    let mut file = fs::File::create(&binary_path).unwrap();
    writer.write_to_stream(&mut file).unwrap();
    drop(file);

    let bytes = fs::read(&binary_path).unwrap();
    let reader = ApiNotesReader::create(bytes, v(2, 0)).unwrap();
    assert_eq!(reader.state(), ReaderState::Ready);
    assert_eq!(reader.module_name(), "FooKit");
    assert_eq!(reader.source_file_size_and_modification_time(), Some(source));
    assert_eq!(source.size, 13);
    assert!(reader.module_options().swift_infer_import_as_member);
    assert!(reader
        .lookup_objc_property_info(foo, "bar", true)
        .is_some());
}

#[test]
fn reader_is_shared_across_threads() {
    let bytes = foo_container();
    let reader = Arc::new(ApiNotesReader::create(bytes, v(2, 0)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = Arc::clone(&reader);
            thread::spawn(move || {
                for _ in 0..100 {
                    let foo = reader.lookup_objc_class_id("Foo").unwrap();
                    assert!(reader.lookup_objc_property_info(foo, "bar", true).is_some());
                    assert!(reader.lookup_objc_protocol_id("Foo").is_none());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn context_ids_are_stable_and_increasing() {
    let mut writer = ApiNotesWriter::new("Ids", None);
    let a = writer.add_objc_context("A", ContextKind::Class, &ObjCContextInfo::default(), unversioned());
    let b = writer.add_objc_context("B", ContextKind::Protocol, &ObjCContextInfo::default(), unversioned());
    let a_again = writer.add_objc_context("A", ContextKind::Class, &ObjCContextInfo::default(), v(4, 0));
    assert_eq!(a, ContextId(1));
    assert_eq!(b, ContextId(2));
    assert_eq!(a_again, a);

    let bytes = writer.write_to_vec().unwrap();
    let reader = open(&bytes, v(4, 0));
    assert_eq!(reader.lookup_objc_class_id("A"), Some(a));
    assert_eq!(reader.lookup_objc_protocol_id("B"), Some(b));
    assert_eq!(reader.lookup_objc_class_info("A").len(), 2);
}
