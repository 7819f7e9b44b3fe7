//! Compiler Tests
//!
//! Structured notes compiled to a container read back through the reader.

use crate::common::*;

const UIKIT: &str = r#"{
    "Name": "UIKit",
    "SwiftInferImportAsMember": true,
    "Classes": [{
        "Name": "UIView",
        "AuditedForNullability": true,
        "SwiftName": "View",
        "Methods": [{
            "Selector": "initWithFrame:",
            "MethodKind": "Instance",
            "DesignatedInit": true,
            "Nullability": ["N"]
        }, {
            "Selector": "layerClass",
            "MethodKind": "Class",
            "NullabilityOfRet": "O"
        }],
        "Properties": [
            { "Name": "tintColor", "Nullability": "Optional" },
            { "Name": "frame", "PropertyKind": "Instance", "Type": "CGRect" }
        ]
    }],
    "Protocols": [{ "Name": "UIView", "SwiftName": "ViewProtocol" }],
    "Functions": [{
        "Name": "UIGraphicsGetCurrentContext",
        "NullabilityOfRet": "Optional",
        "Parameters": [{ "Position": 1, "NoEscape": true }]
    }],
    "Tags": [{ "Name": "UIControlState", "EnumKind": "NSOptions" }],
    "Enumerators": [{ "Name": "UIControlStateNormal", "SwiftName": "normal" }],
    "Typedefs": [{ "Name": "UIWindowLevel", "SwiftWrapper": "struct" }],
    "Globals": [{ "Name": "UIKeyInputEscape", "Availability": "nonswift", "AvailabilityMsg": "use Key.escape" }],
    "SwiftVersions": [{
        "Version": 4,
        "Classes": [{ "Name": "UIView", "SwiftName": "UIView" }],
        "Typedefs": [{ "Name": "UIWindowLevel", "SwiftWrapper": "none" }]
    }]
}"#;

fn compiled() -> Vec<u8> {
    let mut sink = CollectingSink::new();
    let bytes = compile_json(UIKIT, None, &mut sink).unwrap();
    assert!(sink.diagnostics().is_empty(), "{:?}", sink.diagnostics());
    bytes
}

#[test]
fn compiled_module_reads_back() {
    let bytes = compiled();
    let reader = open(&bytes, unversioned());
    assert_eq!(reader.module_name(), "UIKit");
    assert!(reader.module_options().swift_infer_import_as_member);

    let class = reader.lookup_objc_class_info("UIView");
    let info = class.selected().unwrap();
    assert_eq!(info.common_type.common.swift_name, "View");
    assert_eq!(info.default_nullability, Some(NullabilityKind::NonNull));
    assert_eq!(
        reader
            .lookup_objc_protocol_info("UIView")
            .selected()
            .map(|p| p.common_type.common.swift_name.as_str()),
        Some("ViewProtocol")
    );

    let view = reader.lookup_objc_class_id("UIView").unwrap();
    let init = reader
        .lookup_objc_method_info(view, &SelectorRef::parse("initWithFrame:").unwrap(), true)
        .into_selected()
        .unwrap();
    assert!(init.designated_init);
    assert_eq!(init.function.param_type_info(0), Some(NullabilityKind::NonNull));
    assert_eq!(init.function.return_type_info(), Some(NullabilityKind::NonNull));

    let layer_class = reader
        .lookup_objc_method_info(view, &SelectorRef::nullary("layerClass"), false)
        .into_selected()
        .unwrap();
    assert_eq!(layer_class.function.return_type_info(), Some(NullabilityKind::Nullable));

    // no PropertyKind: stored as both instance and class property
    for is_instance in [true, false] {
        assert_eq!(
            reader
                .lookup_objc_property_info(view, "tintColor", is_instance)
                .selected()
                .and_then(|p| p.variable.nullability),
            Some(NullabilityKind::Nullable)
        );
    }
    assert!(reader.lookup_objc_property_info(view, "frame", true).is_some());
    assert!(reader.lookup_objc_property_info(view, "frame", false).is_none());
}

#[test]
fn compiled_globals_read_back() {
    let bytes = compiled();
    let reader = open(&bytes, unversioned());

    let function = reader
        .lookup_global_function_info("UIGraphicsGetCurrentContext")
        .into_selected()
        .unwrap();
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[1].no_escape, Some(true));
    assert_eq!(function.return_type_info(), Some(NullabilityKind::Nullable));

    let tag = reader.lookup_tag_info("UIControlState").into_selected().unwrap();
    assert_eq!(tag.enum_extensibility, Some(EnumExtensibilityKind::Open));
    assert_eq!(tag.flag_enum, Some(true));

    let constant = reader
        .lookup_enum_constant_info("UIControlStateNormal")
        .into_selected()
        .unwrap();
    assert_eq!(constant.common.swift_name, "normal");

    let global = reader
        .lookup_global_variable_info("UIKeyInputEscape")
        .into_selected()
        .unwrap();
    assert!(global.common.unavailable_in_swift);
    assert_eq!(global.common.unavailable_msg, "use Key.escape");
}

#[test]
fn swift_version_sections_are_versioned_entries() {
    let bytes = compiled();

    let reader = open(&bytes, VersionTuple::new(4));
    let class = reader.lookup_objc_class_info("UIView");
    assert_eq!(class.len(), 2);
    assert_eq!(
        class.selected().map(|c| c.common_type.common.swift_name.as_str()),
        Some("UIView")
    );
    assert_eq!(
        reader
            .lookup_typedef_info("UIWindowLevel")
            .selected()
            .and_then(|t| t.swift_wrapper),
        Some(SwiftNewTypeKind::None)
    );

    let reader = open(&bytes, VersionTuple::new(5));
    assert_eq!(
        reader
            .lookup_typedef_info("UIWindowLevel")
            .selected()
            .and_then(|t| t.swift_wrapper),
        Some(SwiftNewTypeKind::Struct)
    );
}

#[test]
fn errors_fail_the_whole_conversion() {
    let text = r#"{
        "Name": "Broken",
        "Tags": [
            { "Name": "T", "EnumKind": "CFEnum", "FlagEnum": false },
            { "Name": "T" }
        ],
        "Functions": [{ "Name": "f", "AvailabilityMsg": "unused" }],
        "Classes": [{
            "Name": "C",
            "Methods": [{ "Selector": "a:b", "MethodKind": "Instance" }]
        }]
    }"#;
    let mut sink = CollectingSink::new();
    let result = compile_json(text, None, &mut sink);
    assert!(matches!(result, Err(CompileError::Diagnostics { errors: 4 })));
    assert_eq!(
        sink.error_messages(),
        vec![
            "selector 'a:b' is missing a ':' at the end",
            "availability message for available API 'f' will not be used",
            "cannot mix EnumKind and FlagEnum (for T)",
            "multiple definitions of tag 'T'",
        ]
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut sink = CollectingSink::new();
    assert!(matches!(
        compile_json("{ not json", None, &mut sink),
        Err(CompileError::Parse(_))
    ));
    assert!(sink.diagnostics().is_empty());
}
