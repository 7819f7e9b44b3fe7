//! Round-trip Tests
//!
//! Every entity kind written by the writer reads back unchanged.

use crate::common::*;

fn function_info() -> FunctionInfo {
    let mut info = FunctionInfo {
        common: CommonEntityInfo {
            unavailable: false,
            unavailable_in_swift: true,
            unavailable_msg: "use the overlay".to_string(),
            swift_private: Some(true),
            swift_name: "draw(in:)".to_string(),
        },
        retain_count_convention: Some(RetainCountConventionKind::CFReturnsRetained),
        params: vec![
            ParamInfo {
                variable: VariableInfo {
                    common: CommonEntityInfo::default(),
                    nullability: Some(NullabilityKind::Nullable),
                    type_name: "CGContextRef".to_string(),
                },
                no_escape: Some(true),
                retain_count_convention: None,
            },
            ParamInfo {
                no_escape: Some(false),
                retain_count_convention: Some(RetainCountConventionKind::NSReturnsNotRetained),
                ..ParamInfo::default()
            },
        ],
        result_type: "CGImageRef".to_string(),
        ..FunctionInfo::default()
    };
    info.add_type_info(FunctionInfo::RETURN_INFO_INDEX, NullabilityKind::NullableResult)
        .unwrap();
    info.add_type_info(1, NullabilityKind::Nullable).unwrap();
    info.add_type_info(2, NullabilityKind::Unspecified).unwrap();
    info
}

#[test]
fn global_variable_round_trips() {
    let info = GlobalVariableInfo {
        common: CommonEntityInfo {
            unavailable: true,
            unavailable_msg: "removed".to_string(),
            ..named("defaultCenter")
        },
        nullability: Some(NullabilityKind::NonNull),
        type_name: "NSNotificationCenter *".to_string(),
    };
    let bytes = build("Foundation", |w| {
        w.add_global_variable("NSDefaultCenter", &info, unversioned())
    });
    let reader = open(&bytes, unversioned());
    let found = reader.lookup_global_variable_info("NSDefaultCenter");
    assert_eq!(found.len(), 1);
    assert_eq!(found.selected(), Some(&info));
}

#[test]
fn global_function_round_trips() {
    let info = function_info();
    let bytes = build("CoreGraphics", |w| {
        w.add_global_function("CGDrawImage", &info, unversioned())
    });
    let reader = open(&bytes, unversioned());
    let found = reader
        .lookup_global_function_info("CGDrawImage")
        .into_selected()
        .unwrap();
    assert_eq!(found, info);
    assert_eq!(found.return_type_info(), Some(NullabilityKind::NullableResult));
    assert_eq!(found.param_type_info(0), Some(NullabilityKind::Nullable));
    assert_eq!(found.param_type_info(5), Some(NullabilityKind::NonNull));
}

#[test]
fn enum_constant_round_trips() {
    let info = EnumConstantInfo {
        common: CommonEntityInfo {
            swift_private: Some(false),
            ..named("orderedSame")
        },
    };
    let bytes = build("Foundation", |w| {
        w.add_enum_constant("NSOrderedSame", &info, unversioned())
    });
    let reader = open(&bytes, unversioned());
    assert_eq!(
        reader.lookup_enum_constant_info("NSOrderedSame").selected(),
        Some(&info)
    );
}

#[test]
fn tag_round_trips_with_empty_bridge() {
    let info = TagInfo {
        common_type: CommonTypeInfo {
            common: named("Result"),
            swift_bridge: Some(String::new()),
            ns_error_domain: Some("NSCocoaErrorDomain".to_string()),
        },
        enum_extensibility: Some(EnumExtensibilityKind::Closed),
        flag_enum: Some(false),
    };
    let bytes = build("Foundation", |w| w.add_tag("NSComparisonResult", &info, unversioned()));
    let reader = open(&bytes, unversioned());
    let found = reader
        .lookup_tag_info("NSComparisonResult")
        .into_selected()
        .unwrap();
    // present-but-empty is distinct from absent
    assert_eq!(found.common_type.swift_bridge, Some(String::new()));
    assert_eq!(found, info);
}

#[test]
fn typedef_round_trips() {
    let info = TypedefInfo {
        common_type: CommonTypeInfo {
            common: CommonEntityInfo::default(),
            swift_bridge: None,
            ns_error_domain: None,
        },
        swift_wrapper: Some(SwiftNewTypeKind::Struct),
    };
    let bytes = build("Foundation", |w| w.add_typedef("NSNotificationName", &info, unversioned()));
    let reader = open(&bytes, unversioned());
    assert_eq!(
        reader.lookup_typedef_info("NSNotificationName").selected(),
        Some(&info)
    );
}

#[test]
fn context_property_and_method_round_trip() {
    let context_info = ObjCContextInfo {
        common_type: CommonTypeInfo {
            common: named("View"),
            swift_bridge: Some("SwiftView".to_string()),
            ns_error_domain: None,
        },
        has_designated_inits: true,
        default_nullability: Some(NullabilityKind::NonNull),
        swift_objc_members: Some(false),
        swift_import_as_non_generic: Some(true),
    };
    let property = ObjCPropertyInfo {
        variable: VariableInfo {
            common: CommonEntityInfo::default(),
            nullability: Some(NullabilityKind::Nullable),
            type_name: "UIColor *".to_string(),
        },
        swift_import_as_accessors: Some(true),
    };
    let method = ObjCMethodInfo {
        function: function_info(),
        required_init: true,
        designated_init: true,
    };
    let selector = SelectorRef::parse("initWithFrame:style:").unwrap();

    let bytes = build("UIKit", |w| {
        let view = w.add_objc_context("UIView", ContextKind::Class, &context_info, unversioned());
        w.add_objc_property(view, "backgroundColor", true, &property, unversioned());
        w.add_objc_method(view, &selector, true, &method, unversioned());
    });
    let reader = open(&bytes, unversioned());

    let view = reader.lookup_objc_class_id("UIView").unwrap();
    assert_eq!(view, ContextId(1));
    assert_eq!(
        reader.lookup_objc_class_info("UIView").selected(),
        Some(&context_info)
    );
    assert_eq!(
        reader
            .lookup_objc_property_info(view, "backgroundColor", true)
            .selected(),
        Some(&property)
    );
    assert!(reader
        .lookup_objc_property_info(view, "backgroundColor", false)
        .is_none());
    assert_eq!(
        reader
            .lookup_objc_method_info(view, &selector, true)
            .selected(),
        Some(&method)
    );
    assert!(reader
        .lookup_objc_method_info(view, &selector, false)
        .is_none());
}

#[test]
fn class_and_protocol_of_same_name_are_distinct() {
    let class_info = ObjCContextInfo {
        common_type: CommonTypeInfo {
            common: named("ClassSide"),
            ..CommonTypeInfo::default()
        },
        ..ObjCContextInfo::default()
    };
    let protocol_info = ObjCContextInfo {
        common_type: CommonTypeInfo {
            common: named("ProtocolSide"),
            ..CommonTypeInfo::default()
        },
        ..ObjCContextInfo::default()
    };
    let bytes = build("Foundation", |w| {
        w.add_objc_context("NSObject", ContextKind::Class, &class_info, unversioned());
        w.add_objc_context("NSObject", ContextKind::Protocol, &protocol_info, unversioned());
    });
    let reader = open(&bytes, unversioned());

    let class_id = reader.lookup_objc_class_id("NSObject").unwrap();
    let protocol_id = reader.lookup_objc_protocol_id("NSObject").unwrap();
    assert_ne!(class_id, protocol_id);
    assert_eq!(
        reader.lookup_objc_class_info("NSObject").selected(),
        Some(&class_info)
    );
    assert_eq!(
        reader.lookup_objc_protocol_info("NSObject").selected(),
        Some(&protocol_info)
    );
}

#[test]
fn selectors_round_trip_by_pieces_and_arity() {
    let info = |name: &str| ObjCMethodInfo {
        function: FunctionInfo {
            common: named(name),
            ..FunctionInfo::default()
        },
        ..ObjCMethodInfo::default()
    };
    let nullary = SelectorRef::nullary("count");
    let unary = SelectorRef::parse("count:").unwrap();
    let binary = SelectorRef::parse("insertObject:atIndex:").unwrap();

    let bytes = build("Foundation", |w| {
        let array = w.add_objc_context(
            "NSMutableArray",
            ContextKind::Class,
            &ObjCContextInfo::default(),
            unversioned(),
        );
        w.add_objc_method(array, &nullary, true, &info("nullary"), unversioned());
        w.add_objc_method(array, &unary, true, &info("unary"), unversioned());
        w.add_objc_method(array, &binary, true, &info("binary"), unversioned());
    });
    let reader = open(&bytes, unversioned());
    let array = reader.lookup_objc_class_id("NSMutableArray").unwrap();

    let swift_name = |selector: &SelectorRef<'_>| {
        reader
            .lookup_objc_method_info(array, selector, true)
            .into_selected()
            .map(|m| m.function.common.swift_name)
    };
    assert_eq!(swift_name(&nullary).as_deref(), Some("nullary"));
    assert_eq!(swift_name(&unary).as_deref(), Some("unary"));
    assert_eq!(swift_name(&binary).as_deref(), Some("binary"));
    assert_eq!(swift_name(&SelectorRef::parse("insertObject:").unwrap()), None);
    assert_eq!(swift_name(&SelectorRef::parse("removeAllObjects").unwrap()), None);
}

#[test]
fn absent_names_return_empty_results() {
    let bytes = build("Empty", |_| {});
    let reader = open(&bytes, v(5, 0));
    assert!(reader.lookup_objc_class_id("NSObject").is_none());
    assert!(reader.lookup_objc_class_info("NSObject").is_none());
    assert!(reader.lookup_global_function_info("").is_none());
    assert!(reader
        .lookup_objc_property_info(ContextId(1), "frame", true)
        .is_none());
    assert!(reader
        .lookup_objc_method_info(ContextId(1), &SelectorRef::nullary("init"), true)
        .is_none());
}

#[test]
fn empty_name_is_a_valid_key() {
    let info = EnumConstantInfo {
        common: named("anonymous"),
    };
    let bytes = build("Anon", |w| w.add_enum_constant("", &info, unversioned()));
    let reader = open(&bytes, unversioned());
    assert_eq!(reader.lookup_enum_constant_info("").selected(), Some(&info));
    assert!(reader.identifiers().is_empty());
}

#[test]
fn identifiers_are_shared_across_tables() {
    let bytes = build("Shared", |w| {
        w.add_global_variable("shared", &GlobalVariableInfo::default(), unversioned());
        w.add_global_function("shared", &GlobalFunctionInfo::default(), unversioned());
        w.add_tag("shared", &TagInfo::default(), unversioned());
    });
    let reader = open(&bytes, unversioned());
    assert_eq!(
        reader.identifiers(),
        vec![("shared".to_string(), IdentifierId(1))]
    );
}
