//! Forward Compatibility Tests
//!
//! Readers skip top-level blocks they do not know and ignore unknown
//! record kinds inside known blocks.

use crate::common::*;

fn sample() -> Vec<u8> {
    build("Foundation", |w| {
        let object = w.add_objc_context(
            "NSObject",
            ContextKind::Class,
            &ObjCContextInfo {
                swift_objc_members: Some(true),
                ..ObjCContextInfo::default()
            },
            unversioned(),
        );
        w.add_objc_property(
            object,
            "description",
            true,
            &ObjCPropertyInfo::default(),
            unversioned(),
        );
        w.add_global_variable("NSFoundationVersionNumber", &GlobalVariableInfo::default(), v(5, 0));
    })
}

fn assert_sample_readable(bytes: &[u8]) {
    let reader = open(bytes, v(5, 0));
    assert_eq!(reader.module_name(), "Foundation");
    let object = reader.lookup_objc_class_id("NSObject").unwrap();
    assert_eq!(
        reader
            .lookup_objc_class_info("NSObject")
            .selected()
            .and_then(|info| info.swift_objc_members),
        Some(true)
    );
    assert!(reader
        .lookup_objc_property_info(object, "description", true)
        .is_some());
    assert!(reader
        .lookup_global_variable_info("NSFoundationVersionNumber")
        .is_some());
}

#[test]
fn writer_emits_blocks_in_fixed_order() {
    let ids: Vec<u32> = block_spans(&sample()).into_iter().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec![
            block_ids::CONTROL,
            block_ids::IDENTIFIER,
            block_ids::OBJC_CONTEXT,
            block_ids::OBJC_PROPERTY,
            block_ids::OBJC_METHOD,
            block_ids::OBJC_SELECTOR,
            block_ids::GLOBAL_VARIABLE,
            block_ids::GLOBAL_FUNCTION,
            block_ids::ENUM_CONSTANT,
            block_ids::TAG,
            block_ids::TYPEDEF,
        ]
    );
}

#[test]
fn unknown_block_between_known_blocks_is_skipped() {
    let bytes = sample();
    let extended = insert_after_block(&bytes, block_ids::OBJC_CONTEXT, &unknown_block(200));
    assert_eq!(extended.len(), bytes.len() + unknown_block(200).len());
    assert_sample_readable(&extended);
}

#[test]
fn unknown_block_after_control_and_at_end_is_skipped() {
    let bytes = sample();
    let mut extended = insert_after_block(&bytes, block_ids::CONTROL, &unknown_block(77));
    extended.extend_from_slice(&unknown_block(300));
    assert_sample_readable(&extended);
}

#[test]
fn unknown_block_before_control_is_skipped() {
    let bytes = sample();
    let mut extended = bytes[..4].to_vec();
    extended.extend_from_slice(&unknown_block(99));
    extended.extend_from_slice(&bytes[4..]);
    assert_sample_readable(&extended);
}

#[test]
fn unknown_records_in_known_blocks_are_ignored() {
    let bytes = sample();
    let spans = block_spans(&bytes);

    // rebuild each known block with an extra record of an unused kind
    let mut w = BlockWriter::new();
    w.write_raw(&API_NOTES_SIGNATURE);
    let mut out = w.into_bytes();
    for (id, span) in spans {
        let body_start = span.start + SUBBLOCK_HEADER_LEN;
        // body without its END_BLOCK terminator
        let inner = &bytes[body_start..span.end - 1];

        let mut block = BlockWriter::new();
        let mark = block.enter_block(id);
        block.emit_record(999, &[1, 2], b"later addition").unwrap();
        block.write_raw(inner);
        block.emit_record(1000, &[], &[]).unwrap();
        block.exit_block(mark).unwrap();
        out.extend_from_slice(&block.into_bytes());
    }
    assert!(out.len() > bytes.len());
    assert_sample_readable(&out);
}

#[test]
fn extra_control_record_is_ignored() {
    let bytes = sample();
    let (_, control) = block_spans(&bytes)
        .into_iter()
        .find(|(id, _)| *id == block_ids::CONTROL)
        .unwrap();
    let inner = &bytes[control.start + SUBBLOCK_HEADER_LEN..control.end - 1];

    let mut w = BlockWriter::new();
    w.write_raw(&API_NOTES_SIGNATURE);
    let mark = w.enter_block(block_ids::CONTROL);
    w.write_raw(inner);
    w.emit_record(77, &[123], b"new control data").unwrap();
    w.exit_block(mark).unwrap();
    let mut out = w.into_bytes();
    out.extend_from_slice(&bytes[control.end..]);
    assert_sample_readable(&out);
}
