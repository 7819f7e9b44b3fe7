//! Format Validation Tests
//!
//! Malformed containers are rejected as a whole; no partial reader is
//! ever produced.

use crate::common::*;

fn sample() -> Vec<u8> {
    build("UIKit", |w| {
        let view = w.add_objc_context("UIView", ContextKind::Class, &ObjCContextInfo::default(), unversioned());
        w.add_objc_method(
            view,
            &SelectorRef::parse("initWithFrame:").unwrap(),
            true,
            &ObjCMethodInfo::default(),
            unversioned(),
        );
        w.add_tag("UIControlState", &TagInfo::default(), v(4, 2));
    })
}

/// Offset of field `index` of the first record in top-level block `block_id`
fn first_record_field(bytes: &[u8], block_id: u32, index: usize) -> usize {
    let (_, span) = block_spans(bytes)
        .into_iter()
        .find(|(id, _)| *id == block_id)
        .unwrap();
    // code, kind, field count, blob length
    span.start + SUBBLOCK_HEADER_LEN + 1 + 4 + 2 + 4 + index * 8
}

#[test]
fn container_starts_with_signature() {
    let bytes = sample();
    assert_eq!(&bytes[..4], &[0xE2, 0x9C, 0xA8, 0x01]);
    assert_eq!(&bytes[..4], &API_NOTES_SIGNATURE);
}

#[test]
fn writer_output_is_deterministic() {
    assert_eq!(sample(), sample());
}

#[test]
fn bad_signature_is_rejected() {
    let mut bytes = sample();
    bytes[0] = b'B';
    assert!(matches!(
        ApiNotesReader::create(&bytes[..], unversioned()),
        Err(ReadError::InvalidSignature { .. })
    ));
}

#[test]
fn empty_buffer_is_rejected() {
    assert_eq!(
        ApiNotesReader::create(&[][..], unversioned()).unwrap_err(),
        ReadError::TooSmall { size: 0 }
    );
}

#[test]
fn version_mismatch_is_rejected() {
    let mut bytes = sample();
    let minor = first_record_field(&bytes, block_ids::CONTROL, 1);
    assert_eq!(
        u64::from_le_bytes(bytes[minor..minor + 8].try_into().unwrap()),
        VERSION_MINOR as u64
    );
    bytes[minor] += 1;
    assert_eq!(
        ApiNotesReader::create(&bytes[..], unversioned()).unwrap_err(),
        ReadError::VersionMismatch {
            major: VERSION_MAJOR as u64,
            minor: VERSION_MINOR as u64 + 1,
            expected_major: VERSION_MAJOR,
            expected_minor: VERSION_MINOR,
        }
    );
}

#[test]
fn inconsistent_table_offset_is_rejected() {
    let mut bytes = sample();
    let offset = first_record_field(&bytes, block_ids::IDENTIFIER, 0);
    // misaligned bucket array offset
    bytes[offset] += 1;
    assert!(matches!(
        ApiNotesReader::create(&bytes[..], unversioned()),
        Err(ReadError::Format(_))
    ));

    let mut bytes = sample();
    let offset = first_record_field(&bytes, block_ids::TAG, 0);
    bytes[offset..offset + 8].copy_from_slice(&u64::MAX.to_le_bytes());
    assert!(matches!(
        ApiNotesReader::create(&bytes[..], unversioned()),
        Err(ReadError::Format(_))
    ));
}

#[test]
fn duplicate_control_block_is_rejected() {
    let bytes = sample();
    let (_, control) = block_spans(&bytes)[0].clone();
    let extended = insert_after_block(&bytes, block_ids::TAG, &bytes[control]);
    assert_eq!(
        ApiNotesReader::create(&extended[..], unversioned()).unwrap_err(),
        ReadError::DuplicateControlBlock
    );
}

#[test]
fn entity_block_before_control_is_rejected() {
    let bytes = sample();
    let spans = block_spans(&bytes);
    let (_, control) = spans[0].clone();
    let (_, identifier) = spans[1].clone();

    // signature, identifier block, control block, rest
    let mut swapped = bytes[..4].to_vec();
    swapped.extend_from_slice(&bytes[identifier.clone()]);
    swapped.extend_from_slice(&bytes[control]);
    swapped.extend_from_slice(&bytes[identifier.end..]);
    assert_eq!(swapped.len(), bytes.len());
    assert!(matches!(
        ApiNotesReader::create(&swapped[..], unversioned()).unwrap_err(),
        ReadError::BlockBeforeControl {
            block_id: block_ids::IDENTIFIER,
            ..
        }
    ));
}

#[test]
fn trailing_garbage_is_rejected() {
    let mut bytes = sample();
    bytes.push(0x07);
    assert!(matches!(
        ApiNotesReader::create(&bytes[..], unversioned()),
        Err(ReadError::Format(FormatError::InvalidEntryCode { code: 0x07, .. }))
    ));
}

#[test]
fn truncation_inside_a_block_fails_atomically() {
    let bytes = sample();
    let boundaries: Vec<usize> = std::iter::once(4)
        .chain(block_spans(&bytes).into_iter().map(|(_, span)| span.end))
        .collect();

    for cut in 0..bytes.len() {
        if boundaries.contains(&cut) {
            continue;
        }
        let result = ApiNotesReader::create(&bytes[..cut], unversioned());
        assert!(result.is_err(), "truncation at {} was accepted", cut);
    }
}

#[test]
fn truncation_at_a_block_boundary_drops_later_tables() {
    let bytes = sample();
    let (_, control) = block_spans(&bytes)[0].clone();

    let reader = open(&bytes[..control.end], unversioned());
    assert_eq!(reader.module_name(), "UIKit");
    assert!(reader.lookup_objc_class_id("UIView").is_none());

    assert_eq!(
        ApiNotesReader::create(&bytes[..4], unversioned()).unwrap_err(),
        ReadError::MissingControlBlock
    );
}

#[test]
fn empty_module_name_is_a_write_error() {
    let result = ApiNotesWriter::new("", None).write_to_vec();
    assert!(matches!(
        result,
        Err(WriteError::Config(ConfigError::EmptyModuleName))
    ));
}

#[test]
fn oversized_string_is_a_write_error() {
    let mut writer = ApiNotesWriter::new("Big", None);
    writer.add_enum_constant(
        "kHuge",
        &EnumConstantInfo {
            common: named(&"x".repeat(70_000)),
        },
        unversioned(),
    );
    assert!(matches!(
        writer.write_to_vec(),
        Err(WriteError::Encode(EncodeError::StringTooLong {
            field: "swift_name",
            ..
        }))
    ));
}
