//! Shared helpers for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::ops::Range;

pub use apinotes::format::constants::{block_ids, control_block};
pub use apinotes::format::{
    BlockCursor, BlockWriter, Entry, API_NOTES_SIGNATURE, VERSION_MAJOR, VERSION_MINOR,
};
pub use apinotes::*;

/// Bytes of an ENTER_SUBBLOCK header: code, block ID, body length
pub const SUBBLOCK_HEADER_LEN: usize = 9;

pub fn v(major: u32, minor: u32) -> VersionTuple {
    VersionTuple::with_minor(major, minor)
}

pub fn unversioned() -> VersionTuple {
    VersionTuple::empty()
}

pub fn named(swift_name: &str) -> CommonEntityInfo {
    CommonEntityInfo {
        swift_name: swift_name.to_string(),
        ..CommonEntityInfo::default()
    }
}

/// Build a container with a writer configured by `build`
pub fn build(module: &str, build: impl FnOnce(&mut ApiNotesWriter)) -> Vec<u8> {
    let mut writer = ApiNotesWriter::new(module, None);
    build(&mut writer);
    writer.write_to_vec().expect("write container")
}

pub fn open(bytes: &[u8], version: VersionTuple) -> ApiNotesReader<'_> {
    ApiNotesReader::create(bytes, version).expect("open container")
}

/// Top-level blocks as (block ID, byte range of the whole entry)
pub fn block_spans(bytes: &[u8]) -> Vec<(u32, Range<usize>)> {
    BlockCursor::top_level(&bytes[4..], 4)
        .map(|entry| match entry.expect("well-formed container") {
            Entry::SubBlock(block) => (
                block.block_id,
                block.body_offset - SUBBLOCK_HEADER_LEN..block.body_offset + block.body.len(),
            ),
            Entry::Record(record) => panic!("unexpected top-level record {}", record.kind),
        })
        .collect()
}

/// Insert `raw` right after the top-level block `after`
pub fn insert_after_block(bytes: &[u8], after: u32, raw: &[u8]) -> Vec<u8> {
    let (_, span) = block_spans(bytes)
        .into_iter()
        .find(|(id, _)| *id == after)
        .expect("block present");
    let mut out = bytes[..span.end].to_vec();
    out.extend_from_slice(raw);
    out.extend_from_slice(&bytes[span.end..]);
    out
}

/// A well-framed block with an ID no reader knows, holding records and a nested block
pub fn unknown_block(block_id: u32) -> Vec<u8> {
    let mut w = BlockWriter::new();
    let outer = w.enter_block(block_id);
    w.emit_record(1, &[7, 8, 9], b"future payload").unwrap();
    let inner = w.enter_block(block_id + 1);
    w.emit_record(42, &[], &[0xFF; 16]).unwrap();
    w.exit_block(inner).unwrap();
    w.exit_block(outer).unwrap();
    w.into_bytes()
}
