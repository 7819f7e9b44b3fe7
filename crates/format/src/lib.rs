//! Binary container format for API notes
//!
//! This crate turns annotation payloads into bytes and back. It knows
//! nothing about files or writers; `apinotes-store` assembles these pieces
//! into a container.
//!
//! - `constants`: signature, format version, block IDs, record kinds
//! - `bitstream`: block and record framing
//! - `payload`: bounds-checked little-endian cursors
//! - `versioned`: version tuples and versioned lists
//! - `entity`: per-payload codecs
//! - `hash_table`: the generic on-disk chained hash table
//! - `tables`: key/value strategies for every table in the container

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod constants;
pub mod entity;
pub mod hash_table;
pub mod payload;
pub mod tables;
pub mod versioned;

pub use bitstream::{entry_codes, BlockCursor, BlockMark, BlockWriter, Entry, Record, SubBlock};
pub use constants::{API_NOTES_SIGNATURE, MAX_STRING_LEN, VERSION_MAJOR, VERSION_MINOR};
pub use entity::EntityCodec;
pub use hash_table::{hash_key_bytes, OnDiskTable, OnDiskTableBuilder, TableInfo, TableLayout};
pub use payload::{PayloadReader, PayloadWriter};
pub use tables::{
    ContextIdTable, ContextInfoTable, ContextTableKey, EnumConstantTable, GlobalFunctionTable,
    GlobalVariableTable, IdentifierTable, KeyCodec, MethodTableKey, ObjCMethodTable,
    ObjCPropertyTable, PropertyTableKey, SelectorTable, TagTable, TypedefTable, VersionedPayload,
    VersionedTable,
};
