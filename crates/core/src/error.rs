//! Error types for API notes encoding and decoding
//!
//! Two families live here because both the format and store crates need
//! them:
//!
//! - `FormatError`: the bytes being decoded are malformed
//! - `EncodeError`: a producer handed the writer something the format
//!   cannot represent
//!
//! "Not found" is never an error; lookups report absence through empty
//! results instead.

use thiserror::Error;

/// Result alias for decoding operations
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Result alias for encoding operations
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Malformed container or payload bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ended before a field could be read
    #[error("Unexpected end of data at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof {
        /// Offset within the buffer being decoded
        offset: usize,
        /// Bytes still required
        needed: usize,
    },

    /// Decoder finished with bytes left over
    #[error("Trailing data: {remaining} bytes left after decoding")]
    TrailingData {
        /// Bytes left unread
        remaining: usize,
    },

    /// String blob is not valid UTF-8
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Enum discriminant out of range
    #[error("Invalid {kind} value: {value}")]
    InvalidEnumValue {
        /// Name of the enum being decoded
        kind: &'static str,
        /// Raw value found
        value: u64,
    },

    /// Version tuple with a component count outside 1..=4
    #[error("Invalid version component count: {0}")]
    InvalidVersionComponents(u8),

    /// Unknown abbreviation code in block framing
    #[error("Invalid entry code {code:#04x} at offset {offset}")]
    InvalidEntryCode {
        /// Code byte found
        code: u8,
        /// Offset of the code byte
        offset: usize,
    },

    /// Block body not terminated by END_BLOCK at its declared end
    #[error("Block {block_id} is not terminated at offset {offset}")]
    UnterminatedBlock {
        /// ID of the offending block
        block_id: u32,
        /// Offset where END_BLOCK was expected
        offset: usize,
    },

    /// Block length runs past its enclosing region
    #[error("Block {block_id} declares {declared} bytes but only {available} remain")]
    BlockOverrun {
        /// ID of the offending block
        block_id: u32,
        /// Declared body length
        declared: usize,
        /// Bytes available in the enclosing region
        available: usize,
    },

    /// Record is missing a required field
    #[error("Record kind {kind} has {found} fields, expected at least {expected}")]
    MissingField {
        /// Record kind
        kind: u32,
        /// Fields required
        expected: usize,
        /// Fields present
        found: usize,
    },

    /// Same table supplied twice within a container
    #[error("Duplicate {0} table")]
    DuplicateTable(&'static str),

    /// On-disk hash table structure is inconsistent
    #[error("Corrupt {table} table: {detail}")]
    CorruptTable {
        /// Table name
        table: &'static str,
        /// What was wrong
        detail: String,
    },

    /// Versioned entry list with no entries
    #[error("Versioned entry list is empty")]
    EmptyVersionedList,
}

/// Producer-side encoding limit violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// String longer than its 16-bit length field allows
    #[error("String field '{field}' is {len} bytes, maximum is {max}")]
    StringTooLong {
        /// Field being encoded
        field: &'static str,
        /// Actual length in bytes
        len: usize,
        /// Maximum encodable length
        max: usize,
    },

    /// Nullability slot beyond the payload's addressable range
    #[error("Nullability index {index} exceeds storage (maximum index is {max})")]
    NullabilityOverflow {
        /// Requested slot index
        index: u32,
        /// Largest addressable index
        max: u32,
    },

    /// More items than a 16-bit count field can hold
    #[error("Too many {what}: {count} (maximum is {max})")]
    TooMany {
        /// What was being counted
        what: &'static str,
        /// Actual count
        count: usize,
        /// Maximum encodable count
        max: usize,
    },
}
