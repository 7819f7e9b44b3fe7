//! Error types for reading and writing containers

use apinotes_core::{EncodeError, FormatError};
use std::io;
use thiserror::Error;

/// Reasons a container is rejected
///
/// Reader construction is all-or-nothing: any of these means no reader was
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Buffer shorter than the signature
    #[error("Buffer too small: {size} bytes")]
    TooSmall {
        /// Buffer length
        size: usize,
    },

    /// Buffer does not start with the API notes signature
    #[error("Invalid signature: expected {expected:02x?}, got {actual:02x?}")]
    InvalidSignature {
        /// Expected magic bytes
        expected: [u8; 4],
        /// Bytes found
        actual: [u8; 4],
    },

    /// No control block anywhere in the container
    #[error("Missing control block")]
    MissingControlBlock,

    /// More than one control block
    #[error("Duplicate control block")]
    DuplicateControlBlock,

    /// Entity block appeared before the control block
    #[error("Block {block_id} ({name}) appears before the control block")]
    BlockBeforeControl {
        /// Offending block ID
        block_id: u32,
        /// Block name
        name: &'static str,
    },

    /// Control block lacks a METADATA record
    #[error("Control block has no metadata record")]
    MissingMetadata,

    /// Control block has two METADATA records
    #[error("Duplicate metadata record")]
    DuplicateMetadata,

    /// Format version differs from the one this reader understands
    #[error("Unsupported format version {major}.{minor} (expected {expected_major}.{expected_minor})")]
    VersionMismatch {
        /// Major version found
        major: u64,
        /// Minor version found
        minor: u64,
        /// Major version supported
        expected_major: u16,
        /// Minor version supported
        expected_minor: u16,
    },

    /// A record outside of any block
    #[error("Record kind {kind} at offset {offset} is outside any block")]
    TopLevelRecord {
        /// Record kind
        kind: u32,
        /// Offset of the record
        offset: usize,
    },

    /// Structural or payload decoding failure
    #[error("Malformed container: {0}")]
    Format(#[from] FormatError),
}

/// Errors producing a container
#[derive(Debug, Error)]
pub enum WriteError {
    /// A value cannot be represented in the format
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// The output sink failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Writer configuration is invalid
    #[error("Invalid writer config: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Module name is empty
    #[error("Module name must not be empty")]
    EmptyModuleName,

    /// Module name does not fit its length field
    #[error("Module name is {len} bytes, maximum is {max}")]
    ModuleNameTooLong {
        /// Actual length
        len: usize,
        /// Maximum length
        max: usize,
    },
}
