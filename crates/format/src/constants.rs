//! Numeric contract of the API notes container
//!
//! Block IDs and record kinds are never reused for a different meaning
//! within one `VERSION_MAJOR.VERSION_MINOR`. Readers skip top-level blocks
//! they do not know and ignore unknown record kinds inside known blocks.
//!
//! # File Structure
//!
//! ```text
//! +---------------------+ 0
//! | Signature           | 4 bytes: E2 9C A8 01
//! +---------------------+ 4
//! | CONTROL block       | METADATA, MODULE_NAME, [SOURCE_FILE], [MODULE_OPTIONS]
//! +---------------------+
//! | IDENTIFIER block    | IDENTIFIER_DATA
//! | OBJC_CONTEXT block  | CONTEXT_ID_DATA, CONTEXT_INFO_DATA
//! | OBJC_PROPERTY block | OBJC_PROPERTY_DATA
//! | OBJC_METHOD block   | OBJC_METHOD_DATA
//! | OBJC_SELECTOR block | OBJC_SELECTOR_DATA
//! | GLOBAL_VARIABLE     | GLOBAL_VARIABLE_DATA
//! | GLOBAL_FUNCTION     | GLOBAL_FUNCTION_DATA
//! | ENUM_CONSTANT       | ENUM_CONSTANT_DATA
//! | TAG block           | TAG_DATA
//! | TYPEDEF block       | TYPEDEF_DATA
//! +---------------------+
//! ```
//!
//! Every table record carries one field (the bucket array offset inside
//! its blob) and the on-disk hash table as its blob.

/// Magic bytes at offset 0
pub const API_NOTES_SIGNATURE: [u8; 4] = [0xE2, 0x9C, 0xA8, 0x01];

/// Format major version; readers require an exact match
pub const VERSION_MAJOR: u16 = 0;

/// Format minor version; readers require an exact match
pub const VERSION_MINOR: u16 = 25;

/// Maximum length of a 16-bit-length-prefixed string
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Top-level block IDs
pub mod block_ids {
    /// Control block: version, module name, source file
    pub const CONTROL: u32 = 8;
    /// Identifier table
    pub const IDENTIFIER: u32 = 9;
    /// Objective-C context ID and context info tables
    pub const OBJC_CONTEXT: u32 = 10;
    /// Objective-C property table
    pub const OBJC_PROPERTY: u32 = 11;
    /// Objective-C method table
    pub const OBJC_METHOD: u32 = 12;
    /// Objective-C selector table
    pub const OBJC_SELECTOR: u32 = 13;
    /// Global variable table
    pub const GLOBAL_VARIABLE: u32 = 14;
    /// Global function table
    pub const GLOBAL_FUNCTION: u32 = 15;
    /// Tag table
    pub const TAG: u32 = 16;
    /// Typedef table
    pub const TYPEDEF: u32 = 17;
    /// Enumerator table
    pub const ENUM_CONSTANT: u32 = 18;

    /// Human-readable block name for logging
    pub fn block_name(id: u32) -> &'static str {
        match id {
            CONTROL => "control",
            IDENTIFIER => "identifier",
            OBJC_CONTEXT => "objc_context",
            OBJC_PROPERTY => "objc_property",
            OBJC_METHOD => "objc_method",
            OBJC_SELECTOR => "objc_selector",
            GLOBAL_VARIABLE => "global_variable",
            GLOBAL_FUNCTION => "global_function",
            TAG => "tag",
            TYPEDEF => "typedef",
            ENUM_CONSTANT => "enum_constant",
            _ => "unknown",
        }
    }
}

/// Record kinds in the control block
pub mod control_block {
    /// Fields: major, minor
    pub const METADATA: u32 = 1;
    /// Blob: module name
    pub const MODULE_NAME: u32 = 2;
    /// Fields: option flags
    pub const MODULE_OPTIONS: u32 = 3;
    /// Fields: size, modification time
    pub const SOURCE_FILE: u32 = 4;
}

/// Record kinds in the identifier block
pub mod identifier_block {
    /// Identifier table
    pub const IDENTIFIER_DATA: u32 = 1;
}

/// Record kinds in the Objective-C context block
pub mod objc_context_block {
    /// (name, is_protocol) → context ID table
    pub const OBJC_CONTEXT_ID_DATA: u32 = 1;
    /// Context ID → versioned context info table
    pub const OBJC_CONTEXT_INFO_DATA: u32 = 2;
}

/// Record kinds in the Objective-C property block
pub mod objc_property_block {
    /// Property table
    pub const OBJC_PROPERTY_DATA: u32 = 1;
}

/// Record kinds in the Objective-C method block
pub mod objc_method_block {
    /// Method table
    pub const OBJC_METHOD_DATA: u32 = 1;
}

/// Record kinds in the Objective-C selector block
pub mod objc_selector_block {
    /// Selector table
    pub const OBJC_SELECTOR_DATA: u32 = 1;
}

/// Record kinds in the global variable block
pub mod global_variable_block {
    /// Global variable table
    pub const GLOBAL_VARIABLE_DATA: u32 = 1;
}

/// Record kinds in the global function block
pub mod global_function_block {
    /// Global function table
    pub const GLOBAL_FUNCTION_DATA: u32 = 1;
}

/// Record kinds in the tag block
pub mod tag_block {
    /// Tag table
    pub const TAG_DATA: u32 = 1;
}

/// Record kinds in the typedef block
pub mod typedef_block {
    /// Typedef table
    pub const TYPEDEF_DATA: u32 = 1;
}

/// Record kinds in the enumerator block
pub mod enum_constant_block {
    /// Enumerator table
    pub const ENUM_CONSTANT_DATA: u32 = 1;
}

/// Bit assignments inside the MODULE_OPTIONS flags field
pub mod module_option_flags {
    /// Infer import-as-member
    pub const SWIFT_INFER_IMPORT_AS_MEMBER: u64 = 0x1;
}
