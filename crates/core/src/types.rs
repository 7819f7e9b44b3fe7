//! Annotation payload types
//!
//! The payloads form a hierarchy expressed by composition: each richer
//! struct embeds the simpler one by value.
//!
//! ```text
//! CommonEntityInfo
//! ├── CommonTypeInfo ── ObjCContextInfo, TagInfo, TypedefInfo
//! ├── VariableInfo ──── ObjCPropertyInfo, ParamInfo, GlobalVariableInfo
//! ├── FunctionInfo ──── ObjCMethodInfo, GlobalFunctionInfo
//! └── EnumConstantInfo
//! ```
//!
//! Strings that are "absent" when empty (`unavailable_msg`, `swift_name`,
//! `type_name`, `result_type`) are plain `String`s; strings that distinguish
//! empty from absent (`swift_bridge`, `ns_error_domain`) are `Option<String>`.

use crate::error::{EncodeError, EncodeResult};
use serde::{Deserialize, Serialize};

/// Nullability of a pointer-like type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullabilityKind {
    /// Never null
    #[serde(rename = "Nonnull", alias = "N")]
    NonNull = 0,
    /// May be null
    #[serde(rename = "Optional", alias = "O")]
    Nullable = 1,
    /// Nullability not specified
    #[serde(rename = "Unspecified", alias = "U", alias = "S", alias = "Scalar")]
    Unspecified = 2,
    /// Null only on the error path of a result
    #[serde(rename = "NullableResult")]
    NullableResult = 3,
}

impl NullabilityKind {
    /// Decode from the 2-bit stored form
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(NullabilityKind::NonNull),
            1 => Some(NullabilityKind::Nullable),
            2 => Some(NullabilityKind::Unspecified),
            3 => Some(NullabilityKind::NullableResult),
            _ => None,
        }
    }
}

/// Ownership convention for returned or out-parameter objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetainCountConventionKind {
    /// No convention
    #[serde(rename = "none")]
    None = 0,
    /// Core Foundation, returns +1
    CFReturnsRetained = 1,
    /// Core Foundation, returns +0
    CFReturnsNotRetained = 2,
    /// Cocoa, returns +1
    NSReturnsRetained = 3,
    /// Cocoa, returns +0
    NSReturnsNotRetained = 4,
}

impl RetainCountConventionKind {
    /// Decode from the stored discriminant
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(RetainCountConventionKind::None),
            1 => Some(RetainCountConventionKind::CFReturnsRetained),
            2 => Some(RetainCountConventionKind::CFReturnsNotRetained),
            3 => Some(RetainCountConventionKind::NSReturnsRetained),
            4 => Some(RetainCountConventionKind::NSReturnsNotRetained),
            _ => None,
        }
    }
}

/// Whether an enum may gain cases in the future
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumExtensibilityKind {
    /// Not an extensible enum
    None = 0,
    /// Open enum
    Open = 1,
    /// Closed enum
    Closed = 2,
}

impl EnumExtensibilityKind {
    /// Decode from the stored discriminant
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(EnumExtensibilityKind::None),
            1 => Some(EnumExtensibilityKind::Open),
            2 => Some(EnumExtensibilityKind::Closed),
            _ => None,
        }
    }
}

/// Kind of new-type wrapper imported for a typedef
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwiftNewTypeKind {
    /// No wrapper
    None = 0,
    /// Wrapped as a struct
    Struct = 1,
    /// Wrapped as an enum
    Enum = 2,
}

impl SwiftNewTypeKind {
    /// Decode from the stored discriminant
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(SwiftNewTypeKind::None),
            1 => Some(SwiftNewTypeKind::Struct),
            2 => Some(SwiftNewTypeKind::Enum),
            _ => None,
        }
    }
}

/// Information shared by every annotated entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonEntityInfo {
    /// Unavailable everywhere
    pub unavailable: bool,
    /// Unavailable only in Swift
    pub unavailable_in_swift: bool,
    /// Message shown when the entity is used while unavailable
    pub unavailable_msg: String,
    /// Explicit "treat as private" setting, if any
    pub swift_private: Option<bool>,
    /// Name override in the importing language
    pub swift_name: String,
}

impl CommonEntityInfo {
    /// Fill fields this info leaves unset from `other`
    pub fn merge_from(&mut self, other: &CommonEntityInfo) {
        if other.unavailable {
            self.unavailable = true;
            if self.unavailable_msg.is_empty() {
                self.unavailable_msg = other.unavailable_msg.clone();
            }
        }
        if other.unavailable_in_swift {
            self.unavailable_in_swift = true;
            if self.unavailable_msg.is_empty() {
                self.unavailable_msg = other.unavailable_msg.clone();
            }
        }
        if self.swift_private.is_none() {
            self.swift_private = other.swift_private;
        }
        if self.swift_name.is_empty() {
            self.swift_name = other.swift_name.clone();
        }
    }
}

/// Information shared by type declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonTypeInfo {
    /// Entity-level information
    pub common: CommonEntityInfo,
    /// Type this one bridges to
    pub swift_bridge: Option<String>,
    /// Error domain associated with this type
    pub ns_error_domain: Option<String>,
}

impl CommonTypeInfo {
    /// Fill fields this info leaves unset from `other`
    pub fn merge_from(&mut self, other: &CommonTypeInfo) {
        self.common.merge_from(&other.common);
        if self.swift_bridge.is_none() {
            self.swift_bridge = other.swift_bridge.clone();
        }
        if self.ns_error_domain.is_none() {
            self.ns_error_domain = other.ns_error_domain.clone();
        }
    }
}

/// Information about a variable, property or parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableInfo {
    /// Entity-level information
    pub common: CommonEntityInfo,
    /// Audited nullability, if any
    pub nullability: Option<NullabilityKind>,
    /// Type override as written in the source language
    pub type_name: String,
}

impl VariableInfo {
    /// Fill fields this info leaves unset from `other`
    pub fn merge_from(&mut self, other: &VariableInfo) {
        self.common.merge_from(&other.common);
        if self.nullability.is_none() {
            self.nullability = other.nullability;
        }
        if self.type_name.is_empty() {
            self.type_name = other.type_name.clone();
        }
    }
}

/// Global variable information
pub type GlobalVariableInfo = VariableInfo;

/// Information about a function or method parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamInfo {
    /// Variable-level information
    pub variable: VariableInfo,
    /// Whether the parameter does not escape, if specified
    pub no_escape: Option<bool>,
    /// Ownership convention, if specified
    pub retain_count_convention: Option<RetainCountConventionKind>,
}

impl ParamInfo {
    /// Fill fields this info leaves unset from `other`
    pub fn merge_from(&mut self, other: &ParamInfo) {
        self.variable.merge_from(&other.variable);
        if self.no_escape.is_none() {
            self.no_escape = other.no_escape;
        }
        if self.retain_count_convention.is_none() {
            self.retain_count_convention = other.retain_count_convention;
        }
    }
}

/// Information about a function or method signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Entity-level information
    pub common: CommonEntityInfo,
    /// Ownership convention of the result, if specified
    pub retain_count_convention: Option<RetainCountConventionKind>,
    /// Whether the signature has been audited for nullability
    pub nullability_audited: bool,
    /// Number of slots (return value included) with explicit nullability
    pub num_adjusted_nullable: u8,
    /// Two bits of nullability per slot; slot 0 is the return value
    pub nullability_payload: u64,
    /// Per-parameter information
    pub params: Vec<ParamInfo>,
    /// Result type override
    pub result_type: String,
}

/// Global function information
pub type GlobalFunctionInfo = FunctionInfo;

impl FunctionInfo {
    /// Bits used per nullability slot
    pub const NULLABILITY_KIND_SIZE: u32 = 2;
    /// Mask for one nullability slot
    pub const NULLABILITY_KIND_MASK: u64 = 0x3;
    /// Slot holding the return value's nullability
    pub const RETURN_INFO_INDEX: u32 = 0;
    /// Number of slots the payload can hold
    pub const NULLABILITY_SLOTS: u32 = u64::BITS / Self::NULLABILITY_KIND_SIZE;

    /// Largest addressable slot index
    pub const fn max_nullability_index() -> u32 {
        Self::NULLABILITY_SLOTS - 1
    }

    /// Record the nullability of slot `index` and mark the signature audited
    ///
    /// Widens `num_adjusted_nullable` to cover `index`.
    pub fn add_type_info(&mut self, index: u32, kind: NullabilityKind) -> EncodeResult<()> {
        if index > Self::max_nullability_index() {
            return Err(EncodeError::NullabilityOverflow {
                index,
                max: Self::max_nullability_index(),
            });
        }
        self.nullability_audited = true;
        self.num_adjusted_nullable = self.num_adjusted_nullable.max(index as u8 + 1);
        let shift = index * Self::NULLABILITY_KIND_SIZE;
        self.nullability_payload &= !(Self::NULLABILITY_KIND_MASK << shift);
        self.nullability_payload |= (kind as u64) << shift;
        Ok(())
    }

    /// Nullability of slot `index`.
    ///
    /// `None` when the signature is unaudited. Slots past
    /// `num_adjusted_nullable` default to non-null.
    pub fn type_info(&self, index: u32) -> Option<NullabilityKind> {
        if !self.nullability_audited {
            return None;
        }
        if index >= u32::from(self.num_adjusted_nullable) || index >= Self::NULLABILITY_SLOTS {
            return Some(NullabilityKind::NonNull);
        }
        let raw = (self.nullability_payload >> (index * Self::NULLABILITY_KIND_SIZE))
            & Self::NULLABILITY_KIND_MASK;
        NullabilityKind::from_raw(raw as u8)
    }

    /// Nullability of parameter `param` (zero-based)
    pub fn param_type_info(&self, param: u32) -> Option<NullabilityKind> {
        self.type_info(param + 1)
    }

    /// Nullability of the return value
    pub fn return_type_info(&self) -> Option<NullabilityKind> {
        self.type_info(Self::RETURN_INFO_INDEX)
    }
}

/// Information about an Objective-C class or protocol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjCContextInfo {
    /// Type-level information
    pub common_type: CommonTypeInfo,
    /// Whether the context declares designated initializers
    pub has_designated_inits: bool,
    /// Default nullability for members, if audited
    pub default_nullability: Option<NullabilityKind>,
    /// Whether all members are imported, if specified
    pub swift_objc_members: Option<bool>,
    /// Whether to import as non-generic, if specified
    pub swift_import_as_non_generic: Option<bool>,
}

impl ObjCContextInfo {
    /// Fill fields this info leaves unset from `other`
    pub fn merge_from(&mut self, other: &ObjCContextInfo) {
        self.common_type.merge_from(&other.common_type);
        self.has_designated_inits |= other.has_designated_inits;
        if self.default_nullability.is_none() {
            self.default_nullability = other.default_nullability;
        }
        if self.swift_objc_members.is_none() {
            self.swift_objc_members = other.swift_objc_members;
        }
        if self.swift_import_as_non_generic.is_none() {
            self.swift_import_as_non_generic = other.swift_import_as_non_generic;
        }
    }
}

/// Information about an Objective-C property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjCPropertyInfo {
    /// Variable-level information
    pub variable: VariableInfo,
    /// Whether to import as a getter/setter pair, if specified
    pub swift_import_as_accessors: Option<bool>,
}

/// Information about an Objective-C method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjCMethodInfo {
    /// Signature information
    pub function: FunctionInfo,
    /// Required initializer
    pub required_init: bool,
    /// Designated initializer
    pub designated_init: bool,
}

/// Information about an enumerator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumConstantInfo {
    /// Entity-level information
    pub common: CommonEntityInfo,
}

/// Information about a tag (struct, union, enum)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    /// Type-level information
    pub common_type: CommonTypeInfo,
    /// Enum extensibility, if specified
    pub enum_extensibility: Option<EnumExtensibilityKind>,
    /// Whether the enum is a flag set, if specified
    pub flag_enum: Option<bool>,
}

/// Information about a typedef
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedefInfo {
    /// Type-level information
    pub common_type: CommonTypeInfo,
    /// New-type wrapper kind, if specified
    pub swift_wrapper: Option<SwiftNewTypeKind>,
}

/// Module-wide options stored in the control block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Infer import-as-member for global declarations
    pub swift_infer_import_as_member: bool,
}
