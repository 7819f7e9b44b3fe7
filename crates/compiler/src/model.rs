//! Structured description of a module's API notes
//!
//! Field names follow the human-authored notes format (`Name`,
//! `SwiftName`, `Nullability`, ...), so any serde front end that produces
//! the same structure can feed the compiler. JSON is supported directly.
//!
//! # Document Structure
//!
//! ```text
//! Name: Module
//! Availability / AvailabilityMsg
//! SwiftInferImportAsMember
//! Classes / Protocols / Functions / Globals / Enumerators / Tags / Typedefs
//! SwiftVersions:
//!   - Version: "4.2"
//!     Classes / Protocols / ... (same shape as the top level)
//! ```
//!
//! `Version` accepts a number or a string; use a string when a component
//! has trailing zeros (`"4.10"`), since numbers are read as floating point.

use apinotes_core::{
    EnumExtensibilityKind, NullabilityKind, RetainCountConventionKind, SwiftNewTypeKind,
    VersionTuple,
};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Availability of a declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiAvailability {
    /// Available everywhere
    #[default]
    #[serde(rename = "available")]
    Available,
    /// Available on macOS only (informational)
    #[serde(rename = "OSX")]
    Osx,
    /// Available on iOS only (informational)
    #[serde(rename = "iOS")]
    Ios,
    /// Unavailable
    #[serde(rename = "none")]
    None,
    /// Unavailable in Swift
    #[serde(rename = "nonswift")]
    NonSwift,
}

/// `Availability` together with its optional message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityItem {
    /// Availability mode
    #[serde(rename = "Availability", default)]
    pub mode: ApiAvailability,
    /// Message shown when an unavailable declaration is used
    #[serde(rename = "AvailabilityMsg", default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
}

/// Instance or class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    /// Class (`+`) member
    Class,
    /// Instance (`-`) member
    Instance,
}

/// Deprecated initializer inference setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryAsInitKind {
    /// Infer from name and type
    #[default]
    #[serde(rename = "A")]
    Infer,
    /// Treat as a class method
    #[serde(rename = "C")]
    AsClassMethod,
    /// Treat as an initializer
    #[serde(rename = "I")]
    AsInitializer,
}

/// Shorthand for an extensibility and flag-enum combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumConvenienceKind {
    /// Not an extensible enum, not a flag set
    #[serde(rename = "none")]
    None,
    /// Open enum
    #[serde(rename = "CFEnum", alias = "NSEnum")]
    CfEnum,
    /// Open flag set
    #[serde(rename = "CFOptions", alias = "NSOptions")]
    CfOptions,
    /// Closed enum
    #[serde(rename = "CFClosedEnum", alias = "NSClosedEnum")]
    CfClosedEnum,
}

fn default_no_escape() -> Option<bool> {
    Some(false)
}

/// A function or method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Param {
    /// Zero-based parameter position
    pub position: u32,
    /// Audited nullability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability: Option<NullabilityKind>,
    /// Ownership convention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_count_convention: Option<RetainCountConventionKind>,
    /// Whether the parameter escapes; an absent key means `false`
    #[serde(default = "default_no_escape")]
    pub no_escape: Option<bool>,
    /// Type override
    #[serde(rename = "Type", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
}

/// An Objective-C method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    /// Selector text, such as `initWithFrame:`
    pub selector: String,
    /// Instance or class method
    #[serde(rename = "MethodKind")]
    pub kind: MethodKind,
    /// Parameter annotations
    #[serde(rename = "Parameters", default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// Nullability of each parameter in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nullability: Vec<NullabilityKind>,
    /// Nullability of the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability_of_ret: Option<NullabilityKind>,
    /// Ownership convention of the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_count_convention: Option<RetainCountConventionKind>,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Deprecated; any value other than the default is an error
    #[serde(default)]
    pub factory_as_init: FactoryAsInitKind,
    /// Designated initializer
    #[serde(default)]
    pub designated_init: bool,
    /// Required initializer
    #[serde(default)]
    pub required: bool,
    /// Result type override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result_type: String,
}

/// An Objective-C property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
    /// Property name
    pub name: String,
    /// Instance or class property; absent means both
    #[serde(rename = "PropertyKind", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MethodKind>,
    /// Audited nullability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability: Option<NullabilityKind>,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Import as getter/setter methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_import_as_accessors: Option<bool>,
    /// Type override
    #[serde(rename = "Type", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
}

/// An Objective-C class or protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Class {
    /// Class or protocol name
    pub name: String,
    /// Members default to non-null
    #[serde(default)]
    pub audited_for_nullability: bool,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Bridged type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_bridge: Option<String>,
    /// Error domain
    #[serde(rename = "NSErrorDomain", default, skip_serializing_if = "Option::is_none")]
    pub ns_error_domain: Option<String>,
    /// Import as non-generic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_import_as_non_generic: Option<bool>,
    /// Import all members
    #[serde(rename = "SwiftObjCMembers", default, skip_serializing_if = "Option::is_none")]
    pub swift_objc_members: Option<bool>,
    /// Method annotations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    /// Property annotations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// A global function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Function {
    /// Function name
    pub name: String,
    /// Parameter annotations
    #[serde(rename = "Parameters", default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// Nullability of each parameter in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nullability: Vec<NullabilityKind>,
    /// Nullability of the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability_of_ret: Option<NullabilityKind>,
    /// Ownership convention of the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_count_convention: Option<RetainCountConventionKind>,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Result type override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result_type: String,
}

/// A global variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalVariable {
    /// Variable name
    pub name: String,
    /// Audited nullability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability: Option<NullabilityKind>,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Type override
    #[serde(rename = "Type", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
}

/// An enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnumConstant {
    /// Enumerator name
    pub name: String,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
}

/// A struct, union or enum tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Bridged type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_bridge: Option<String>,
    /// Error domain
    #[serde(rename = "NSErrorDomain", default, skip_serializing_if = "Option::is_none")]
    pub ns_error_domain: Option<String>,
    /// Enum extensibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_extensibility: Option<EnumExtensibilityKind>,
    /// Flag set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_enum: Option<bool>,
    /// Shorthand for `EnumExtensibility` plus `FlagEnum`; exclusive with both
    #[serde(rename = "EnumKind", default, skip_serializing_if = "Option::is_none")]
    pub enum_kind: Option<EnumConvenienceKind>,
}

/// A typedef
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Typedef {
    /// Typedef name
    pub name: String,
    /// Availability
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Explicit private setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_private: Option<bool>,
    /// Name override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub swift_name: String,
    /// Bridged type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_bridge: Option<String>,
    /// Error domain
    #[serde(rename = "NSErrorDomain", default, skip_serializing_if = "Option::is_none")]
    pub ns_error_domain: Option<String>,
    /// New-type wrapper
    #[serde(rename = "SwiftWrapper", default, skip_serializing_if = "Option::is_none")]
    pub swift_wrapper: Option<SwiftNewTypeKind>,
}

/// Declarations of one section, either top level or one Swift version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopLevelItems {
    /// Classes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<Class>,
    /// Protocols
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<Class>,
    /// Global functions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
    /// Global variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub globals: Vec<GlobalVariable>,
    /// Enumerators
    #[serde(rename = "Enumerators", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_constants: Vec<EnumConstant>,
    /// Tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Typedefs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub typedefs: Vec<Typedef>,
}

impl TopLevelItems {
    /// Whether the section declares nothing
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.protocols.is_empty()
            && self.functions.is_empty()
            && self.globals.is_empty()
            && self.enum_constants.is_empty()
            && self.tags.is_empty()
            && self.typedefs.is_empty()
    }
}

/// Declarations that apply from one Swift version on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedSection {
    /// Version the section is tagged with
    #[serde(rename = "Version")]
    pub version: VersionTuple,
    /// Declarations
    #[serde(flatten)]
    pub items: TopLevelItems,
}

/// API notes for one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleNotes {
    /// Module name
    pub name: String,
    /// Module-level availability; accepted but not stored
    #[serde(flatten)]
    pub availability: AvailabilityItem,
    /// Infer import-as-member for globals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_infer_import_as_member: Option<bool>,
    /// Unversioned declarations
    #[serde(flatten)]
    pub top_level: TopLevelItems,
    /// Version-specific declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub swift_versions: Vec<VersionedSection>,
}

impl ModuleNotes {
    /// Notes for `name` with no declarations
    pub fn new(name: impl Into<String>) -> Self {
        ModuleNotes {
            name: name.into(),
            availability: AvailabilityItem::default(),
            swift_infer_import_as_member: None,
            top_level: TopLevelItems::default(),
            swift_versions: Vec::new(),
        }
    }

    /// Parse notes from JSON text
    pub fn from_json(text: &str) -> Result<Self, CompileError> {
        serde_json::from_str(text).map_err(CompileError::Parse)
    }

    /// Render notes as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(CompileError::Parse)
    }
}
