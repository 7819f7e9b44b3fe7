//! Core types for API notes
//!
//! This crate defines the vocabulary shared by the binary format, the
//! reader/writer pair and the conversion pass:
//! - VersionTuple: source-language version tags
//! - IdentifierId, SelectorId, ContextId: file-local IDs
//! - SelectorRef / StoredSelector: method selectors by name and by ID
//! - Annotation payloads (CommonEntityInfo and the types built on it)
//! - VersionedInfo: lookup results with deterministic version selection
//! - FormatError / EncodeError: decode and encode failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ids;
pub mod types;
pub mod version;
pub mod versioned;

pub use error::{EncodeError, EncodeResult, FormatError, FormatResult};
pub use ids::{
    ContextId, ContextKind, IdentifierId, SelectorId, SelectorParseError, SelectorRef, StoredSelector,
};
pub use types::{
    CommonEntityInfo, CommonTypeInfo, EnumConstantInfo, EnumExtensibilityKind, FunctionInfo,
    GlobalFunctionInfo, GlobalVariableInfo, ModuleOptions, NullabilityKind, ObjCContextInfo,
    ObjCMethodInfo, ObjCPropertyInfo, ParamInfo, RetainCountConventionKind, SwiftNewTypeKind,
    TagInfo, TypedefInfo, VariableInfo,
};
pub use version::{VersionParseError, VersionTuple};
pub use versioned::{select_version, VersionedEntries, VersionedInfo};
