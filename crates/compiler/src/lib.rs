//! Compiler from structured API notes to binary containers
//!
//! [`ModuleNotes`] mirrors the human-authored notes format. [`compile_module`]
//! validates it, reports problems to a [`DiagnosticSink`] and, when no
//! error was reported, returns the serialized container.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter;
pub mod diagnostics;
pub mod error;
pub mod model;

pub use converter::{compile_json, compile_module, MAX_PARAM_POSITION};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use error::CompileError;
pub use model::{
    ApiAvailability, AvailabilityItem, Class, EnumConstant, EnumConvenienceKind,
    FactoryAsInitKind, Function, GlobalVariable, Method, MethodKind, ModuleNotes, Param,
    Property, Tag, TopLevelItems, Typedef, VersionedSection,
};
