//! API notes: versioned declaration annotations in a compact binary store
//!
//! API notes describe extra facts about declarations in a previously
//! compiled module (nullability, renamed entities, availability) without
//! touching the headers that declare them.
//!
//! # Quick Start
//!
//! ```ignore
//! use apinotes::{ApiNotesReader, ApiNotesWriter, ContextKind, ObjCContextInfo, VersionTuple};
//!
//! let mut writer = ApiNotesWriter::new("UIKit", None);
//! writer.add_objc_context("UIView", ContextKind::Class, &ObjCContextInfo::default(), VersionTuple::empty());
//! let bytes = writer.write_to_vec()?;
//!
//! let reader = ApiNotesReader::create(&bytes[..], VersionTuple::new(5))?;
//! let view = reader.lookup_objc_class_info("UIView");
//! ```
//!
//! # Architecture
//!
//! - `apinotes-core`: versions, IDs, selectors, annotation payloads
//! - `apinotes-format`: block framing, hash tables, payload codecs
//! - `apinotes-store`: the writer and the validating reader
//! - `apinotes-compiler`: structured notes to container conversion

pub use apinotes_compiler::{
    compile_json, compile_module, CollectingSink, CompileError, Diagnostic, DiagnosticSink,
    ModuleNotes, Severity, TracingSink,
};
pub use apinotes_core::*;
pub use apinotes_store::{
    ApiNotesReader, ApiNotesWriter, ConfigError, ReadError, ReaderConfig, ReaderState,
    SourceFileInfo, WriteError, WriterConfig,
};

/// Container format internals
pub mod format {
    pub use apinotes_format::*;
}

/// Structured notes model
pub mod model {
    pub use apinotes_compiler::model::*;
}
