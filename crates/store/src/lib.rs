//! Writer and reader for API notes containers
//!
//! `ApiNotesWriter` accumulates annotations in memory and serializes them
//! in one pass; `ApiNotesReader` validates a serialized container in full
//! before answering any lookup.
//!
//! ```text
//! ApiNotesWriter --write_to_vec--> bytes --ApiNotesReader::create--> lookups
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod intern;
pub mod reader;
pub mod writer;

pub use config::{ReaderConfig, SourceFileInfo, WriterConfig};
pub use error::{ConfigError, ReadError, WriteError};
pub use intern::{IdentifierInterner, SelectorInterner};
pub use reader::{ApiNotesReader, ReaderState};
pub use writer::ApiNotesWriter;
