//! Reader and writer configuration

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use apinotes_core::{ModuleOptions, VersionTuple};
use apinotes_format::MAX_STRING_LEN;

use crate::error::ConfigError;

/// Size and modification time of the text file a container was built from
///
/// Consumers compare these against the file on disk to decide whether a
/// cached container is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceFileInfo {
    /// File size in bytes
    pub size: u64,
    /// Modification time, seconds since the Unix epoch
    pub modification_time: i64,
}

impl SourceFileInfo {
    /// Create from explicit values
    pub fn new(size: u64, modification_time: i64) -> Self {
        SourceFileInfo {
            size,
            modification_time,
        }
    }

    /// Capture size and modification time from file metadata
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        let modification_time = match metadata.modified()?.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        };
        Ok(SourceFileInfo {
            size: metadata.len(),
            modification_time,
        })
    }

    /// Capture size and modification time of the file at `path`
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_metadata(&std::fs::metadata(path)?)
    }
}

/// Reader configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Source-language version used to select among versioned entries;
    /// empty selects the unversioned entry when there is one
    pub swift_version: VersionTuple,
}

impl ReaderConfig {
    /// Set the query version
    pub fn with_swift_version(mut self, version: VersionTuple) -> Self {
        self.swift_version = version;
        self
    }
}

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Name of the module the notes describe
    pub module_name: String,
    /// Source file the notes were compiled from, if any
    pub source_file: Option<SourceFileInfo>,
    /// Module-wide options
    pub module_options: ModuleOptions,
}

impl WriterConfig {
    /// Configuration for `module_name` with no source file and default options
    pub fn new(module_name: impl Into<String>) -> Self {
        WriterConfig {
            module_name: module_name.into(),
            source_file: None,
            module_options: ModuleOptions::default(),
        }
    }

    /// Set the source file
    pub fn with_source_file(mut self, source_file: SourceFileInfo) -> Self {
        self.source_file = Some(source_file);
        self
    }

    /// Set module options
    pub fn with_module_options(mut self, options: ModuleOptions) -> Self {
        self.module_options = options;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.is_empty() {
            return Err(ConfigError::EmptyModuleName);
        }
        if self.module_name.len() > MAX_STRING_LEN {
            return Err(ConfigError::ModuleNameTooLong {
                len: self.module_name.len(),
                max: MAX_STRING_LEN,
            });
        }
        Ok(())
    }
}
