//! Container reader
//!
//! `ApiNotesReader::create` validates the whole container up front:
//! signature, control block, format version, block framing and every
//! table entry. Only a fully validated reader is ever returned; after that
//! the reader is immutable, `Send + Sync`, and every lookup takes `&self`.
//!
//! Tables are remembered as byte ranges into the buffer together with
//! their validated layout, so the buffer can be either borrowed or owned
//! without the reader borrowing from itself.
//!
//! Absence is never an error. A name that was never interned, a table
//! that is missing, or a key that is not in its table all produce an empty
//! result.

use std::borrow::Cow;
use std::ops::Range;

use apinotes_core::{
    ContextId, ContextKind, EnumConstantInfo, FormatResult, GlobalFunctionInfo,
    GlobalVariableInfo, IdentifierId, ModuleOptions, ObjCContextInfo, ObjCMethodInfo,
    ObjCPropertyInfo, SelectorId, SelectorRef, StoredSelector, TagInfo, TypedefInfo,
    VersionTuple, VersionedEntries, VersionedInfo,
};
use apinotes_format::constants::{
    block_ids, control_block, enum_constant_block, global_function_block, global_variable_block,
    identifier_block, module_option_flags, objc_context_block, objc_method_block,
    objc_property_block, objc_selector_block, tag_block, typedef_block,
};
use apinotes_format::{
    BlockCursor, ContextIdTable, ContextInfoTable, ContextTableKey, EnumConstantTable, Entry,
    GlobalFunctionTable, GlobalVariableTable, IdentifierTable, MethodTableKey, ObjCMethodTable,
    ObjCPropertyTable, OnDiskTable, PropertyTableKey, Record, SelectorTable, SubBlock, TableInfo,
    TableLayout, TagTable, TypedefTable, API_NOTES_SIGNATURE, VERSION_MAJOR, VERSION_MINOR,
};
use tracing::{debug, trace, warn};

use crate::config::{ReaderConfig, SourceFileInfo};
use crate::error::ReadError;

/// Lifecycle of a reader
///
/// `create` moves through `Unopened` and `Validating`; callers only ever
/// observe `Ready`, because a container that ends in `Failed` yields an
/// error instead of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Buffer supplied, nothing inspected yet
    Unopened,
    /// Checking signature, blocks and tables
    Validating,
    /// Validated and ready for lookups
    Ready,
    /// Validation failed
    Failed,
}

/// A validated table: where its blob lives and its shape
#[derive(Debug, Clone)]
struct AttachedTable {
    blob: Range<usize>,
    layout: TableLayout,
}

#[derive(Debug, Default)]
struct Tables {
    identifier: Option<AttachedTable>,
    selector: Option<AttachedTable>,
    context_id: Option<AttachedTable>,
    context_info: Option<AttachedTable>,
    property: Option<AttachedTable>,
    method: Option<AttachedTable>,
    global_variable: Option<AttachedTable>,
    global_function: Option<AttachedTable>,
    enum_constant: Option<AttachedTable>,
    tag: Option<AttachedTable>,
    typedef: Option<AttachedTable>,
}

#[derive(Debug, Default)]
struct ControlData {
    module_name: String,
    source_file: Option<SourceFileInfo>,
    module_options: ModuleOptions,
}

/// Read-only view of one API notes container
#[derive(Debug)]
pub struct ApiNotesReader<'a> {
    buffer: Cow<'a, [u8]>,
    config: ReaderConfig,
    state: ReaderState,
    control: ControlData,
    tables: Tables,
}

impl<'a> ApiNotesReader<'a> {
    /// Validate `buffer` and create a reader selecting entries for `swift_version`
    pub fn create(
        buffer: impl Into<Cow<'a, [u8]>>,
        swift_version: VersionTuple,
    ) -> Result<Self, ReadError> {
        Self::with_config(buffer, ReaderConfig::default().with_swift_version(swift_version))
    }

    /// Validate `buffer` and create a reader with an explicit configuration
    pub fn with_config(
        buffer: impl Into<Cow<'a, [u8]>>,
        config: ReaderConfig,
    ) -> Result<Self, ReadError> {
        let mut reader = ApiNotesReader {
            buffer: buffer.into(),
            config,
            state: ReaderState::Unopened,
            control: ControlData::default(),
            tables: Tables::default(),
        };
        reader.state = ReaderState::Validating;
        match reader.validate() {
            Ok(()) => {
                reader.state = ReaderState::Ready;
                debug!(
                    target: "apinotes::reader",
                    module = %reader.control.module_name,
                    bytes = reader.buffer.len(),
                    swift_version = %reader.config.swift_version,
                    "Opened API notes container"
                );
                Ok(reader)
            }
            Err(error) => {
                reader.state = ReaderState::Failed;
                warn!(
                    target: "apinotes::reader",
                    bytes = reader.buffer.len(),
                    state = ?reader.state,
                    %error,
                    "Rejected API notes container"
                );
                Err(error)
            }
        }
    }

    fn validate(&mut self) -> Result<(), ReadError> {
        let buffer: &[u8] = &self.buffer;
        let (control, tables) = parse_container(buffer)?;
        self.control = control;
        self.tables = tables;
        Ok(())
    }

    /// Lifecycle state; always `Ready` for a reader that was returned
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Name of the module the notes describe
    pub fn module_name(&self) -> &str {
        &self.control.module_name
    }

    /// Size and modification time of the source file, if recorded
    pub fn source_file_size_and_modification_time(&self) -> Option<SourceFileInfo> {
        self.control.source_file
    }

    /// Module-wide options
    pub fn module_options(&self) -> ModuleOptions {
        self.control.module_options
    }

    /// Version used to select among versioned entries
    pub fn swift_version(&self) -> VersionTuple {
        self.config.swift_version
    }

    /// The underlying buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn table<I: TableInfo>(&self, attached: &Option<AttachedTable>) -> Option<OnDiskTable<'_, I>> {
        attached
            .as_ref()
            .map(|t| OnDiskTable::from_layout(&self.buffer[t.blob.clone()], t.layout))
    }

    fn found<T>(&self, table: &'static str, result: FormatResult<Option<T>>) -> Option<T> {
        result.unwrap_or_else(|error| {
            warn!(target: "apinotes::reader", table, %error, "Lookup failed on validated table");
            None
        })
    }

    fn lookup_in<I: TableInfo>(
        &self,
        attached: &Option<AttachedTable>,
        key: &I::Key,
    ) -> Option<I::Data> {
        let table = self.table::<I>(attached)?;
        self.found(I::NAME, table.lookup(key))
    }

    fn versioned<K, T>(
        &self,
        attached: &Option<AttachedTable>,
        key: &K,
    ) -> VersionedInfo<T>
    where
        apinotes_format::VersionedTable<K, T>: TableInfo<Key = K, Data = VersionedEntries<T>>,
    {
        match self.lookup_in::<apinotes_format::VersionedTable<K, T>>(attached, key) {
            Some(entries) => VersionedInfo::new(self.config.swift_version, entries),
            None => VersionedInfo::none(),
        }
    }

    fn identifier(&self, name: &str) -> Option<IdentifierId> {
        if name.is_empty() {
            return Some(IdentifierId::EMPTY);
        }
        let table = self.table::<IdentifierTable>(&self.tables.identifier)?;
        self.found(IdentifierTable::NAME, table.lookup_encoded(name.as_bytes()))
    }

    fn selector(&self, selector: &SelectorRef<'_>) -> Option<SelectorId> {
        let num_args = u16::try_from(selector.num_args).ok()?;
        let identifiers = selector
            .pieces
            .iter()
            .map(|piece| self.identifier(piece))
            .collect::<Option<Vec<_>>>()?;
        self.lookup_in::<SelectorTable>(
            &self.tables.selector,
            &StoredSelector {
                num_args,
                identifiers,
            },
        )
    }

    fn context_id(&self, name: &str, kind: ContextKind) -> Option<ContextId> {
        let name = self.identifier(name)?;
        self.lookup_in::<ContextIdTable>(
            &self.tables.context_id,
            &ContextTableKey {
                name,
                is_protocol: kind.is_protocol(),
            },
        )
    }

    /// ID of the class named `name`
    pub fn lookup_objc_class_id(&self, name: &str) -> Option<ContextId> {
        self.context_id(name, ContextKind::Class)
    }

    /// ID of the protocol named `name`
    pub fn lookup_objc_protocol_id(&self, name: &str) -> Option<ContextId> {
        self.context_id(name, ContextKind::Protocol)
    }

    /// Information about the class or protocol with ID `context`
    pub fn lookup_objc_context_info(&self, context: ContextId) -> VersionedInfo<ObjCContextInfo> {
        self.versioned(&self.tables.context_info, &context)
    }

    /// Information about the class named `name`
    pub fn lookup_objc_class_info(&self, name: &str) -> VersionedInfo<ObjCContextInfo> {
        match self.lookup_objc_class_id(name) {
            Some(context) => self.lookup_objc_context_info(context),
            None => VersionedInfo::none(),
        }
    }

    /// Information about the protocol named `name`
    pub fn lookup_objc_protocol_info(&self, name: &str) -> VersionedInfo<ObjCContextInfo> {
        match self.lookup_objc_protocol_id(name) {
            Some(context) => self.lookup_objc_context_info(context),
            None => VersionedInfo::none(),
        }
    }

    /// Information about property `name` of `context`
    pub fn lookup_objc_property_info(
        &self,
        context: ContextId,
        name: &str,
        is_instance: bool,
    ) -> VersionedInfo<ObjCPropertyInfo> {
        let Some(name) = self.identifier(name) else {
            return VersionedInfo::none();
        };
        let key = PropertyTableKey {
            context,
            name,
            is_instance,
        };
        self.versioned(&self.tables.property, &key)
    }

    /// Information about the method `selector` of `context`
    pub fn lookup_objc_method_info(
        &self,
        context: ContextId,
        selector: &SelectorRef<'_>,
        is_instance: bool,
    ) -> VersionedInfo<ObjCMethodInfo> {
        let Some(selector) = self.selector(selector) else {
            return VersionedInfo::none();
        };
        let key = MethodTableKey {
            context,
            selector,
            is_instance,
        };
        self.versioned(&self.tables.method, &key)
    }

    fn by_name<T>(&self, attached: &Option<AttachedTable>, name: &str) -> VersionedInfo<T>
    where
        apinotes_format::VersionedTable<IdentifierId, T>:
            TableInfo<Key = IdentifierId, Data = VersionedEntries<T>>,
    {
        match self.identifier(name) {
            Some(id) => self.versioned(attached, &id),
            None => VersionedInfo::none(),
        }
    }

    /// Information about the global variable `name`
    pub fn lookup_global_variable_info(&self, name: &str) -> VersionedInfo<GlobalVariableInfo> {
        self.by_name(&self.tables.global_variable, name)
    }

    /// Information about the global function `name`
    pub fn lookup_global_function_info(&self, name: &str) -> VersionedInfo<GlobalFunctionInfo> {
        self.by_name(&self.tables.global_function, name)
    }

    /// Information about the enumerator `name`
    pub fn lookup_enum_constant_info(&self, name: &str) -> VersionedInfo<EnumConstantInfo> {
        self.by_name(&self.tables.enum_constant, name)
    }

    /// Information about the tag `name`
    pub fn lookup_tag_info(&self, name: &str) -> VersionedInfo<TagInfo> {
        self.by_name(&self.tables.tag, name)
    }

    /// Information about the typedef `name`
    pub fn lookup_typedef_info(&self, name: &str) -> VersionedInfo<TypedefInfo> {
        self.by_name(&self.tables.typedef, name)
    }

    /// Every identifier stored in the container, in table order
    pub fn identifiers(&self) -> Vec<(String, IdentifierId)> {
        self.table::<IdentifierTable>(&self.tables.identifier)
            .and_then(|table| self.found(IdentifierTable::NAME, table.entries().map(Some)))
            .unwrap_or_default()
    }
}

fn parse_container(buffer: &[u8]) -> Result<(ControlData, Tables), ReadError> {
    let signature: [u8; 4] = match buffer.get(..4) {
        Some(bytes) => [bytes[0], bytes[1], bytes[2], bytes[3]],
        None => return Err(ReadError::TooSmall { size: buffer.len() }),
    };
    if signature != API_NOTES_SIGNATURE {
        return Err(ReadError::InvalidSignature {
            expected: API_NOTES_SIGNATURE,
            actual: signature,
        });
    }

    let mut control: Option<ControlData> = None;
    let mut tables = Tables::default();
    for entry in BlockCursor::top_level(&buffer[4..], 4) {
        let block = match entry? {
            Entry::SubBlock(block) => block,
            Entry::Record(record) => {
                return Err(ReadError::TopLevelRecord {
                    kind: record.kind,
                    offset: record.offset,
                })
            }
        };
        match block.block_id {
            block_ids::CONTROL => {
                if control.is_some() {
                    return Err(ReadError::DuplicateControlBlock);
                }
                control = Some(read_control_block(&block)?);
            }
            block_ids::IDENTIFIER
            | block_ids::OBJC_CONTEXT
            | block_ids::OBJC_PROPERTY
            | block_ids::OBJC_METHOD
            | block_ids::OBJC_SELECTOR
            | block_ids::GLOBAL_VARIABLE
            | block_ids::GLOBAL_FUNCTION
            | block_ids::ENUM_CONSTANT
            | block_ids::TAG
            | block_ids::TYPEDEF => {
                if control.is_none() {
                    return Err(ReadError::BlockBeforeControl {
                        block_id: block.block_id,
                        name: block_ids::block_name(block.block_id),
                    });
                }
                read_table_block(&block, &mut tables)?;
            }
            other => {
                trace!(
                    target: "apinotes::reader",
                    block_id = other,
                    bytes = block.body.len(),
                    "Skipping unknown block"
                );
            }
        }
    }

    let control = control.ok_or(ReadError::MissingControlBlock)?;
    Ok((control, tables))
}

fn read_control_block(block: &SubBlock<'_>) -> Result<ControlData, ReadError> {
    let mut control = ControlData::default();
    let mut saw_metadata = false;
    for entry in block.entries()? {
        let record = match entry? {
            Entry::Record(record) => record,
            Entry::SubBlock(sub) => {
                trace!(target: "apinotes::reader", block_id = sub.block_id, "Skipping nested block");
                continue;
            }
        };
        match record.kind {
            control_block::METADATA => {
                if saw_metadata {
                    return Err(ReadError::DuplicateMetadata);
                }
                let (major, minor) = (record.field(0)?, record.field(1)?);
                if major != VERSION_MAJOR as u64 || minor != VERSION_MINOR as u64 {
                    return Err(ReadError::VersionMismatch {
                        major,
                        minor,
                        expected_major: VERSION_MAJOR,
                        expected_minor: VERSION_MINOR,
                    });
                }
                saw_metadata = true;
            }
            control_block::MODULE_NAME => {
                control.module_name = std::str::from_utf8(record.blob)
                    .map_err(|_| apinotes_core::FormatError::InvalidUtf8)?
                    .to_string();
            }
            control_block::MODULE_OPTIONS => {
                control.module_options.swift_infer_import_as_member =
                    record.field(0)? & module_option_flags::SWIFT_INFER_IMPORT_AS_MEMBER != 0;
            }
            control_block::SOURCE_FILE => {
                control.source_file = Some(SourceFileInfo::new(
                    record.field(0)?,
                    record.field(1)? as i64,
                ));
            }
            kind => {
                trace!(target: "apinotes::reader", kind, "Ignoring unknown control record");
            }
        }
    }
    if !saw_metadata {
        return Err(ReadError::MissingMetadata);
    }
    Ok(control)
}

fn attach<I: TableInfo>(
    slot: &mut Option<AttachedTable>,
    record: &Record<'_>,
) -> Result<(), ReadError> {
    if slot.is_some() {
        return Err(apinotes_core::FormatError::DuplicateTable(I::NAME).into());
    }
    let table = OnDiskTable::<I>::attach(record.blob, record.field(0)?)?;
    debug!(
        target: "apinotes::reader",
        table = I::NAME,
        entries = table.len(),
        "Attached table"
    );
    *slot = Some(AttachedTable {
        blob: record.blob_offset..record.blob_offset + record.blob.len(),
        layout: table.layout(),
    });
    Ok(())
}

fn read_table_block(block: &SubBlock<'_>, tables: &mut Tables) -> Result<(), ReadError> {
    for entry in block.entries()? {
        let record = match entry? {
            Entry::Record(record) => record,
            Entry::SubBlock(sub) => {
                trace!(target: "apinotes::reader", block_id = sub.block_id, "Skipping nested block");
                continue;
            }
        };
        match (block.block_id, record.kind) {
            (block_ids::IDENTIFIER, identifier_block::IDENTIFIER_DATA) => {
                attach::<IdentifierTable>(&mut tables.identifier, &record)?
            }
            (block_ids::OBJC_CONTEXT, objc_context_block::OBJC_CONTEXT_ID_DATA) => {
                attach::<ContextIdTable>(&mut tables.context_id, &record)?
            }
            (block_ids::OBJC_CONTEXT, objc_context_block::OBJC_CONTEXT_INFO_DATA) => {
                attach::<ContextInfoTable>(&mut tables.context_info, &record)?
            }
            (block_ids::OBJC_PROPERTY, objc_property_block::OBJC_PROPERTY_DATA) => {
                attach::<ObjCPropertyTable>(&mut tables.property, &record)?
            }
            (block_ids::OBJC_METHOD, objc_method_block::OBJC_METHOD_DATA) => {
                attach::<ObjCMethodTable>(&mut tables.method, &record)?
            }
            (block_ids::OBJC_SELECTOR, objc_selector_block::OBJC_SELECTOR_DATA) => {
                attach::<SelectorTable>(&mut tables.selector, &record)?
            }
            (block_ids::GLOBAL_VARIABLE, global_variable_block::GLOBAL_VARIABLE_DATA) => {
                attach::<GlobalVariableTable>(&mut tables.global_variable, &record)?
            }
            (block_ids::GLOBAL_FUNCTION, global_function_block::GLOBAL_FUNCTION_DATA) => {
                attach::<GlobalFunctionTable>(&mut tables.global_function, &record)?
            }
            (block_ids::ENUM_CONSTANT, enum_constant_block::ENUM_CONSTANT_DATA) => {
                attach::<EnumConstantTable>(&mut tables.enum_constant, &record)?
            }
            (block_ids::TAG, tag_block::TAG_DATA) => attach::<TagTable>(&mut tables.tag, &record)?,
            (block_ids::TYPEDEF, typedef_block::TYPEDEF_DATA) => {
                attach::<TypedefTable>(&mut tables.typedef, &record)?
            }
            (block_id, kind) => {
                trace!(target: "apinotes::reader", block_id, kind, "Ignoring unknown record");
            }
        }
    }
    Ok(())
}
