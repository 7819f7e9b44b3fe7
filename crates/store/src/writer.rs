//! Container writer
//!
//! `ApiNotesWriter` accumulates annotations in memory, keyed by interned
//! IDs, and serializes them in one pass when consumed by
//! `write_to_stream`. Output is deterministic: the same additions produce
//! the same bytes regardless of hash map iteration order.
//!
//! # Block Order
//!
//! ```text
//! signature
//! CONTROL         METADATA, MODULE_NAME, [SOURCE_FILE], MODULE_OPTIONS
//! IDENTIFIER      IDENTIFIER_DATA
//! OBJC_CONTEXT    OBJC_CONTEXT_ID_DATA, OBJC_CONTEXT_INFO_DATA
//! OBJC_PROPERTY   OBJC_PROPERTY_DATA
//! OBJC_METHOD     OBJC_METHOD_DATA
//! OBJC_SELECTOR   OBJC_SELECTOR_DATA
//! GLOBAL_VARIABLE GLOBAL_VARIABLE_DATA
//! GLOBAL_FUNCTION GLOBAL_FUNCTION_DATA
//! ENUM_CONSTANT   ENUM_CONSTANT_DATA
//! TAG             TAG_DATA
//! TYPEDEF         TYPEDEF_DATA
//! ```
//!
//! Every entity block is written even when its table is empty.

use std::io::Write;

use apinotes_core::{
    ContextId, ContextKind, EncodeError, EncodeResult, EnumConstantInfo, GlobalFunctionInfo,
    GlobalVariableInfo, IdentifierId, ModuleOptions, ObjCContextInfo, ObjCMethodInfo,
    ObjCPropertyInfo, SelectorRef, TagInfo, TypedefInfo, VersionTuple, VersionedEntries,
};
use apinotes_format::constants::{
    block_ids, control_block, enum_constant_block, global_function_block, global_variable_block,
    identifier_block, module_option_flags, objc_context_block, objc_method_block,
    objc_property_block, objc_selector_block, tag_block, typedef_block,
};
use apinotes_format::{
    BlockWriter, ContextIdTable, ContextInfoTable, ContextTableKey, EnumConstantTable,
    GlobalFunctionTable, GlobalVariableTable, IdentifierTable, MethodTableKey, ObjCMethodTable,
    ObjCPropertyTable, OnDiskTableBuilder, PropertyTableKey, SelectorTable, TableInfo, TagTable,
    TypedefTable, API_NOTES_SIGNATURE, VERSION_MAJOR, VERSION_MINOR,
};
use rustc_hash::FxHashMap;
use smallvec::smallvec;
use tracing::{debug, trace};

use crate::config::{SourceFileInfo, WriterConfig};
use crate::error::WriteError;
use crate::intern::{IdentifierInterner, SelectorInterner};

/// Insert or replace the entry for `version`
fn upsert<T>(entries: &mut VersionedEntries<T>, version: VersionTuple, info: T) {
    match entries.iter_mut().find(|(v, _)| *v == version) {
        Some(slot) => {
            trace!(target: "apinotes::writer", %version, "Replacing entry for repeated version");
            slot.1 = info;
        }
        None => entries.push((version, info)),
    }
}

/// Accumulates annotations and writes one container
///
/// The writer is single-use: `write_to_stream` consumes it.
#[derive(Debug)]
pub struct ApiNotesWriter {
    config: WriterConfig,
    identifiers: IdentifierInterner,
    selectors: SelectorInterner,
    contexts: FxHashMap<ContextTableKey, (ContextId, VersionedEntries<ObjCContextInfo>)>,
    properties: FxHashMap<PropertyTableKey, VersionedEntries<ObjCPropertyInfo>>,
    methods: FxHashMap<MethodTableKey, VersionedEntries<ObjCMethodInfo>>,
    global_variables: FxHashMap<IdentifierId, VersionedEntries<GlobalVariableInfo>>,
    global_functions: FxHashMap<IdentifierId, VersionedEntries<GlobalFunctionInfo>>,
    enum_constants: FxHashMap<IdentifierId, VersionedEntries<EnumConstantInfo>>,
    tags: FxHashMap<IdentifierId, VersionedEntries<TagInfo>>,
    typedefs: FxHashMap<IdentifierId, VersionedEntries<TypedefInfo>>,
    deferred_error: Option<EncodeError>,
}

impl ApiNotesWriter {
    /// Create a writer for `module_name`
    pub fn new(module_name: impl Into<String>, source_file: Option<SourceFileInfo>) -> Self {
        let mut config = WriterConfig::new(module_name);
        config.source_file = source_file;
        Self::with_config(config)
    }

    /// Create a writer from a full configuration
    ///
    /// The configuration is validated when the container is written.
    pub fn with_config(config: WriterConfig) -> Self {
        ApiNotesWriter {
            config,
            identifiers: IdentifierInterner::new(),
            selectors: SelectorInterner::new(),
            contexts: FxHashMap::default(),
            properties: FxHashMap::default(),
            methods: FxHashMap::default(),
            global_variables: FxHashMap::default(),
            global_functions: FxHashMap::default(),
            enum_constants: FxHashMap::default(),
            tags: FxHashMap::default(),
            typedefs: FxHashMap::default(),
            deferred_error: None,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Set module-wide options
    pub fn set_module_options(&mut self, options: ModuleOptions) {
        self.config.module_options = options;
    }

    /// Add information about a class or protocol
    ///
    /// The same (name, kind) always yields the same ID; IDs start at 1 in
    /// order of first addition. Adding a version that already exists merges
    /// the new information into fields the existing entry leaves unset.
    pub fn add_objc_context(
        &mut self,
        name: &str,
        kind: ContextKind,
        info: &ObjCContextInfo,
        version: VersionTuple,
    ) -> ContextId {
        let key = ContextTableKey {
            name: self.identifiers.intern(name),
            is_protocol: kind.is_protocol(),
        };
        let next_id = ContextId(self.contexts.len() as u32 + 1);
        let (id, entries) = self
            .contexts
            .entry(key)
            .or_insert_with(|| (next_id, smallvec![]));

        match entries.iter_mut().find(|(v, _)| *v == version) {
            Some((_, existing)) => existing.merge_from(info),
            None => entries.push((version, info.clone())),
        }
        *id
    }

    /// Add information about a property of context `context`
    pub fn add_objc_property(
        &mut self,
        context: ContextId,
        name: &str,
        is_instance: bool,
        info: &ObjCPropertyInfo,
        version: VersionTuple,
    ) {
        let key = PropertyTableKey {
            context,
            name: self.identifiers.intern(name),
            is_instance,
        };
        upsert(self.properties.entry(key).or_default(), version, info.clone());
    }

    /// Add information about a method of context `context`
    pub fn add_objc_method(
        &mut self,
        context: ContextId,
        selector: &SelectorRef<'_>,
        is_instance: bool,
        info: &ObjCMethodInfo,
        version: VersionTuple,
    ) {
        let Some(selector_id) = self.selectors.intern_ref(&mut self.identifiers, selector) else {
            self.defer(EncodeError::TooMany {
                what: "selector arguments",
                count: selector.num_args as usize,
                max: u16::MAX as usize,
            });
            return;
        };
        let key = MethodTableKey {
            context,
            selector: selector_id,
            is_instance,
        };
        upsert(self.methods.entry(key).or_default(), version, info.clone());
    }

    /// Add information about a global variable
    pub fn add_global_variable(
        &mut self,
        name: &str,
        info: &GlobalVariableInfo,
        version: VersionTuple,
    ) {
        let id = self.identifiers.intern(name);
        upsert(self.global_variables.entry(id).or_default(), version, info.clone());
    }

    /// Add information about a global function
    pub fn add_global_function(
        &mut self,
        name: &str,
        info: &GlobalFunctionInfo,
        version: VersionTuple,
    ) {
        let id = self.identifiers.intern(name);
        upsert(self.global_functions.entry(id).or_default(), version, info.clone());
    }

    /// Add information about an enumerator
    pub fn add_enum_constant(&mut self, name: &str, info: &EnumConstantInfo, version: VersionTuple) {
        let id = self.identifiers.intern(name);
        upsert(self.enum_constants.entry(id).or_default(), version, info.clone());
    }

    /// Add information about a tag (struct, union or enum)
    pub fn add_tag(&mut self, name: &str, info: &TagInfo, version: VersionTuple) {
        let id = self.identifiers.intern(name);
        upsert(self.tags.entry(id).or_default(), version, info.clone());
    }

    /// Add information about a typedef
    pub fn add_typedef(&mut self, name: &str, info: &TypedefInfo, version: VersionTuple) {
        let id = self.identifiers.intern(name);
        upsert(self.typedefs.entry(id).or_default(), version, info.clone());
    }

    fn defer(&mut self, error: EncodeError) {
        if self.deferred_error.is_none() {
            self.deferred_error = Some(error);
        }
    }

    /// Serialize the container into `out`
    pub fn write_to_stream<W: Write>(self, out: &mut W) -> Result<(), WriteError> {
        let bytes = self.write_to_vec()?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Serialize the container into a new buffer
    pub fn write_to_vec(self) -> Result<Vec<u8>, WriteError> {
        self.config.validate()?;
        if let Some(error) = self.deferred_error {
            return Err(error.into());
        }

        let module_name = self.config.module_name.clone();
        let identifiers = self.identifiers.len();
        let contexts = self.contexts.len();
        let bytes = self.encode()?;
        debug!(
            target: "apinotes::writer",
            module = %module_name,
            identifiers,
            contexts,
            bytes = bytes.len(),
            "Wrote API notes container"
        );
        Ok(bytes)
    }

    fn encode(self) -> EncodeResult<Vec<u8>> {
        let mut w = BlockWriter::new();
        w.write_raw(&API_NOTES_SIGNATURE);

        write_control_block(&mut w, &self.config)?;

        let mark = w.enter_block(block_ids::IDENTIFIER);
        emit_table::<IdentifierTable>(
            &mut w,
            identifier_block::IDENTIFIER_DATA,
            self.identifiers
                .iter()
                .map(|(name, id)| (name.to_string(), id)),
        )?;
        w.exit_block(mark)?;

        let mut context_ids = Vec::with_capacity(self.contexts.len());
        let mut context_infos = Vec::with_capacity(self.contexts.len());
        for (key, (id, entries)) in self.contexts {
            context_ids.push((key, id));
            context_infos.push((id, entries));
        }
        let mark = w.enter_block(block_ids::OBJC_CONTEXT);
        emit_table::<ContextIdTable>(&mut w, objc_context_block::OBJC_CONTEXT_ID_DATA, context_ids)?;
        emit_table::<ContextInfoTable>(
            &mut w,
            objc_context_block::OBJC_CONTEXT_INFO_DATA,
            context_infos,
        )?;
        w.exit_block(mark)?;

        write_table_block::<ObjCPropertyTable>(
            &mut w,
            block_ids::OBJC_PROPERTY,
            objc_property_block::OBJC_PROPERTY_DATA,
            self.properties,
        )?;
        write_table_block::<ObjCMethodTable>(
            &mut w,
            block_ids::OBJC_METHOD,
            objc_method_block::OBJC_METHOD_DATA,
            self.methods,
        )?;
        write_table_block::<SelectorTable>(
            &mut w,
            block_ids::OBJC_SELECTOR,
            objc_selector_block::OBJC_SELECTOR_DATA,
            self.selectors
                .iter()
                .map(|(selector, id)| (selector.clone(), id)),
        )?;
        write_table_block::<GlobalVariableTable>(
            &mut w,
            block_ids::GLOBAL_VARIABLE,
            global_variable_block::GLOBAL_VARIABLE_DATA,
            self.global_variables,
        )?;
        write_table_block::<GlobalFunctionTable>(
            &mut w,
            block_ids::GLOBAL_FUNCTION,
            global_function_block::GLOBAL_FUNCTION_DATA,
            self.global_functions,
        )?;
        write_table_block::<EnumConstantTable>(
            &mut w,
            block_ids::ENUM_CONSTANT,
            enum_constant_block::ENUM_CONSTANT_DATA,
            self.enum_constants,
        )?;
        write_table_block::<TagTable>(&mut w, block_ids::TAG, tag_block::TAG_DATA, self.tags)?;
        write_table_block::<TypedefTable>(
            &mut w,
            block_ids::TYPEDEF,
            typedef_block::TYPEDEF_DATA,
            self.typedefs,
        )?;

        Ok(w.into_bytes())
    }
}

fn write_control_block(w: &mut BlockWriter, config: &WriterConfig) -> EncodeResult<()> {
    let mark = w.enter_block(block_ids::CONTROL);
    w.emit_record(
        control_block::METADATA,
        &[VERSION_MAJOR as u64, VERSION_MINOR as u64],
        &[],
    )?;
    w.emit_record(control_block::MODULE_NAME, &[], config.module_name.as_bytes())?;
    if let Some(source) = config.source_file {
        w.emit_record(
            control_block::SOURCE_FILE,
            &[source.size, source.modification_time as u64],
            &[],
        )?;
    }
    let mut flags = 0u64;
    if config.module_options.swift_infer_import_as_member {
        flags |= module_option_flags::SWIFT_INFER_IMPORT_AS_MEMBER;
    }
    w.emit_record(control_block::MODULE_OPTIONS, &[flags], &[])?;
    w.exit_block(mark)
}

fn emit_table<I: TableInfo>(
    w: &mut BlockWriter,
    kind: u32,
    items: impl IntoIterator<Item = (I::Key, I::Data)>,
) -> EncodeResult<()> {
    let mut builder = OnDiskTableBuilder::<I>::new();
    for (key, data) in items {
        builder.insert(key, data);
    }
    let entries = builder.len();
    let (blob, bucket_offset) = builder.emit()?;
    trace!(
        target: "apinotes::writer",
        table = I::NAME,
        entries,
        bytes = blob.len(),
        "Emitted table"
    );
    w.emit_record(kind, &[bucket_offset as u64], &blob)
}

fn write_table_block<I: TableInfo>(
    w: &mut BlockWriter,
    block_id: u32,
    kind: u32,
    items: impl IntoIterator<Item = (I::Key, I::Data)>,
) -> EncodeResult<()> {
    let mark = w.enter_block(block_id);
    emit_table::<I>(w, kind, items)?;
    w.exit_block(mark)
}
