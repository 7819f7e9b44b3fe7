//! Conversion from [`ModuleNotes`] to a binary container
//!
//! The pass walks the unversioned declarations first and then each
//! `SwiftVersions` section, validating as it goes and feeding the writer.
//! Problems are reported to the caller's [`DiagnosticSink`]; the offending
//! declaration is skipped and conversion continues.
//!
//! Checks performed:
//! - duplicate declarations within one section (per kind)
//! - malformed selectors
//! - more nullability entries than a signature can store
//! - `EnumKind` combined with `EnumExtensibility` or `FlagEnum`
//! - an availability message on an available declaration
//! - the retired `FactoryAsInit` key

use apinotes_core::{
    CommonEntityInfo, CommonTypeInfo, ContextId, ContextKind, EncodeResult,
    EnumConstantInfo, EnumExtensibilityKind, FunctionInfo, GlobalVariableInfo, ModuleOptions,
    NullabilityKind, ObjCContextInfo, ObjCMethodInfo, ObjCPropertyInfo, ParamInfo,
    RetainCountConventionKind, SelectorRef, TagInfo, TypedefInfo, VariableInfo, VersionTuple,
};
use apinotes_store::{ApiNotesWriter, SourceFileInfo, WriterConfig};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::CompileError;
use crate::model::{
    ApiAvailability, AvailabilityItem, Class, EnumConvenienceKind, FactoryAsInitKind, Function,
    Method, MethodKind, ModuleNotes, Param, TopLevelItems,
};

/// Largest accepted parameter position
pub const MAX_PARAM_POSITION: u32 = u16::MAX as u32 - 1;

/// Compile `notes` into a container
///
/// All diagnostics go to `sink`. Returns the container bytes only when no
/// error was reported.
pub fn compile_module(
    notes: &ModuleNotes,
    source_file: Option<SourceFileInfo>,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<u8>, CompileError> {
    let mut config = WriterConfig::new(notes.name.clone());
    if let Some(source_file) = source_file {
        config = config.with_source_file(source_file);
    }
    if let Some(infer) = notes.swift_infer_import_as_member {
        config = config.with_module_options(ModuleOptions {
            swift_infer_import_as_member: infer,
        });
    }

    let mut converter = Converter {
        writer: ApiNotesWriter::with_config(config),
        sink,
        errors: 0,
    };
    converter.convert_items(&notes.top_level, VersionTuple::empty());
    for section in &notes.swift_versions {
        converter.convert_items(&section.items, section.version);
    }

    if converter.errors > 0 {
        return Err(CompileError::Diagnostics {
            errors: converter.errors,
        });
    }
    let bytes = converter.writer.write_to_vec()?;
    debug!(
        target: "apinotes::compiler",
        module = %notes.name,
        sections = notes.swift_versions.len() + 1,
        bytes = bytes.len(),
        "Compiled API notes"
    );
    Ok(bytes)
}

/// Parse JSON notes and compile them
pub fn compile_json(
    text: &str,
    source_file: Option<SourceFileInfo>,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<u8>, CompileError> {
    let notes = ModuleNotes::from_json(text)?;
    compile_module(&notes, source_file, sink)
}

struct Converter<'s> {
    writer: ApiNotesWriter,
    sink: &'s mut dyn DiagnosticSink,
    errors: usize,
}

impl Converter<'_> {
    fn error(&mut self, message: String) {
        self.errors += 1;
        self.sink.report(Diagnostic::error(message));
    }

    fn convert_availability(
        &mut self,
        availability: &AvailabilityItem,
        common: &mut CommonEntityInfo,
        name: &str,
    ) {
        common.unavailable = availability.mode == ApiAvailability::None;
        common.unavailable_in_swift = availability.mode == ApiAvailability::NonSwift;
        if common.unavailable || common.unavailable_in_swift {
            common.unavailable_msg = availability.msg.clone();
        } else if !availability.msg.is_empty() {
            self.error(format!(
                "availability message for available API '{}' will not be used",
                name
            ));
        }
    }

    fn convert_common_entity(
        &mut self,
        availability: &AvailabilityItem,
        swift_private: Option<bool>,
        swift_name: &str,
        name: &str,
    ) -> CommonEntityInfo {
        let mut common = CommonEntityInfo::default();
        self.convert_availability(availability, &mut common, name);
        common.swift_private = swift_private;
        common.swift_name = swift_name.to_string();
        common
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_common_type(
        &mut self,
        availability: &AvailabilityItem,
        swift_private: Option<bool>,
        swift_name: &str,
        swift_bridge: &Option<String>,
        ns_error_domain: &Option<String>,
        name: &str,
    ) -> CommonTypeInfo {
        CommonTypeInfo {
            common: self.convert_common_entity(availability, swift_private, swift_name, name),
            swift_bridge: swift_bridge.clone(),
            ns_error_domain: ns_error_domain.clone(),
        }
    }

    fn convert_params(&mut self, params: &[Param], info: &mut FunctionInfo, name: &str) {
        for param in params {
            if param.position > MAX_PARAM_POSITION {
                self.error(format!(
                    "parameter position {} of '{}' exceeds storage",
                    param.position, name
                ));
                continue;
            }
            let converted = ParamInfo {
                variable: VariableInfo {
                    common: CommonEntityInfo::default(),
                    nullability: param.nullability,
                    type_name: param.type_name.clone(),
                },
                no_escape: param.no_escape,
                retain_count_convention: param.retain_count_convention,
            };
            let position = param.position as usize;
            if info.params.len() <= position {
                info.params.resize_with(position + 1, ParamInfo::default);
            }
            info.params[position].merge_from(&converted);
        }
    }

    fn convert_nullability(
        &mut self,
        nullability: &[NullabilityKind],
        of_ret: Option<NullabilityKind>,
        info: &mut FunctionInfo,
        name: &str,
    ) {
        if nullability.len() > FunctionInfo::max_nullability_index() as usize {
            self.error(format!("nullability info for '{}' exceeds storage", name));
            return;
        }
        if let Err(err) = apply_nullability(nullability, of_ret, info) {
            self.error(format!("nullability info for '{}': {}", name, err));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_signature(
        &mut self,
        params: &[Param],
        nullability: &[NullabilityKind],
        of_ret: Option<NullabilityKind>,
        result_type: &str,
        convention: Option<RetainCountConventionKind>,
        info: &mut FunctionInfo,
        name: &str,
    ) {
        self.convert_params(params, info, name);
        self.convert_nullability(nullability, of_ret, info, name);
        info.result_type = result_type.to_string();
        info.retain_count_convention = convention;
    }

    fn convert_method(&mut self, method: &Method, context: ContextId, version: VersionTuple) {
        let common = self.convert_common_entity(
            &method.availability,
            method.swift_private,
            &method.swift_name,
            &method.selector,
        );
        let selector = match SelectorRef::parse(&method.selector) {
            Ok(selector) => selector,
            Err(err) => {
                self.error(err.to_string());
                return;
            }
        };

        let mut info = ObjCMethodInfo {
            function: FunctionInfo {
                common,
                ..FunctionInfo::default()
            },
            designated_init: method.designated_init,
            required_init: method.required,
        };
        if method.factory_as_init != FactoryAsInitKind::Infer {
            self.error("'FactoryAsInit' is no longer valid; use 'SwiftName' instead".to_string());
        }
        self.convert_signature(
            &method.params,
            &method.nullability,
            method.nullability_of_ret,
            &method.result_type,
            method.retain_count_convention,
            &mut info.function,
            &method.selector,
        );
        self.writer.add_objc_method(
            context,
            &selector,
            method.kind == MethodKind::Instance,
            &info,
            version,
        );
    }

    fn convert_context(&mut self, class: &Class, kind: ContextKind, version: VersionTuple) {
        let mut info = ObjCContextInfo {
            common_type: self.convert_common_type(
                &class.availability,
                class.swift_private,
                &class.swift_name,
                &class.swift_bridge,
                &class.ns_error_domain,
                &class.name,
            ),
            ..ObjCContextInfo::default()
        };
        if class.audited_for_nullability {
            info.default_nullability = Some(NullabilityKind::NonNull);
        }
        info.swift_import_as_non_generic = class.swift_import_as_non_generic;
        info.swift_objc_members = class.swift_objc_members;
        let context = self.writer.add_objc_context(&class.name, kind, &info, version);

        // selector -> (instance seen, class seen)
        let mut known_methods: FxHashMap<&str, (bool, bool)> = FxHashMap::default();
        for method in &class.methods {
            let is_instance = method.kind == MethodKind::Instance;
            let seen = known_methods.entry(method.selector.as_str()).or_default();
            let known = if is_instance { &mut seen.0 } else { &mut seen.1 };
            if *known {
                self.error(format!(
                    "multiple definitions of method '{}[{} {}]'",
                    if is_instance { "-" } else { "+" },
                    class.name,
                    method.selector
                ));
                continue;
            }
            *known = true;
            self.convert_method(method, context, version);
        }

        let mut known_instance: FxHashSet<&str> = FxHashSet::default();
        let mut known_class: FxHashSet<&str> = FxHashSet::default();
        for property in &class.properties {
            if property.kind != Some(MethodKind::Class)
                && !known_instance.insert(property.name.as_str())
            {
                self.error(format!(
                    "multiple definitions of instance property '{}.{}'",
                    class.name, property.name
                ));
                continue;
            }
            if property.kind != Some(MethodKind::Instance)
                && !known_class.insert(property.name.as_str())
            {
                self.error(format!(
                    "multiple definitions of class property '{}.{}'",
                    class.name, property.name
                ));
                continue;
            }

            let info = ObjCPropertyInfo {
                variable: VariableInfo {
                    common: self.convert_common_entity(
                        &property.availability,
                        property.swift_private,
                        &property.swift_name,
                        &property.name,
                    ),
                    nullability: property.nullability,
                    type_name: property.type_name.clone(),
                },
                swift_import_as_accessors: property.swift_import_as_accessors,
            };
            match property.kind {
                Some(kind) => self.writer.add_objc_property(
                    context,
                    &property.name,
                    kind == MethodKind::Instance,
                    &info,
                    version,
                ),
                None => {
                    self.writer
                        .add_objc_property(context, &property.name, false, &info, version);
                    self.writer
                        .add_objc_property(context, &property.name, true, &info, version);
                }
            }
        }
    }

    fn convert_function(&mut self, function: &Function, version: VersionTuple) {
        let mut info = FunctionInfo {
            common: self.convert_common_entity(
                &function.availability,
                function.swift_private,
                &function.swift_name,
                &function.name,
            ),
            ..FunctionInfo::default()
        };
        self.convert_signature(
            &function.params,
            &function.nullability,
            function.nullability_of_ret,
            &function.result_type,
            function.retain_count_convention,
            &mut info,
            &function.name,
        );
        self.writer.add_global_function(&function.name, &info, version);
    }

    /// Report a duplicate and return `false` when `name` was already seen
    fn first_definition<'n>(
        &mut self,
        known: &mut FxHashSet<&'n str>,
        name: &'n str,
        what: &str,
    ) -> bool {
        if known.insert(name) {
            return true;
        }
        self.error(format!("multiple definitions of {} '{}'", what, name));
        false
    }

    fn convert_items(&mut self, items: &TopLevelItems, version: VersionTuple) {
        let mut known = FxHashSet::default();
        for class in &items.classes {
            if self.first_definition(&mut known, &class.name, "class") {
                self.convert_context(class, ContextKind::Class, version);
            }
        }

        let mut known = FxHashSet::default();
        for protocol in &items.protocols {
            if self.first_definition(&mut known, &protocol.name, "protocol") {
                self.convert_context(protocol, ContextKind::Protocol, version);
            }
        }

        let mut known = FxHashSet::default();
        for global in &items.globals {
            if !self.first_definition(&mut known, &global.name, "global variable") {
                continue;
            }
            let info = GlobalVariableInfo {
                common: self.convert_common_entity(
                    &global.availability,
                    global.swift_private,
                    &global.swift_name,
                    &global.name,
                ),
                nullability: global.nullability,
                type_name: global.type_name.clone(),
            };
            self.writer.add_global_variable(&global.name, &info, version);
        }

        let mut known = FxHashSet::default();
        for function in &items.functions {
            if self.first_definition(&mut known, &function.name, "function") {
                self.convert_function(function, version);
            }
        }

        let mut known = FxHashSet::default();
        for constant in &items.enum_constants {
            if !self.first_definition(&mut known, &constant.name, "enumerator") {
                continue;
            }
            let info = EnumConstantInfo {
                common: self.convert_common_entity(
                    &constant.availability,
                    constant.swift_private,
                    &constant.swift_name,
                    &constant.name,
                ),
            };
            self.writer.add_enum_constant(&constant.name, &info, version);
        }

        let mut known = FxHashSet::default();
        for tag in &items.tags {
            if !self.first_definition(&mut known, &tag.name, "tag") {
                continue;
            }
            let mut info = TagInfo {
                common_type: self.convert_common_type(
                    &tag.availability,
                    tag.swift_private,
                    &tag.swift_name,
                    &tag.swift_bridge,
                    &tag.ns_error_domain,
                    &tag.name,
                ),
                ..TagInfo::default()
            };
            match tag.enum_kind {
                Some(_) if tag.enum_extensibility.is_some() => {
                    self.error(format!(
                        "cannot mix EnumKind and EnumExtensibility (for {})",
                        tag.name
                    ));
                    continue;
                }
                Some(_) if tag.flag_enum.is_some() => {
                    self.error(format!("cannot mix EnumKind and FlagEnum (for {})", tag.name));
                    continue;
                }
                Some(kind) => {
                    let (extensibility, flag_enum) = expand_enum_kind(kind);
                    info.enum_extensibility = Some(extensibility);
                    info.flag_enum = Some(flag_enum);
                }
                None => {
                    info.enum_extensibility = tag.enum_extensibility;
                    info.flag_enum = tag.flag_enum;
                }
            }
            self.writer.add_tag(&tag.name, &info, version);
        }

        let mut known = FxHashSet::default();
        for typedef in &items.typedefs {
            if !self.first_definition(&mut known, &typedef.name, "typedef") {
                continue;
            }
            let info = TypedefInfo {
                common_type: self.convert_common_type(
                    &typedef.availability,
                    typedef.swift_private,
                    &typedef.swift_name,
                    &typedef.swift_bridge,
                    &typedef.ns_error_domain,
                    &typedef.name,
                ),
                swift_wrapper: typedef.swift_wrapper,
            };
            self.writer.add_typedef(&typedef.name, &info, version);
        }
    }
}

fn expand_enum_kind(kind: EnumConvenienceKind) -> (EnumExtensibilityKind, bool) {
    match kind {
        EnumConvenienceKind::None => (EnumExtensibilityKind::None, false),
        EnumConvenienceKind::CfEnum => (EnumExtensibilityKind::Open, false),
        EnumConvenienceKind::CfOptions => (EnumExtensibilityKind::Open, true),
        EnumConvenienceKind::CfClosedEnum => (EnumExtensibilityKind::Closed, false),
    }
}

/// Fill the nullability slots of `info`
///
/// Parameter `i` goes to slot `i + 1`. When any parameter is listed but
/// the result is not, the result defaults to non-null.
fn apply_nullability(
    nullability: &[NullabilityKind],
    of_ret: Option<NullabilityKind>,
    info: &mut FunctionInfo,
) -> EncodeResult<()> {
    let mut next = 1u32;
    for kind in nullability {
        info.add_type_info(next, *kind)?;
        next += 1;
    }
    let audited = !nullability.is_empty() || of_ret.is_some();
    match of_ret {
        Some(kind) => info.add_type_info(FunctionInfo::RETURN_INFO_INDEX, kind)?,
        None if audited => {
            info.add_type_info(FunctionInfo::RETURN_INFO_INDEX, NullabilityKind::NonNull)?
        }
        None => {}
    }
    Ok(())
}
