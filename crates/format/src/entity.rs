//! Annotation payload encoding
//!
//! Each payload type writes its embedded base first (or last, for the
//! types whose flag byte leads) followed by its own fields. Optional
//! booleans use a "present" bit next to a "value" bit; optional enums are
//! stored as `raw + 1` with 0 meaning absent.
//!
//! ```text
//! CommonEntityInfo  flags(u8) msg(str16) swift_name(str16)
//!                   flags: bit0 unavailable_in_swift, bit1 unavailable,
//!                          bit2 swift_private, bit3 swift_private present
//! CommonTypeInfo    CommonEntityInfo bridge(ostr16) error_domain(ostr16)
//! VariableInfo      CommonEntityInfo has_nullability(u8) nullability(u8) type(str16)
//! ParamInfo         VariableInfo flags(u8)
//!                   flags: bits0-2 retain convention + 1,
//!                          bit3 no_escape, bit4 no_escape present
//! FunctionInfo      CommonEntityInfo flags(u8) num_adjusted(u8) payload(u64)
//!                   param_count(u16) ParamInfo[..] result_type(str16)
//!                   flags: bits0-2 retain convention + 1, bit3 audited
//! ObjCContextInfo   CommonTypeInfo flags(u8)
//!                   flags: bit0 designated inits,
//!                          bits1-3 default nullability (bit3 present),
//!                          bits4-5 objc members (bit5 present),
//!                          bits6-7 import as non-generic (bit7 present)
//! ObjCPropertyInfo  VariableInfo flags(u8): bit0 as accessors, bit1 present
//! ObjCMethodInfo    flags(u8): bit0 required init, bit1 designated init
//!                   FunctionInfo
//! TagInfo           flags(u8) CommonTypeInfo
//!                   flags: bit0 flag_enum, bit1 flag_enum present,
//!                          bits2-3 extensibility + 1
//! TypedefInfo       flags(u8): bits0-1 swift wrapper + 1; CommonTypeInfo
//! EnumConstantInfo  CommonEntityInfo
//! ```

use apinotes_core::{
    CommonEntityInfo, CommonTypeInfo, EncodeError, EncodeResult, EnumConstantInfo,
    EnumExtensibilityKind, FormatError, FormatResult, FunctionInfo, NullabilityKind,
    ObjCContextInfo, ObjCMethodInfo, ObjCPropertyInfo, ParamInfo, RetainCountConventionKind,
    SwiftNewTypeKind, TagInfo, TypedefInfo, VariableInfo,
};

use crate::payload::{PayloadReader, PayloadWriter};

/// Binary encoding of one annotation payload
pub trait EntityCodec: Sized {
    /// Append the encoded payload
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()>;

    /// Decode a payload from the reader's current position
    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self>;
}

fn encode_optional_bool(value: Option<bool>) -> u8 {
    match value {
        None => 0,
        Some(v) => 0b10 | v as u8,
    }
}

fn decode_optional_bool(bits: u8) -> Option<bool> {
    if bits & 0b10 != 0 {
        Some(bits & 0b01 != 0)
    } else {
        None
    }
}

fn decode_plus_one<T>(
    raw: u8,
    kind: &'static str,
    from_raw: impl Fn(u8) -> Option<T>,
) -> FormatResult<Option<T>> {
    match raw {
        0 => Ok(None),
        raw => from_raw(raw - 1)
            .map(Some)
            .ok_or(FormatError::InvalidEnumValue {
                kind,
                value: raw as u64 - 1,
            }),
    }
}

fn decode_nullability(raw: u8) -> FormatResult<NullabilityKind> {
    NullabilityKind::from_raw(raw).ok_or(FormatError::InvalidEnumValue {
        kind: "nullability",
        value: raw as u64,
    })
}

fn convention_bits(convention: Option<RetainCountConventionKind>) -> u8 {
    convention.map_or(0, |c| c as u8 + 1)
}

fn decode_convention(raw: u8) -> FormatResult<Option<RetainCountConventionKind>> {
    decode_plus_one(
        raw,
        "retain count convention",
        RetainCountConventionKind::from_raw,
    )
}

impl EntityCodec for CommonEntityInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        let mut flags = 0u8;
        if self.unavailable_in_swift {
            flags |= 0x01;
        }
        if self.unavailable {
            flags |= 0x02;
        }
        flags |= encode_optional_bool(self.swift_private) << 2;
        w.put_u8(flags);
        w.put_string("unavailable_msg", &self.unavailable_msg)?;
        w.put_string("swift_name", &self.swift_name)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let flags = r.read_u8()?;
        Ok(CommonEntityInfo {
            unavailable_in_swift: flags & 0x01 != 0,
            unavailable: flags & 0x02 != 0,
            swift_private: decode_optional_bool((flags >> 2) & 0b11),
            unavailable_msg: r.read_string()?,
            swift_name: r.read_string()?,
        })
    }
}

impl EntityCodec for CommonTypeInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.common.encode(w)?;
        w.put_optional_string("swift_bridge", self.swift_bridge.as_deref())?;
        w.put_optional_string("ns_error_domain", self.ns_error_domain.as_deref())
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        Ok(CommonTypeInfo {
            common: CommonEntityInfo::decode(r)?,
            swift_bridge: r.read_optional_string()?,
            ns_error_domain: r.read_optional_string()?,
        })
    }
}

impl EntityCodec for VariableInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.common.encode(w)?;
        match self.nullability {
            Some(kind) => {
                w.put_u8(1);
                w.put_u8(kind as u8);
            }
            None => {
                w.put_u8(0);
                w.put_u8(0);
            }
        }
        w.put_string("type", &self.type_name)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let common = CommonEntityInfo::decode(r)?;
        let has_nullability = r.read_u8()? != 0;
        let raw = r.read_u8()?;
        let nullability = if has_nullability {
            Some(decode_nullability(raw)?)
        } else {
            None
        };
        Ok(VariableInfo {
            common,
            nullability,
            type_name: r.read_string()?,
        })
    }
}

impl EntityCodec for ParamInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.variable.encode(w)?;
        let flags =
            convention_bits(self.retain_count_convention) | encode_optional_bool(self.no_escape) << 3;
        w.put_u8(flags);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let variable = VariableInfo::decode(r)?;
        let flags = r.read_u8()?;
        Ok(ParamInfo {
            variable,
            retain_count_convention: decode_convention(flags & 0x07)?,
            no_escape: decode_optional_bool((flags >> 3) & 0b11),
        })
    }
}

impl EntityCodec for FunctionInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.common.encode(w)?;
        let mut flags = convention_bits(self.retain_count_convention);
        if self.nullability_audited {
            flags |= 0x08;
        }
        w.put_u8(flags);
        w.put_u8(self.num_adjusted_nullable);
        w.put_u64(self.nullability_payload);

        let count = u16::try_from(self.params.len()).map_err(|_| EncodeError::TooMany {
            what: "parameters",
            count: self.params.len(),
            max: u16::MAX as usize,
        })?;
        w.put_u16(count);
        for param in &self.params {
            param.encode(w)?;
        }
        w.put_string("result_type", &self.result_type)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let common = CommonEntityInfo::decode(r)?;
        let flags = r.read_u8()?;
        let num_adjusted_nullable = r.read_u8()?;
        let nullability_payload = r.read_u64()?;
        let count = r.read_u16()? as usize;
        let mut params = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            params.push(ParamInfo::decode(r)?);
        }
        Ok(FunctionInfo {
            common,
            retain_count_convention: decode_convention(flags & 0x07)?,
            nullability_audited: flags & 0x08 != 0,
            num_adjusted_nullable,
            nullability_payload,
            params,
            result_type: r.read_string()?,
        })
    }
}

impl EntityCodec for ObjCContextInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.common_type.encode(w)?;
        let mut payload = encode_optional_bool(self.swift_import_as_non_generic);
        payload <<= 2;
        payload |= encode_optional_bool(self.swift_objc_members);
        payload <<= 3;
        if let Some(kind) = self.default_nullability {
            payload |= 0b100 | kind as u8;
        }
        payload = (payload << 1) | self.has_designated_inits as u8;
        w.put_u8(payload);
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let common_type = CommonTypeInfo::decode(r)?;
        let mut payload = r.read_u8()?;

        let has_designated_inits = payload & 0x01 != 0;
        payload >>= 1;
        let default_nullability = if payload & 0b100 != 0 {
            Some(decode_nullability(payload & 0b011)?)
        } else {
            None
        };
        payload >>= 3;
        let swift_objc_members = decode_optional_bool(payload & 0b11);
        payload >>= 2;
        let swift_import_as_non_generic = decode_optional_bool(payload & 0b11);

        Ok(ObjCContextInfo {
            common_type,
            has_designated_inits,
            default_nullability,
            swift_objc_members,
            swift_import_as_non_generic,
        })
    }
}

impl EntityCodec for ObjCPropertyInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.variable.encode(w)?;
        w.put_u8(encode_optional_bool(self.swift_import_as_accessors));
        Ok(())
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let variable = VariableInfo::decode(r)?;
        let flags = r.read_u8()?;
        Ok(ObjCPropertyInfo {
            variable,
            swift_import_as_accessors: decode_optional_bool(flags & 0b11),
        })
    }
}

impl EntityCodec for ObjCMethodInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        let mut flags = 0u8;
        if self.required_init {
            flags |= 0x01;
        }
        if self.designated_init {
            flags |= 0x02;
        }
        w.put_u8(flags);
        self.function.encode(w)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let flags = r.read_u8()?;
        Ok(ObjCMethodInfo {
            required_init: flags & 0x01 != 0,
            designated_init: flags & 0x02 != 0,
            function: FunctionInfo::decode(r)?,
        })
    }
}

impl EntityCodec for TagInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        let mut flags = encode_optional_bool(self.flag_enum);
        if let Some(kind) = self.enum_extensibility {
            flags |= (kind as u8 + 1) << 2;
        }
        w.put_u8(flags);
        self.common_type.encode(w)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let flags = r.read_u8()?;
        let flag_enum = decode_optional_bool(flags & 0b11);
        let enum_extensibility = decode_plus_one(
            (flags >> 2) & 0x03,
            "enum extensibility",
            EnumExtensibilityKind::from_raw,
        )?;
        Ok(TagInfo {
            flag_enum,
            enum_extensibility,
            common_type: CommonTypeInfo::decode(r)?,
        })
    }
}

impl EntityCodec for TypedefInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u8(self.swift_wrapper.map_or(0, |kind| kind as u8 + 1));
        self.common_type.encode(w)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let flags = r.read_u8()?;
        Ok(TypedefInfo {
            swift_wrapper: decode_plus_one(flags & 0x03, "swift wrapper", SwiftNewTypeKind::from_raw)?,
            common_type: CommonTypeInfo::decode(r)?,
        })
    }
}

impl EntityCodec for EnumConstantInfo {
    fn encode(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        self.common.encode(w)
    }

    fn decode(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        Ok(EnumConstantInfo {
            common: CommonEntityInfo::decode(r)?,
        })
    }
}
