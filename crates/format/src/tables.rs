//! Key and value strategies for each on-disk table
//!
//! | Table          | Key                                   | Value                 |
//! |----------------|---------------------------------------|-----------------------|
//! | identifier     | UTF-8 bytes                           | `IdentifierId`        |
//! | selector       | u16 num_args, u32 identifier IDs      | `SelectorId`          |
//! | context ID     | u32 name, u8 is_protocol              | `ContextId`           |
//! | context info   | u32 context                           | versioned context     |
//! | property       | u32 context, u32 name, u8 is_instance | versioned property    |
//! | method         | u32 context, u32 selector, u8 is_inst | versioned method      |
//! | others         | u32 name                              | versioned payload     |

use std::marker::PhantomData;

use apinotes_core::{
    ContextId, EncodeResult, EnumConstantInfo, FormatError, FormatResult, FunctionInfo,
    IdentifierId, ObjCContextInfo, ObjCMethodInfo, ObjCPropertyInfo, SelectorId, StoredSelector,
    TagInfo, TypedefInfo, VariableInfo, VersionedEntries,
};

use crate::entity::EntityCodec;
use crate::hash_table::TableInfo;
use crate::payload::{PayloadReader, PayloadWriter};
use crate::versioned::{read_versioned, write_versioned};

/// Fixed binary encoding of a table key
pub trait KeyCodec: Sized {
    /// Append the key bytes
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()>;
    /// Decode a key from exactly its bytes
    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self>;
}

fn read_bool(r: &mut PayloadReader<'_>) -> FormatResult<bool> {
    match r.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FormatError::InvalidEnumValue {
            kind: "bool",
            value: other as u64,
        }),
    }
}

/// Key of the context ID table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextTableKey {
    /// Class or protocol name
    pub name: IdentifierId,
    /// Protocol rather than class
    pub is_protocol: bool,
}

/// Key of the property table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyTableKey {
    /// Owning class or protocol
    pub context: ContextId,
    /// Property name
    pub name: IdentifierId,
    /// Instance rather than class property
    pub is_instance: bool,
}

/// Key of the method table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodTableKey {
    /// Owning class or protocol
    pub context: ContextId,
    /// Method selector
    pub selector: SelectorId,
    /// Instance rather than class method
    pub is_instance: bool,
}

impl KeyCodec for IdentifierId {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(self.0);
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        r.read_u32().map(IdentifierId)
    }
}

impl KeyCodec for ContextId {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(self.0);
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        r.read_u32().map(ContextId)
    }
}

impl KeyCodec for ContextTableKey {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(self.name.0);
        w.put_u8(self.is_protocol as u8);
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        Ok(ContextTableKey {
            name: IdentifierId(r.read_u32()?),
            is_protocol: read_bool(r)?,
        })
    }
}

impl KeyCodec for PropertyTableKey {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(self.context.0);
        w.put_u32(self.name.0);
        w.put_u8(self.is_instance as u8);
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        Ok(PropertyTableKey {
            context: ContextId(r.read_u32()?),
            name: IdentifierId(r.read_u32()?),
            is_instance: read_bool(r)?,
        })
    }
}

impl KeyCodec for MethodTableKey {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(self.context.0);
        w.put_u32(self.selector.0);
        w.put_u8(self.is_instance as u8);
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        Ok(MethodTableKey {
            context: ContextId(r.read_u32()?),
            selector: SelectorId(r.read_u32()?),
            is_instance: read_bool(r)?,
        })
    }
}

impl KeyCodec for StoredSelector {
    fn encode_key(&self, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u16(self.num_args);
        for id in &self.identifiers {
            w.put_u32(id.0);
        }
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self> {
        let num_args = r.read_u16()?;
        if r.remaining() % 4 != 0 {
            return Err(FormatError::CorruptTable {
                table: SelectorTable::NAME,
                detail: "selector key is not a whole number of identifiers".to_string(),
            });
        }
        let mut identifiers = Vec::with_capacity(r.remaining() / 4);
        while !r.is_at_end() {
            identifiers.push(IdentifierId(r.read_u32()?));
        }
        Ok(StoredSelector {
            num_args,
            identifiers,
        })
    }
}

/// Identifier string → ID
#[derive(Debug)]
pub enum IdentifierTable {}

impl TableInfo for IdentifierTable {
    type Key = String;
    type Data = IdentifierId;
    const NAME: &'static str = "identifier";

    fn encode_key(key: &String, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_bytes(key.as_bytes());
        Ok(())
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<String> {
        let bytes = r.read_bytes(r.remaining())?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| FormatError::InvalidUtf8)
    }

    fn encode_data(data: &IdentifierId, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(data.0);
        Ok(())
    }

    fn decode_data(r: &mut PayloadReader<'_>) -> FormatResult<IdentifierId> {
        r.read_u32().map(IdentifierId)
    }
}

/// Selector pieces → ID
#[derive(Debug)]
pub enum SelectorTable {}

impl TableInfo for SelectorTable {
    type Key = StoredSelector;
    type Data = SelectorId;
    const NAME: &'static str = "selector";

    fn encode_key(key: &StoredSelector, w: &mut PayloadWriter) -> EncodeResult<()> {
        key.encode_key(w)
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<StoredSelector> {
        StoredSelector::decode_key(r)
    }

    fn encode_data(data: &SelectorId, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(data.0);
        Ok(())
    }

    fn decode_data(r: &mut PayloadReader<'_>) -> FormatResult<SelectorId> {
        r.read_u32().map(SelectorId)
    }
}

/// (name, is_protocol) → context ID
#[derive(Debug)]
pub enum ContextIdTable {}

impl TableInfo for ContextIdTable {
    type Key = ContextTableKey;
    type Data = ContextId;
    const NAME: &'static str = "objc context ID";

    fn encode_key(key: &ContextTableKey, w: &mut PayloadWriter) -> EncodeResult<()> {
        key.encode_key(w)
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<ContextTableKey> {
        ContextTableKey::decode_key(r)
    }

    fn encode_data(data: &ContextId, w: &mut PayloadWriter) -> EncodeResult<()> {
        w.put_u32(data.0);
        Ok(())
    }

    fn decode_data(r: &mut PayloadReader<'_>) -> FormatResult<ContextId> {
        r.read_u32().map(ContextId)
    }
}

/// Payload stored in a versioned table
pub trait VersionedPayload: EntityCodec {
    /// Name of the table holding this payload
    const TABLE_NAME: &'static str;
}

impl VersionedPayload for ObjCContextInfo {
    const TABLE_NAME: &'static str = "objc context info";
}

impl VersionedPayload for ObjCPropertyInfo {
    const TABLE_NAME: &'static str = "objc property";
}

impl VersionedPayload for ObjCMethodInfo {
    const TABLE_NAME: &'static str = "objc method";
}

impl VersionedPayload for VariableInfo {
    const TABLE_NAME: &'static str = "global variable";
}

impl VersionedPayload for FunctionInfo {
    const TABLE_NAME: &'static str = "global function";
}

impl VersionedPayload for EnumConstantInfo {
    const TABLE_NAME: &'static str = "enum constant";
}

impl VersionedPayload for TagInfo {
    const TABLE_NAME: &'static str = "tag";
}

impl VersionedPayload for TypedefInfo {
    const TABLE_NAME: &'static str = "typedef";
}

/// Key → list of (version, payload)
pub struct VersionedTable<K, T>(PhantomData<fn() -> (K, T)>);

impl<K: KeyCodec, T: VersionedPayload> TableInfo for VersionedTable<K, T> {
    type Key = K;
    type Data = VersionedEntries<T>;
    const NAME: &'static str = T::TABLE_NAME;

    fn encode_key(key: &K, w: &mut PayloadWriter) -> EncodeResult<()> {
        key.encode_key(w)
    }

    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<K> {
        K::decode_key(r)
    }

    fn encode_data(data: &VersionedEntries<T>, w: &mut PayloadWriter) -> EncodeResult<()> {
        write_versioned(w, data, |w, payload| payload.encode(w))
    }

    fn decode_data(r: &mut PayloadReader<'_>) -> FormatResult<VersionedEntries<T>> {
        read_versioned(r, T::decode)
    }
}

/// Context ID → versioned class or protocol info
pub type ContextInfoTable = VersionedTable<ContextId, ObjCContextInfo>;
/// Property key → versioned property info
pub type ObjCPropertyTable = VersionedTable<PropertyTableKey, ObjCPropertyInfo>;
/// Method key → versioned method info
pub type ObjCMethodTable = VersionedTable<MethodTableKey, ObjCMethodInfo>;
/// Name → versioned global variable info
pub type GlobalVariableTable = VersionedTable<IdentifierId, VariableInfo>;
/// Name → versioned global function info
pub type GlobalFunctionTable = VersionedTable<IdentifierId, FunctionInfo>;
/// Name → versioned enumerator info
pub type EnumConstantTable = VersionedTable<IdentifierId, EnumConstantInfo>;
/// Name → versioned tag info
pub type TagTable = VersionedTable<IdentifierId, TagInfo>;
/// Name → versioned typedef info
pub type TypedefTable = VersionedTable<IdentifierId, TypedefInfo>;
