//! On-disk chained hash table
//!
//! Each table is stored as a single record blob that can be searched in
//! place without building an in-memory index.
//!
//! # Blob Structure
//!
//! ```text
//! +--------------------------+ 0
//! | Reserved (4 bytes, 0)    |   keeps offset 0 free to mean "empty bucket"
//! +--------------------------+ 4
//! | Chain for bucket i       |   u16 item_count
//! |   Item                   |   u32 hash, u16 key_len, u16 data_len,
//! |   ...                    |   key[key_len], data[data_len]
//! | ...                      |
//! +--------------------------+   padded to a multiple of 4
//! | Bucket array             |   u32 num_buckets (power of two)
//! |                          |   u32 num_entries
//! |                          |   u32 chain_offset[num_buckets] (0 = empty)
//! +--------------------------+
//! ```
//!
//! The record carrying the blob stores the bucket array offset as its
//! single field. Hashes are the low 32 bits of XXH3-64 over the encoded
//! key bytes, so a lookup encodes its key once and compares hash then key
//! bytes along the chain.

use std::marker::PhantomData;

use apinotes_core::{EncodeError, EncodeResult, FormatError, FormatResult};
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::payload::{PayloadReader, PayloadWriter};

/// How keys and values of one table are encoded
pub trait TableInfo {
    /// Lookup key
    type Key;
    /// Stored value
    type Data;

    /// Table name used in error messages and logs
    const NAME: &'static str;

    /// Encode a key; the encoding must be canonical
    fn encode_key(key: &Self::Key, w: &mut PayloadWriter) -> EncodeResult<()>;

    /// Decode a key from exactly its stored bytes
    fn decode_key(r: &mut PayloadReader<'_>) -> FormatResult<Self::Key>;

    /// Encode a value
    fn encode_data(data: &Self::Data, w: &mut PayloadWriter) -> EncodeResult<()>;

    /// Decode a value from exactly its stored bytes
    fn decode_data(r: &mut PayloadReader<'_>) -> FormatResult<Self::Data>;
}

/// Hash of encoded key bytes
#[inline]
pub fn hash_key_bytes(key: &[u8]) -> u32 {
    xxh3_64(key) as u32
}

const RESERVED_PREFIX: usize = 4;
const ITEM_HEADER_LEN: usize = 8;

fn too_many(what: &'static str, count: usize, max: usize) -> EncodeError {
    EncodeError::TooMany { what, count, max }
}

/// Smallest power of two bucket count keeping the load factor under 3/4
pub fn bucket_count_for(entries: usize) -> usize {
    (entries * 4 / 3 + 1).next_power_of_two()
}

/// Accumulates entries and serializes them as a table blob
pub struct OnDiskTableBuilder<I: TableInfo> {
    items: Vec<(I::Key, I::Data)>,
}

impl<I: TableInfo> Default for OnDiskTableBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: TableInfo> OnDiskTableBuilder<I> {
    /// Create an empty builder
    pub fn new() -> Self {
        OnDiskTableBuilder { items: Vec::new() }
    }

    /// Add an entry; keys must be unique
    pub fn insert(&mut self, key: I::Key, data: I::Data) {
        self.items.push((key, data));
    }

    /// Number of entries added
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no entries were added
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize, returning the blob and the bucket array offset
    ///
    /// Output is independent of insertion order: chains are ordered by
    /// hash, then by encoded key bytes.
    pub fn emit(self) -> EncodeResult<(Vec<u8>, u32)> {
        let num_entries = self.items.len();
        let num_buckets = bucket_count_for(num_entries);
        let num_entries_u32 =
            u32::try_from(num_entries).map_err(|_| too_many(I::NAME, num_entries, u32::MAX as usize))?;

        let mut encoded: Vec<(u32, Vec<u8>, Vec<u8>)> = Vec::with_capacity(num_entries);
        for (key, data) in &self.items {
            let mut kw = PayloadWriter::new();
            I::encode_key(key, &mut kw)?;
            let mut dw = PayloadWriter::new();
            I::encode_data(data, &mut dw)?;
            let (key_bytes, data_bytes) = (kw.into_bytes(), dw.into_bytes());
            if key_bytes.len() > u16::MAX as usize {
                return Err(too_many("key bytes", key_bytes.len(), u16::MAX as usize));
            }
            if data_bytes.len() > u16::MAX as usize {
                return Err(too_many("data bytes", data_bytes.len(), u16::MAX as usize));
            }
            encoded.push((hash_key_bytes(&key_bytes), key_bytes, data_bytes));
        }
        let mask = (num_buckets - 1) as u32;
        encoded.sort_by(|a, b| {
            (a.0 & mask, a.0, &a.1).cmp(&(b.0 & mask, b.0, &b.1))
        });

        let mut w = PayloadWriter::new();
        w.put_bytes(&[0u8; RESERVED_PREFIX]);
        let mut offsets = vec![0u32; num_buckets];
        let mut start = 0;
        while start < encoded.len() {
            let bucket = (encoded[start].0 & mask) as usize;
            let end = start
                + encoded[start..]
                    .iter()
                    .take_while(|item| (item.0 & mask) as usize == bucket)
                    .count();
            let chain_len = end - start;
            let chain_len = u16::try_from(chain_len)
                .map_err(|_| too_many("items in one bucket", chain_len, u16::MAX as usize))?;

            offsets[bucket] = w.len() as u32;
            w.put_u16(chain_len);
            for (hash, key, data) in &encoded[start..end] {
                w.put_u32(*hash);
                w.put_u16(key.len() as u16);
                w.put_u16(data.len() as u16);
                w.put_bytes(key);
                w.put_bytes(data);
            }
            start = end;
        }

        w.align_to(4);
        let bucket_offset = u32::try_from(w.len())
            .map_err(|_| too_many("table bytes", w.len(), u32::MAX as usize))?;
        w.put_u32(num_buckets as u32);
        w.put_u32(num_entries_u32);
        for offset in offsets {
            w.put_u32(offset);
        }
        Ok((w.into_bytes(), bucket_offset))
    }
}

/// Shape of a validated table; cheap to copy and re-attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Offset of the bucket array within the blob
    pub bucket_offset: usize,
    /// Number of buckets
    pub num_buckets: u32,
    /// Number of stored entries
    pub num_entries: u32,
}

/// Read-only view over a table blob
pub struct OnDiskTable<'a, I: TableInfo> {
    blob: &'a [u8],
    layout: TableLayout,
    _info: PhantomData<fn() -> I>,
}

impl<'a, I: TableInfo> std::fmt::Debug for OnDiskTable<'a, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnDiskTable")
            .field("table", &I::NAME)
            .field("layout", &self.layout)
            .finish()
    }
}

struct RawItem<'a> {
    hash: u32,
    key: &'a [u8],
    data: &'a [u8],
}

impl<'a, I: TableInfo> OnDiskTable<'a, I> {
    fn corrupt(detail: impl Into<String>) -> FormatError {
        FormatError::CorruptTable {
            table: I::NAME,
            detail: detail.into(),
        }
    }

    /// Validate a blob and every entry in it
    ///
    /// All bounds, hashes and bucket placements are checked and every key
    /// and value is decoded once, so lookups on an attached table only
    /// fail if the bytes change underneath.
    pub fn attach(blob: &'a [u8], bucket_offset: u64) -> FormatResult<Self> {
        let bucket_offset = usize::try_from(bucket_offset)
            .map_err(|_| Self::corrupt("bucket offset out of range"))?;
        if bucket_offset < RESERVED_PREFIX || bucket_offset % 4 != 0 {
            return Err(Self::corrupt(format!(
                "misaligned bucket offset {bucket_offset}"
            )));
        }
        let header = blob
            .get(bucket_offset..)
            .ok_or_else(|| Self::corrupt("bucket offset past end of blob"))?;
        let mut r = PayloadReader::new(header);
        let num_buckets = r.read_u32()?;
        let num_entries = r.read_u32()?;
        if num_buckets == 0 || !num_buckets.is_power_of_two() {
            return Err(Self::corrupt(format!(
                "bucket count {num_buckets} is not a power of two"
            )));
        }
        if (r.remaining() / 4) < num_buckets as usize {
            return Err(Self::corrupt("bucket array truncated"));
        }

        let table = OnDiskTable {
            blob,
            layout: TableLayout {
                bucket_offset,
                num_buckets,
                num_entries,
            },
            _info: PhantomData,
        };

        let mask = num_buckets - 1;
        let mut seen = 0usize;
        for bucket in 0..num_buckets {
            let chain = table.chain_offset(bucket)?;
            if chain == 0 {
                continue;
            }
            if chain < RESERVED_PREFIX || chain >= bucket_offset {
                return Err(Self::corrupt(format!(
                    "bucket {bucket} points outside the chain area"
                )));
            }
            for item in table.chain(chain)? {
                if hash_key_bytes(item.key) != item.hash {
                    return Err(Self::corrupt("stored hash does not match key"));
                }
                if item.hash & mask != bucket {
                    return Err(Self::corrupt("entry stored in the wrong bucket"));
                }
                decode_exact(item.key, I::decode_key)?;
                decode_exact(item.data, I::decode_data)?;
                seen += 1;
            }
        }
        if seen != num_entries as usize {
            return Err(Self::corrupt(format!(
                "header claims {num_entries} entries, found {seen}"
            )));
        }
        trace!(
            target: "apinotes::format",
            table = I::NAME,
            num_entries,
            num_buckets,
            "Attached on-disk table"
        );
        Ok(table)
    }

    /// Re-attach a blob previously validated with `attach`
    pub fn from_layout(blob: &'a [u8], layout: TableLayout) -> Self {
        OnDiskTable {
            blob,
            layout,
            _info: PhantomData,
        }
    }

    /// Layout of this table
    pub fn layout(&self) -> TableLayout {
        self.layout
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.layout.num_entries as usize
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.layout.num_entries == 0
    }

    fn chain_offset(&self, bucket: u32) -> FormatResult<usize> {
        let at = self.layout.bucket_offset + 8 + bucket as usize * 4;
        let bytes = self
            .blob
            .get(at..)
            .ok_or_else(|| Self::corrupt("bucket array truncated"))?;
        Ok(PayloadReader::new(bytes).read_u32()? as usize)
    }

    fn chain(&self, offset: usize) -> FormatResult<Vec<RawItem<'a>>> {
        let area = &self.blob[..self.layout.bucket_offset];
        let mut r = PayloadReader::new(area.get(offset..).unwrap_or_default());
        let count = r.read_u16()? as usize;
        let mut items = Vec::with_capacity(count.min(r.remaining() / ITEM_HEADER_LEN));
        for _ in 0..count {
            let hash = r.read_u32()?;
            let key_len = r.read_u16()? as usize;
            let data_len = r.read_u16()? as usize;
            let key = r.read_bytes(key_len)?;
            let data = r.read_bytes(data_len)?;
            items.push(RawItem { hash, key, data });
        }
        Ok(items)
    }

    /// Find the value stored under already-encoded key bytes
    pub fn lookup_encoded(&self, key: &[u8]) -> FormatResult<Option<I::Data>> {
        let hash = hash_key_bytes(key);
        let bucket = hash & (self.layout.num_buckets - 1);
        let offset = self.chain_offset(bucket)?;
        if offset == 0 {
            return Ok(None);
        }
        for item in self.chain(offset)? {
            if item.hash == hash && item.key == key {
                return decode_exact(item.data, I::decode_data).map(Some);
            }
        }
        Ok(None)
    }

    /// Find the value stored under `key`
    ///
    /// A key the format cannot encode cannot be stored either, so it is
    /// reported as absent.
    pub fn lookup(&self, key: &I::Key) -> FormatResult<Option<I::Data>> {
        let mut w = PayloadWriter::new();
        if I::encode_key(key, &mut w).is_err() {
            return Ok(None);
        }
        self.lookup_encoded(w.as_bytes())
    }

    /// Decode every entry in bucket order
    pub fn entries(&self) -> FormatResult<Vec<(I::Key, I::Data)>> {
        let mut out = Vec::with_capacity(self.len());
        for bucket in 0..self.layout.num_buckets {
            let offset = self.chain_offset(bucket)?;
            if offset == 0 {
                continue;
            }
            for item in self.chain(offset)? {
                out.push((
                    decode_exact(item.key, I::decode_key)?,
                    decode_exact(item.data, I::decode_data)?,
                ));
            }
        }
        Ok(out)
    }
}

fn decode_exact<T>(
    bytes: &[u8],
    decode: impl FnOnce(&mut PayloadReader<'_>) -> FormatResult<T>,
) -> FormatResult<T> {
    let mut r = PayloadReader::new(bytes);
    let value = decode(&mut r)?;
    r.finish()?;
    Ok(value)
}
