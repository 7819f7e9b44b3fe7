//! Block and record framing
//!
//! The container body is a sequence of length-delimited blocks. Every
//! entry starts with a one-byte code:
//!
//! ```text
//! END_BLOCK      (0)  closes the enclosing block; must be its last byte
//! ENTER_SUBBLOCK (1)  u32 block_id, u32 body_len, body[body_len]
//! RECORD         (2)  u32 kind, u16 field_count, u32 blob_len,
//!                     u64 fields[field_count], blob[blob_len]
//! ```
//!
//! Because sub-blocks declare their length up front, a reader can skip any
//! block it does not recognise without understanding its contents.

use apinotes_core::{EncodeError, EncodeResult, FormatError, FormatResult};
use smallvec::SmallVec;

use crate::payload::{PayloadReader, PayloadWriter};

/// Entry code bytes
pub mod entry_codes {
    /// Closes the enclosing block
    pub const END_BLOCK: u8 = 0;
    /// Opens a length-delimited sub-block
    pub const ENTER_SUBBLOCK: u8 = 1;
    /// A record: kind, integer fields, blob
    pub const RECORD: u8 = 2;
}

/// Size of the ENTER_SUBBLOCK header after its code byte
const SUBBLOCK_HEADER_LEN: usize = 8;

/// Size of the RECORD header after its code byte
const RECORD_HEADER_LEN: usize = 10;

/// Position of an open block awaiting its length
#[derive(Debug, Clone, Copy)]
#[must_use = "an entered block must be exited"]
pub struct BlockMark {
    block_id: u32,
    len_offset: usize,
}

impl BlockMark {
    /// ID of the open block
    pub fn block_id(&self) -> u32 {
        self.block_id
    }
}

/// Writes blocks and records into a growable buffer
#[derive(Debug, Default)]
pub struct BlockWriter {
    out: PayloadWriter,
}

impl BlockWriter {
    /// Create a writer with an empty buffer
    pub fn new() -> Self {
        BlockWriter {
            out: PayloadWriter::new(),
        }
    }

    /// Write raw bytes outside any framing (used for the signature)
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.out.put_bytes(bytes);
    }

    /// Open a sub-block
    pub fn enter_block(&mut self, block_id: u32) -> BlockMark {
        self.out.put_u8(entry_codes::ENTER_SUBBLOCK);
        self.out.put_u32(block_id);
        let len_offset = self.out.len();
        self.out.put_u32(0);
        BlockMark {
            block_id,
            len_offset,
        }
    }

    /// Close a sub-block and back-patch its length
    pub fn exit_block(&mut self, mark: BlockMark) -> EncodeResult<()> {
        self.out.put_u8(entry_codes::END_BLOCK);
        let body_len = self.out.len() - mark.len_offset - 4;
        let body_len = u32::try_from(body_len).map_err(|_| EncodeError::TooMany {
            what: "block bytes",
            count: body_len,
            max: u32::MAX as usize,
        })?;
        self.out.patch_u32(mark.len_offset, body_len);
        Ok(())
    }

    /// Emit a record with integer fields and a blob
    pub fn emit_record(&mut self, kind: u32, fields: &[u64], blob: &[u8]) -> EncodeResult<()> {
        let field_count = u16::try_from(fields.len()).map_err(|_| EncodeError::TooMany {
            what: "record fields",
            count: fields.len(),
            max: u16::MAX as usize,
        })?;
        let blob_len = u32::try_from(blob.len()).map_err(|_| EncodeError::TooMany {
            what: "record blob bytes",
            count: blob.len(),
            max: u32::MAX as usize,
        })?;
        self.out.put_u8(entry_codes::RECORD);
        self.out.put_u32(kind);
        self.out.put_u16(field_count);
        self.out.put_u32(blob_len);
        for field in fields {
            self.out.put_u64(*field);
        }
        self.out.put_bytes(blob);
        Ok(())
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consume the writer, returning the buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }
}

/// A decoded record borrowing its blob from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// Record kind, meaningful within the enclosing block
    pub kind: u32,
    /// Integer fields
    pub fields: SmallVec<[u64; 4]>,
    /// Blob payload
    pub blob: &'a [u8],
    /// Absolute offset of the record's code byte
    pub offset: usize,
    /// Absolute offset of the first blob byte
    pub blob_offset: usize,
}

impl<'a> Record<'a> {
    /// Field at `index`, or `MissingField` when the record is too short
    pub fn field(&self, index: usize) -> FormatResult<u64> {
        self.fields
            .get(index)
            .copied()
            .ok_or(FormatError::MissingField {
                kind: self.kind,
                expected: index + 1,
                found: self.fields.len(),
            })
    }
}

/// A decoded sub-block whose body has not been parsed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBlock<'a> {
    /// Block ID
    pub block_id: u32,
    /// Body bytes including the trailing END_BLOCK
    pub body: &'a [u8],
    /// Absolute offset of the first body byte
    pub body_offset: usize,
}

impl<'a> SubBlock<'a> {
    /// Iterate the entries inside this block
    pub fn entries(&self) -> FormatResult<BlockCursor<'a>> {
        BlockCursor::block_body(self.block_id, self.body, self.body_offset)
    }
}

/// One framing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<'a> {
    /// A nested block
    SubBlock(SubBlock<'a>),
    /// A record
    Record(Record<'a>),
}

/// Iterates the entries of one region
///
/// A top-level region ends at the end of its bytes. A block body must end
/// with exactly one END_BLOCK byte, which the cursor consumes silently.
#[derive(Debug)]
pub struct BlockCursor<'a> {
    reader: PayloadReader<'a>,
    base_offset: usize,
    done: bool,
}

impl<'a> BlockCursor<'a> {
    /// Cursor over a region that is not itself a block body
    pub fn top_level(data: &'a [u8], base_offset: usize) -> Self {
        BlockCursor {
            reader: PayloadReader::new(data),
            base_offset,
            done: false,
        }
    }

    /// Cursor over a block body, checking its END_BLOCK terminator
    pub fn block_body(block_id: u32, body: &'a [u8], base_offset: usize) -> FormatResult<Self> {
        match body.split_last() {
            Some((&entry_codes::END_BLOCK, inner)) => Ok(BlockCursor {
                reader: PayloadReader::new(inner),
                base_offset,
                done: false,
            }),
            _ => Err(FormatError::UnterminatedBlock {
                block_id,
                offset: base_offset + body.len(),
            }),
        }
    }

    fn absolute(&self, relative: usize) -> usize {
        self.base_offset + relative
    }

    fn read_entry(&mut self) -> FormatResult<Entry<'a>> {
        let code_offset = self.absolute(self.reader.position());
        let code = self.reader.read_u8()?;
        match code {
            entry_codes::ENTER_SUBBLOCK => {
                if self.reader.remaining() < SUBBLOCK_HEADER_LEN {
                    return Err(self.eof(SUBBLOCK_HEADER_LEN));
                }
                let block_id = self.reader.read_u32()?;
                let declared = self.reader.read_u32()? as usize;
                let available = self.reader.remaining();
                if declared > available {
                    return Err(FormatError::BlockOverrun {
                        block_id,
                        declared,
                        available,
                    });
                }
                let body_offset = self.absolute(self.reader.position());
                let body = self.reader.read_bytes(declared)?;
                Ok(Entry::SubBlock(SubBlock {
                    block_id,
                    body,
                    body_offset,
                }))
            }
            entry_codes::RECORD => {
                if self.reader.remaining() < RECORD_HEADER_LEN {
                    return Err(self.eof(RECORD_HEADER_LEN));
                }
                let kind = self.reader.read_u32()?;
                let field_count = self.reader.read_u16()? as usize;
                let blob_len = self.reader.read_u32()? as usize;
                let needed = field_count * 8 + blob_len;
                if self.reader.remaining() < needed {
                    return Err(self.eof(needed));
                }
                let mut fields = SmallVec::with_capacity(field_count);
                for _ in 0..field_count {
                    fields.push(self.reader.read_u64()?);
                }
                let blob_offset = self.absolute(self.reader.position());
                let blob = self.reader.read_bytes(blob_len)?;
                Ok(Entry::Record(Record {
                    kind,
                    fields,
                    blob,
                    offset: code_offset,
                    blob_offset,
                }))
            }
            code => Err(FormatError::InvalidEntryCode {
                code,
                offset: code_offset,
            }),
        }
    }

    fn eof(&self, needed: usize) -> FormatError {
        FormatError::UnexpectedEof {
            offset: self.absolute(self.reader.position()),
            needed: needed.saturating_sub(self.reader.remaining()),
        }
    }
}

impl<'a> Iterator for BlockCursor<'a> {
    type Item = FormatResult<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.is_at_end() {
            return None;
        }
        let entry = self.read_entry();
        if entry.is_err() {
            self.done = true;
        }
        Some(entry)
    }
}
