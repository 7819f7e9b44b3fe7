//! Little-endian byte cursors for payload encoding
//!
//! `PayloadWriter` appends fixed-width integers and length-prefixed strings
//! to a buffer; `PayloadReader` reads them back with bounds checking, so a
//! truncated payload surfaces as `FormatError::UnexpectedEof` rather than a
//! panic.

use apinotes_core::{EncodeError, EncodeResult, FormatError, FormatResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::constants::MAX_STRING_LEN;

/// Append-only little-endian writer
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        PayloadWriter { buf: Vec::new() }
    }

    /// Create a writer that appends to an existing buffer
    pub fn from_vec(buf: Vec<u8>) -> Self {
        PayloadWriter { buf }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Written bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning its buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Write one byte
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a little-endian u16
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a little-endian u32
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a little-endian u64
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Overwrite a previously written u32 at `offset`
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Pad with zeros until the length is a multiple of `align`
    pub fn align_to(&mut self, align: usize) {
        while self.buf.len() % align != 0 {
            self.buf.push(0);
        }
    }

    /// Write `u16 length + bytes`
    pub fn put_string(&mut self, field: &'static str, value: &str) -> EncodeResult<()> {
        let len = checked_len(field, value.len(), MAX_STRING_LEN)?;
        self.put_u16(len);
        self.put_bytes(value.as_bytes());
        Ok(())
    }

    /// Write an optional string as `u16 (length + 1) + bytes`, 0 meaning absent
    pub fn put_optional_string(
        &mut self,
        field: &'static str,
        value: Option<&str>,
    ) -> EncodeResult<()> {
        match value {
            None => self.put_u16(0),
            Some(value) => {
                let len = checked_len(field, value.len(), MAX_STRING_LEN - 1)?;
                self.put_u16(len + 1);
                self.put_bytes(value.as_bytes());
            }
        }
        Ok(())
    }
}

fn checked_len(field: &'static str, len: usize, max: usize) -> EncodeResult<u16> {
    if len > max {
        return Err(EncodeError::StringTooLong { field, len, max });
    }
    Ok(len as u16)
}

/// Bounds-checked little-endian reader over a byte slice
#[derive(Debug)]
pub struct PayloadReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> PayloadReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        PayloadReader {
            cursor: Cursor::new(data),
        }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    /// Whether all bytes have been consumed
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn eof(&self, needed: usize) -> FormatError {
        FormatError::UnexpectedEof {
            offset: self.position(),
            needed: needed.saturating_sub(self.remaining()),
        }
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> FormatResult<u8> {
        if self.remaining() < 1 {
            return Err(self.eof(1));
        }
        self.cursor.read_u8().map_err(|_| self.eof(1))
    }

    /// Read a little-endian u16
    pub fn read_u16(&mut self) -> FormatResult<u16> {
        if self.remaining() < 2 {
            return Err(self.eof(2));
        }
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.eof(2))
    }

    /// Read a little-endian u32
    pub fn read_u32(&mut self) -> FormatResult<u32> {
        if self.remaining() < 4 {
            return Err(self.eof(4));
        }
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.eof(4))
    }

    /// Read a little-endian u64
    pub fn read_u64(&mut self) -> FormatResult<u64> {
        if self.remaining() < 8 {
            return Err(self.eof(8));
        }
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| self.eof(8))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.eof(len));
        }
        let start = self.position();
        let data: &'a [u8] = self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// Read `u16 length + UTF-8 bytes`
    pub fn read_string(&mut self) -> FormatResult<String> {
        let len = self.read_u16()? as usize;
        self.read_utf8(len)
    }

    /// Read `u16 (length + 1) + UTF-8 bytes`, 0 meaning absent
    pub fn read_optional_string(&mut self) -> FormatResult<Option<String>> {
        match self.read_u16()? as usize {
            0 => Ok(None),
            len => self.read_utf8(len - 1).map(Some),
        }
    }

    fn read_utf8(&mut self, len: usize) -> FormatResult<String> {
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| FormatError::InvalidUtf8)
    }

    /// Fail unless every byte has been consumed
    pub fn finish(&self) -> FormatResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(FormatError::TrailingData { remaining }),
        }
    }
}
