//! Position-tracking reader over a byte buffer
//!
//! Every read consumes the cursor and returns `(value, next)`. A cursor is a
//! plain `Copy` value, so a failed read leaves the caller's cursor untouched.

use crate::error::ParseError;
use crate::types::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes in `[from, self.offset)`.
    pub fn consumed_since(&self, from: usize) -> &'a [u8] {
        &self.buffer[from.min(self.offset)..self.offset]
    }

    pub fn read_slice(self, len: usize) -> Result<(&'a [u8], Self), ParseError> {
        if len > self.remaining() {
            return Err(ParseError::UnexpectedEof {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let end = self.offset + len;
        Ok((
            &self.buffer[self.offset..end],
            Self {
                buffer: self.buffer,
                offset: end,
            },
        ))
    }

    fn read_array<const N: usize>(self) -> Result<([u8; N], Self), ParseError> {
        let (bytes, next) = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok((out, next))
    }

    pub fn read_u8(self) -> Result<(u8, Self), ParseError> {
        let (bytes, next) = self.read_array::<1>()?;
        Ok((bytes[0], next))
    }

    pub fn read_u16(self) -> Result<(u16, Self), ParseError> {
        let (bytes, next) = self.read_array::<2>()?;
        Ok((u16::from_le_bytes(bytes), next))
    }

    pub fn read_u32(self) -> Result<(u32, Self), ParseError> {
        let (bytes, next) = self.read_array::<4>()?;
        Ok((u32::from_le_bytes(bytes), next))
    }

    pub fn read_u64(self) -> Result<(u64, Self), ParseError> {
        let (bytes, next) = self.read_array::<8>()?;
        Ok((u64::from_le_bytes(bytes), next))
    }

    /// 32 bytes, kept in wire order.
    pub fn read_hash(self) -> Result<(Hash, Self), ParseError> {
        self.read_array::<32>()
    }

    /// CompactSize: `< 0xfd` is the value itself, `0xfd`/`0xfe`/`0xff` prefix a
    /// 2/4/8-byte little-endian value. Only the shortest encoding is accepted.
    pub fn read_varint(self) -> Result<(u64, Self), ParseError> {
        let start = self.offset;
        let (prefix, next) = self.read_u8()?;
        let (value, next, min) = match prefix {
            0xfd => {
                let (v, next) = next.read_u16()?;
                (v as u64, next, 0xfd)
            }
            0xfe => {
                let (v, next) = next.read_u32()?;
                (v as u64, next, 0x1_0000)
            }
            0xff => {
                let (v, next) = next.read_u64()?;
                (v, next, 0x1_0000_0000)
            }
            n => return Ok((n as u64, next)),
        };
        if value < min {
            return Err(ParseError::NonCanonicalVarint { offset: start });
        }
        Ok((value, next))
    }

    /// A CompactSize length followed by that many bytes; `limit` bounds the length.
    pub fn read_varslice(
        self,
        what: &'static str,
        limit: usize,
    ) -> Result<(&'a [u8], Self), ParseError> {
        let (len, next) = self.read_varint()?;
        if len > limit as u64 {
            return Err(ParseError::LimitExceeded {
                what,
                count: len,
                limit: limit as u64,
            });
        }
        next.read_slice(len as usize)
    }
}

/// Append a value in canonical CompactSize form.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Append a CompactSize length prefix and the bytes.
pub fn write_varslice(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}
