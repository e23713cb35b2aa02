//! Low-level positioned reads over a borrowed byte buffer.
//!
//! Both container formats are little-endian throughout. Short reads surface
//! as [`Error::Truncated`] rather than a raw `io::Error` so the PAK version
//! probe can tell a wrong-version layout apart from a real I/O failure.

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_16LE;

use crate::error::{Error, Result};

/// Sentinel meaning "no value" in 32-bit index fields.
pub const NONE_INDEX: u32 = 0xFFFF_FFFF;

/// A cursor tracking an offset into a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Consume `len` bytes and return them as a sub-slice.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Advance past `len` bytes without looking at them.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Copy the next `out.len()` bytes into a caller-supplied destination.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let slice = self.take(out.len())?;
        out.copy_from_slice(slice);
        Ok(())
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_u128(&mut self) -> Result<u128> {
        Ok(LittleEndian::read_u128(self.take(16)?))
    }

    /// Read `width` bytes (1..=8) into a zero-extended u64.
    ///
    /// Used for the 40-bit and 24-bit sub-fields of the UTOC chunk records.
    pub fn read_packed_u64(&mut self, width: usize) -> Result<u64> {
        Ok(LittleEndian::read_uint(self.take(width)?, width))
    }

    /// Read a strict boolean byte: anything but 0 or 1 is invalid.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(Error::InvalidRecord(format!(
                "invalid boolean byte: {value}"
            ))),
        }
    }

    /// Read a 32-bit index where `0xFFFFFFFF` means "absent".
    pub fn read_optional_index(&mut self) -> Result<Option<u32>> {
        match self.read_u32()? {
            NONE_INDEX => Ok(None),
            value => Ok(Some(value)),
        }
    }

    /// Read an engine string.
    ///
    /// Wire format: a signed 32-bit length `L`.
    /// - `L == 0`: empty string.
    /// - `L > 0`: `L` bytes of UTF-8/ASCII, NUL terminator included in `L`.
    /// - `L < 0`: `|L|` UTF-16LE code units, zero code unit terminates.
    ///
    /// The terminator is stripped; the declared length is always consumed.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > 0 {
            let bytes = self.take(len as usize)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
        } else {
            let units = len.unsigned_abs() as usize;
            let bytes = self.take(units * 2)?;
            let mut end = bytes.len();
            for (i, unit) in bytes.chunks_exact(2).enumerate() {
                if unit == [0, 0] {
                    end = i * 2;
                    break;
                }
            }
            let (text, _, _) = UTF_16LE.decode(&bytes[..end]);
            Ok(text.into_owned())
        }
    }
}
