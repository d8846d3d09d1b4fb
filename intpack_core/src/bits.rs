//! Bit-level writer and reader over byte buffers.
//!
//! Bits are packed MSB-first within each byte. The writer works over a
//! buffer allocated once up front by the calling codec (sized with generous
//! fixed slack); running out of room is a typed [`BufferOverflow`] error,
//! never a silent truncation. The final partial byte is zero-padded when the
//! buffer is sealed with [`BitWriter::into_bytes`].
//!
//! [`BufferOverflow`]: CodecError::BufferOverflow

use crate::error::{CodecError, Result};

/// MSB-first bit writer over a fixed-capacity byte buffer.
pub struct BitWriter {
    buf: Vec<u8>,
    /// Bit cursor: total bits written so far.
    pos: usize,
}

impl BitWriter {
    /// Allocate a zeroed buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
            pos: 0,
        }
    }

    #[inline]
    fn capacity_bits(&self) -> usize {
        self.buf.len() * 8
    }

    #[inline]
    fn check_room(&self, bits: usize) -> Result<()> {
        let needed = self.pos + bits;
        if needed > self.capacity_bits() {
            return Err(CodecError::BufferOverflow {
                needed,
                capacity: self.capacity_bits(),
            });
        }
        Ok(())
    }

    /// Write the low `width` bits of `value`, most significant first.
    ///
    /// `width` must be ≤ 32; bits of `value` above `width` must be zero.
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<()> {
        debug_assert!(width <= 32);
        debug_assert!(width == 32 || value >> width == 0);
        self.check_room(width as usize)?;
        for i in (0..width).rev() {
            if (value >> i) & 1 != 0 {
                self.buf[self.pos / 8] |= 0x80 >> (self.pos % 8);
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Write `n` in unary: `n` zero bits followed by a terminating one bit.
    pub fn write_unary(&mut self, n: u32) -> Result<()> {
        self.check_room(n as usize + 1)?;
        // The buffer starts zeroed and is write-once, so the zero run is
        // just a cursor advance.
        self.pos += n as usize;
        self.buf[self.pos / 8] |= 0x80 >> (self.pos % 8);
        self.pos += 1;
        Ok(())
    }

    /// Total bits written so far.
    pub fn bits_written(&self) -> usize {
        self.pos
    }

    /// Seal the stream: truncate to the exact byte count, rounding the
    /// final partial byte up (its trailing bits stay zero).
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.pos.div_ceil(8));
        self.buf
    }
}

/// MSB-first bit reader over a byte slice.
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn remaining_bits(&self) -> usize {
        self.buf.len() * 8 - self.pos
    }

    /// Read `width` bits (≤ 32), most significant first.
    pub fn read_bits(&mut self, width: u32) -> Result<u32> {
        debug_assert!(width <= 32);
        if (width as usize) > self.remaining_bits() {
            return Err(CodecError::UnexpectedEof { pos: self.pos });
        }
        let mut value = 0u32;
        for _ in 0..width {
            let bit = (self.buf[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.pos += 1;
        }
        Ok(value)
    }

    /// Read a unary code: count zero bits up to the terminating one bit.
    pub fn read_unary(&mut self) -> Result<u32> {
        let mut zeros = 0u32;
        loop {
            if self.remaining_bits() == 0 {
                return Err(CodecError::UnexpectedEof { pos: self.pos });
            }
            let bit = (self.buf[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            self.pos += 1;
            if bit != 0 {
                return Ok(zeros);
            }
            zeros += 1;
        }
    }

    /// Total bits consumed so far.
    pub fn bits_read(&self) -> usize {
        self.pos
    }
}
