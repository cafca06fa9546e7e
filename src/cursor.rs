//! Bounds-checked byte cursor.
//!
//! Every read in the decoder goes through [`ByteCursor`], so a short
//! buffer always surfaces as [`Rg16Error::OutOfBounds`] with the offset of
//! the failed read.

use crate::codec;
use crate::types::ByteOrder;
use crate::{Rg16Error, Result};

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    byte_order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at offset 0 that reads multi-byte fields in
    /// `byte_order`.
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            data,
            pos: 0,
            byte_order,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Move to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Rg16Error::OutOfBounds {
                offset,
                requested: 0,
                available: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Return the next `n` bytes and advance past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(Rg16Error::OutOfBounds {
                offset: self.pos,
                requested: n,
                available,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(codec::u16_at(self.read(2)?, self.byte_order))
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        Ok(codec::u24_at(self.read(3)?, self.byte_order))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(codec::u32_at(self.read(4)?, self.byte_order))
    }

    /// Read `n` bytes of packed BCD. The outer `Result` reports truncation,
    /// the inner `Option` an invalid digit.
    pub fn read_bcd(&mut self, n: usize) -> Result<Option<u32>> {
        Ok(codec::bcd(self.read(n)?))
    }

    /// Read `n` bytes at an absolute offset without moving the cursor.
    pub fn peek_at(&self, offset: usize, n: usize) -> Result<&'a [u8]> {
        let available = self.data.len().saturating_sub(offset);
        if n > available {
            return Err(Rg16Error::OutOfBounds {
                offset,
                requested: n,
                available,
            });
        }
        Ok(&self.data[offset..offset + n])
    }
}
