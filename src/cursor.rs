//! Big-endian reader over an in-memory byte buffer.
//!
//! Used both for walking the structure of a class file and for streaming the
//! instructions of a single method body.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::errors::OutOfRange;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    rdr: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor {
            rdr: Cursor::new(bytes),
        }
    }

    pub fn position(&self) -> usize {
        self.rdr.position() as usize
    }

    pub fn len(&self) -> usize {
        self.rdr.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn out_of_range(&self, requested: usize) -> OutOfRange {
        OutOfRange {
            position: self.position(),
            requested,
            len: self.len(),
        }
    }

    fn ensure(&self, requested: usize) -> Result<(), OutOfRange> {
        if requested > self.remaining() {
            return Err(self.out_of_range(requested));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, OutOfRange> {
        self.ensure(1)?;
        self.rdr.read_u8().map_err(|_| self.out_of_range(1))
    }

    pub fn read_i8(&mut self) -> Result<i8, OutOfRange> {
        self.ensure(1)?;
        self.rdr.read_i8().map_err(|_| self.out_of_range(1))
    }

    pub fn read_u16(&mut self) -> Result<u16, OutOfRange> {
        self.ensure(2)?;
        self.rdr
            .read_u16::<BigEndian>()
            .map_err(|_| self.out_of_range(2))
    }

    pub fn read_i16(&mut self) -> Result<i16, OutOfRange> {
        self.ensure(2)?;
        self.rdr
            .read_i16::<BigEndian>()
            .map_err(|_| self.out_of_range(2))
    }

    pub fn read_u32(&mut self) -> Result<u32, OutOfRange> {
        self.ensure(4)?;
        self.rdr
            .read_u32::<BigEndian>()
            .map_err(|_| self.out_of_range(4))
    }

    /// Borrow the next `n` bytes and step over them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], OutOfRange> {
        self.ensure(n)?;
        let start = self.position();
        let bytes: &'a [u8] = *self.rdr.get_ref();
        self.rdr.set_position((start + n) as u64);
        Ok(&bytes[start..start + n])
    }

    pub fn skip(&mut self, n: usize) -> Result<(), OutOfRange> {
        self.ensure(n)?;
        self.rdr.set_position((self.position() + n) as u64);
        Ok(())
    }

    /// Move to an absolute position. The end of the buffer is a valid target,
    /// but any read from there fails.
    pub fn seek(&mut self, position: usize) -> Result<(), OutOfRange> {
        if position > self.len() {
            return Err(OutOfRange {
                position,
                requested: 0,
                len: self.len(),
            });
        }
        self.rdr.set_position(position as u64);
        Ok(())
    }
}
