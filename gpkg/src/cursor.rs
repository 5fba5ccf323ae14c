use crate::result::{Error, ErrorKind, Result, Stage};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of multi-byte values, as declared by the WKB byte order byte
/// or bit 0 of the GeoPackage flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

impl Endianness {
    /// The WKB byte order byte for this order
    pub fn wkb_byte(self) -> u8 {
        match self {
            Endianness::Big => 0,
            Endianness::Little => 1,
        }
    }

    pub fn from_wkb_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Endianness::Big),
            1 => Some(Endianness::Little),
            _ => None,
        }
    }
}

/// Sequential, bounds-checked reader over a byte slice.
///
/// Errors raised by a read report the cursor position at the start of that
/// read together with the stage last set with [ByteCursor::set_stage].
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    stage: Stage,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor {
            buf,
            pos: 0,
            stage: Stage::Header,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Builds an error located at `offset` in the current stage.
    pub(crate) fn error_at(&self, offset: usize, kind: ErrorKind) -> Error {
        Error::decode(self.stage, offset, kind)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(self.error_at(
                self.pos,
                ErrorKind::TruncatedInput {
                    needed: n,
                    remaining,
                },
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u32(&mut self, order: Endianness) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_u32(bytes),
            Endianness::Little => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&mut self, order: Endianness) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_i32(bytes),
            Endianness::Little => LittleEndian::read_i32(bytes),
        })
    }

    pub fn read_f64(&mut self, order: Endianness) -> Result<f64> {
        let bytes = self.read_bytes(8)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_f64(bytes),
            Endianness::Little => LittleEndian::read_f64(bytes),
        })
    }
}

/// Append-only writer, the encoding counterpart of [ByteCursor].
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, order: Endianness, value: u32) {
        let mut bytes = [0u8; 4];
        match order {
            Endianness::Big => BigEndian::write_u32(&mut bytes, value),
            Endianness::Little => LittleEndian::write_u32(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_i32(&mut self, order: Endianness, value: i32) {
        let mut bytes = [0u8; 4];
        match order {
            Endianness::Big => BigEndian::write_i32(&mut bytes, value),
            Endianness::Little => LittleEndian::write_i32(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_f64(&mut self, order: Endianness, value: f64) {
        let mut bytes = [0u8; 8];
        match order {
            Endianness::Big => BigEndian::write_f64(&mut bytes, value),
            Endianness::Little => LittleEndian::write_f64(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
