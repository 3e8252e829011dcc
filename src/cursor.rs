//! Bounds-checked big-endian field access
//!
//! `FieldCursor` is the only place offset arithmetic happens. A new cursor is
//! created for every frame and every sub-package, so no position survives
//! across decode calls.

use crate::error::DecodeError;

/// Sequential reader over an immutable byte slice
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take `len` bytes and advance past them
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::InsufficientBytes {
                needed: len,
                remaining: self.remaining(),
                offset: self.offset,
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Take every remaining byte
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.offset..];
        self.offset = self.data.len();
        slice
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_be_bytes(self.array()?))
    }

    /// One byte, nonzero is true
    pub fn bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.u8()? != 0)
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_be_bytes(self.array()?))
    }

    pub fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    /// Six consecutive doubles, the layout of every pose and per-joint vector
    pub fn f64x6(&mut self) -> Result<[f64; 6], DecodeError> {
        let mut out = [0.0; 6];
        for value in out.iter_mut() {
            *value = self.f64()?;
        }
        Ok(out)
    }

    /// String with a one-byte length prefix
    pub fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.u8()? as usize;
        let start = self.offset;
        let raw = self.bytes(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidString { offset: start })
    }
}

/// Big-endian writer mirroring `FieldCursor`, used to build wire bytes
#[derive(Debug, Default, Clone)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes(&[value])
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u8(value as u8)
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.bytes(&value.to_be_bytes())
    }

    pub fn f64x6(&mut self, values: &[f64; 6]) -> &mut Self {
        for value in values {
            self.f64(*value);
        }
        self
    }

    /// Titles longer than 255 bytes are cut to fit the one-byte prefix
    pub fn string(&mut self, value: &str) -> &mut Self {
        let raw = value.as_bytes();
        let len = raw.len().min(u8::MAX as usize);
        self.u8(len as u8);
        self.bytes(&raw[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_big_endian() {
        let data = [0x12, 0x34, 0x56, 0x78, 0xFF, 0xFE];
        let mut cursor = FieldCursor::new(&data);
        assert_eq!(cursor.u32().unwrap(), 0x12345678);
        assert_eq!(cursor.i16().unwrap(), -2);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let data = [0, 1, 7];
        let mut cursor = FieldCursor::new(&data);
        assert!(!cursor.bool().unwrap());
        assert!(cursor.bool().unwrap());
        assert!(cursor.bool().unwrap());
    }

    #[test]
    fn test_overrun_fails_without_advancing() {
        let data = [0u8; 5];
        let mut cursor = FieldCursor::new(&data);
        cursor.u8().unwrap();
        let err = cursor.f64().unwrap_err();
        assert_eq!(err, DecodeError::InsufficientBytes { needed: 8, remaining: 4, offset: 1 });
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.u32().unwrap(), 0);
    }

    #[test]
    fn test_length_prefixed_string() {
        let data = [6, b'S', b'a', b'f', b'e', b't', b'y', b'!'];
        let mut cursor = FieldCursor::new(&data);
        assert_eq!(cursor.string().unwrap(), "Safety");
        assert_eq!(cursor.remaining(), 1);

        // prefix claims more than is available
        let data = [10, b'a', b'b'];
        let mut cursor = FieldCursor::new(&data);
        assert!(matches!(
            cursor.string(),
            Err(DecodeError::InsufficientBytes { needed: 10, remaining: 2, offset: 1 })
        ));
    }

    #[test]
    fn test_invalid_utf8_string() {
        let data = [2, 0xC3, 0x28];
        let mut cursor = FieldCursor::new(&data);
        assert_eq!(cursor.string(), Err(DecodeError::InvalidString { offset: 1 }));
    }

    #[test]
    fn test_writer_matches_cursor() {
        let mut writer = FieldWriter::new();
        writer.u64(1234567890123456).i8(-1).f32(1.5).string("Hi").f64(0.8);
        let bytes = writer.into_bytes();

        let mut cursor = FieldCursor::new(&bytes);
        assert_eq!(cursor.u64().unwrap(), 1234567890123456);
        assert_eq!(cursor.i8().unwrap(), -1);
        assert_eq!(cursor.f32().unwrap(), 1.5);
        assert_eq!(cursor.string().unwrap(), "Hi");
        assert_eq!(cursor.f64().unwrap(), 0.8);
        assert!(cursor.is_empty());
    }
}
