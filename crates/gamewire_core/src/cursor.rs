//! Sequential binary cursor over a growable byte buffer.
//!
//! All multi-byte values are big-endian. Writes are infallible (the
//! buffer grows); reads are bounds-checked and return
//! [`WireError::UnexpectedEof`] instead of panicking.

use crate::err::WireError;

/// Read/write cursor over a byte buffer.
///
/// A cursor is owned by exactly one marshalling call at a time;
/// concurrent callers each use their own instance.
#[derive(Debug, Default)]
pub struct ByteCursor {
    buf: Vec<u8>,
    pos: usize,
}

impl ByteCursor {
    /// Create an empty cursor for writing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cursor positioned at the start of existing bytes.
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            buf: bytes.into(),
            pos: 0,
        }
    }

    /// All bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the cursor, returning the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Total number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of unread bytes remaining.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the read position has reached the end of the buffer.
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, count: usize) -> Result<&[u8], WireError> {
        match self.remaining() {
            r if r >= count => {
                let view = &self.buf[self.pos..self.pos + count];
                self.pos += count;
                Ok(view)
            }
            remaining => Err(WireError::UnexpectedEof {
                needed: count,
                remaining,
            }),
        }
    }

    fn take_fixed<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let view = self.take(N)?;

        // take() returned exactly N bytes
        Ok(view.try_into().unwrap_or([0_u8; N]))
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn get_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take_fixed::<1>()?[0])
    }

    pub fn put_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn get_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.get_u8()? as i8)
    }

    pub fn put_i16(&mut self, v: i16) {
        self.buf.extend(v.to_be_bytes());
    }

    pub fn get_i16(&mut self) -> Result<i16, WireError> {
        Ok(i16::from_be_bytes(self.take_fixed()?))
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend(v.to_be_bytes());
    }

    pub fn get_i32(&mut self) -> Result<i32, WireError> {
        Ok(i32::from_be_bytes(self.take_fixed()?))
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend(v.to_be_bytes());
    }

    pub fn get_i64(&mut self) -> Result<i64, WireError> {
        Ok(i64::from_be_bytes(self.take_fixed()?))
    }

    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend(v.to_be_bytes());
    }

    pub fn get_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_be_bytes(self.take_fixed()?))
    }

    pub fn put_f64(&mut self, v: f64) {
        self.buf.extend(v.to_be_bytes());
    }

    pub fn get_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_be_bytes(self.take_fixed()?))
    }

    /// Write a string as a u32 length prefix followed by UTF-8 bytes.
    pub fn put_str(&mut self, v: &str) {
        let bytes = v.as_bytes();
        self.buf.extend((bytes.len() as u32).to_be_bytes());
        self.buf.extend(bytes);
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn get_str(&mut self) -> Result<String, WireError> {
        let len = u32::from_be_bytes(self.take_fixed()?) as usize;
        let bytes = self.take(len)?;

        std::str::from_utf8(bytes)
            .map(|s| s.to_owned())
            .map_err(|_| WireError::InvalidUtf8)
    }

    /// Write raw bytes with no prefix. The caller tracks the length.
    pub fn put_bytes(&mut self, v: &[u8]) {
        self.buf.extend(v);
    }

    /// Read `count` raw bytes.
    pub fn get_bytes(&mut self, count: usize) -> Result<&[u8], WireError> {
        self.take(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip() {
        let mut cursor = ByteCursor::new();
        cursor.put_u8(0xAB);
        cursor.put_i16(-2);
        cursor.put_i32(100_000);
        cursor.put_i64(i64::MIN);
        cursor.put_f64(2.5);

        assert_eq!(cursor.get_u8().unwrap(), 0xAB);
        assert_eq!(cursor.get_i16().unwrap(), -2);
        assert_eq!(cursor.get_i32().unwrap(), 100_000);
        assert_eq!(cursor.get_i64().unwrap(), i64::MIN);
        assert_eq!(cursor.get_f64().unwrap(), 2.5);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_string_roundtrip() {
        let mut cursor = ByteCursor::new();
        cursor.put_str("how about that 👏👏👏");

        assert_eq!(cursor.get_str().unwrap(), "how about that 👏👏👏");
    }

    #[test]
    fn test_big_endian_layout() {
        let mut cursor = ByteCursor::new();
        cursor.put_i32(3);

        assert_eq!(cursor.as_slice(), &[0, 0, 0, 3]);
    }

    /// Reads past the end of the buffer must error, not panic.
    #[test]
    fn test_eof() {
        let mut cursor = ByteCursor::from_bytes(vec![1, 2]);

        assert!(matches!(
            cursor.get_i32(),
            Err(WireError::UnexpectedEof {
                needed: 4,
                remaining: 2
            })
        ));
    }
}
