//! Binary stream codec shared by the legacy and migrated entity files.
//!
//! # Encoding
//!
//! All numbers are little-endian and fixed width:
//!
//! | Type      | Width | Rust type |
//! |-----------|-------|-----------|
//! | `int`     | 8     | `i64`     |
//! | `int32`   | 4     | `i32`     |
//! | `float32` | 4     | `f32`     |
//! | `text`    | 8 + n | `String`  |
//!
//! Text is an `int` byte length followed by that many UTF-8 bytes, with no
//! terminator. Any short read is fatal; nothing attempts to resynchronise a
//! malformed stream.

mod int_set;

use std::io::{self, Read, Write};

pub use int_set::IntSet;

use crate::error::{CodecError, CodecResult};

/// Decodes primitives from an underlying byte stream.
pub struct StreamReader<R> {
    inner: R,
}

impl<R: Read> StreamReader<R> {
    /// Wraps `inner`. Buffering is left to the caller.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> CodecResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => CodecError::Truncated {
                field,
                expected: N as u64,
            },
            _ => CodecError::Io(e),
        })?;
        Ok(buf)
    }

    /// Reads an 8-byte `int`.
    pub fn get_int(&mut self) -> CodecResult<i64> {
        Ok(i64::from_le_bytes(self.read_array("int")?))
    }

    /// Reads a 4-byte `int32`.
    pub fn get_int32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_le_bytes(self.read_array("int32")?))
    }

    /// Reads a 4-byte IEEE-754 `float32`.
    pub fn get_float32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_le_bytes(self.read_array("float32")?))
    }

    /// Reads length-prefixed UTF-8 text.
    ///
    /// The payload is pulled through a bounded `take`, so a corrupt length
    /// prefix fails with [`CodecError::LengthPastEnd`] instead of allocating
    /// the declared size up front.
    pub fn get_string(&mut self) -> CodecResult<String> {
        let declared = self.get_int()?;
        let len = u64::try_from(declared).map_err(|_| CodecError::NegativeLength {
            field: "text length",
            value: declared,
        })?;

        let mut bytes = Vec::new();
        let available = (&mut self.inner).take(len).read_to_end(&mut bytes)? as u64;
        if available < len {
            return Err(CodecError::LengthPastEnd {
                declared: len,
                available,
            });
        }

        Ok(String::from_utf8(bytes)?)
    }

    /// Reads an `int` element count.
    pub fn get_count(&mut self, field: &'static str) -> CodecResult<usize> {
        let value = self.get_int()?;
        usize::try_from(value).map_err(|_| CodecError::NegativeLength { field, value })
    }

    /// Reads an `int32` element count.
    pub fn get_count32(&mut self, field: &'static str) -> CodecResult<usize> {
        let value = self.get_int32()?;
        usize::try_from(value).map_err(|_| CodecError::NegativeLength {
            field,
            value: value.into(),
        })
    }
}

/// Encodes primitives onto an underlying byte stream.
pub struct StreamWriter<W> {
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    /// Wraps `inner`. Buffering is left to the caller.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwraps the writer without flushing it.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes an 8-byte `int`.
    pub fn put_int(&mut self, value: i64) -> CodecResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Writes a 4-byte `int32`.
    pub fn put_int32(&mut self, value: i32) -> CodecResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Writes a 4-byte IEEE-754 `float32`.
    pub fn put_float32(&mut self, value: f32) -> CodecResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Writes `value` as an `int` byte length followed by its UTF-8 bytes.
    pub fn put_string(&mut self, value: &str) -> CodecResult<()> {
        self.put_count(value.len(), "text length")?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Writes an element count as an `int`.
    pub fn put_count(&mut self, count: usize, field: &'static str) -> CodecResult<()> {
        let value = i64::try_from(count).map_err(|_| CodecError::Overflow { field, value: count })?;
        self.put_int(value)
    }

    /// Writes an element count as an `int32`.
    pub fn put_count32(&mut self, count: usize, field: &'static str) -> CodecResult<()> {
        let value = i32::try_from(count).map_err(|_| CodecError::Overflow { field, value: count })?;
        self.put_int32(value)
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_primitive_layout_is_little_endian() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_int(1).unwrap();
        out.put_int32(-2).unwrap();
        out.put_float32(1.5).unwrap();
        out.put_string("ab").unwrap();
        let bytes = out.into_inner();

        let mut expected = vec![1, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(&[0xFE, 0xFF, 0xFF, 0xFF]);
        expected.extend_from_slice(&1.5f32.to_le_bytes());
        expected.extend_from_slice(&[2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b']);
        assert_eq!(bytes, expected);

        let mut input = StreamReader::new(Cursor::new(bytes));
        assert_eq!(input.get_int().unwrap(), 1);
        assert_eq!(input.get_int32().unwrap(), -2);
        assert_eq!(input.get_float32().unwrap(), 1.5);
        assert_eq!(input.get_string().unwrap(), "ab");
    }

    #[test]
    fn test_empty_string_has_no_payload() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_string("").unwrap();
        assert_eq!(out.into_inner(), vec![0; 8]);
    }

    #[test]
    fn test_short_read_is_truncated() {
        let mut input = StreamReader::new(Cursor::new(vec![1u8, 2, 3]));
        let result = input.get_int();
        assert!(matches!(
            result,
            Err(CodecError::Truncated {
                field: "int",
                expected: 8
            })
        ));
    }

    #[test]
    fn test_length_prefix_past_end() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_int(100).unwrap();
        let mut bytes = out.into_inner();
        bytes.extend_from_slice(b"short");

        let mut input = StreamReader::new(Cursor::new(bytes));
        let result = input.get_string();
        assert!(matches!(
            result,
            Err(CodecError::LengthPastEnd {
                declared: 100,
                available: 5
            })
        ));
    }

    #[test]
    fn test_negative_length_prefix() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_int(-1).unwrap();

        let mut input = StreamReader::new(Cursor::new(out.into_inner()));
        assert!(matches!(
            input.get_string(),
            Err(CodecError::NegativeLength { value: -1, .. })
        ));
    }

    #[test]
    fn test_negative_count32() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_int32(-7).unwrap();

        let mut input = StreamReader::new(Cursor::new(out.into_inner()));
        assert!(matches!(
            input.get_count32("related count"),
            Err(CodecError::NegativeLength {
                field: "related count",
                value: -7
            })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut out = StreamWriter::new(Vec::new());
        out.put_int(2).unwrap();
        let mut bytes = out.into_inner();
        bytes.extend_from_slice(&[0xC3, 0x28]);

        let mut input = StreamReader::new(Cursor::new(bytes));
        assert!(matches!(input.get_string(), Err(CodecError::InvalidUtf8(_))));
    }
}
