//! Append-only blob output and the ECMA-335 compressed encodings.
//!
//! Signatures are written into an append-only byte sink. The sink knows how to pack the three
//! variable-width encodings used throughout signature blobs (ECMA-335 §II.23.2):
//!
//! - **Compressed unsigned integers** - 1, 2 or 4 bytes, big-endian, length in the high bits
//! - **Compressed signed integers** - same widths, with the sign rotated into the lowest bit
//! - **`TypeDefOrRef` coded indices** - a token folded into `(rid << 2) | tag`, then compressed
//!
//! | Range                       | Bytes | Pattern                               |
//! |-----------------------------|-------|---------------------------------------|
//! | `0x00 ..= 0x7F`             | 1     | `0bbbbbbb`                            |
//! | `0x80 ..= 0x3FFF`           | 2     | `10bbbbbb bbbbbbbb`                   |
//! | `0x4000 ..= 0x1FFF_FFFF`    | 4     | `110bbbbb bbbbbbbb bbbbbbbb bbbbbbbb` |
//!
//! # Examples
//!
//! ```rust
//! use cilsig::utils::BlobSink;
//!
//! let mut blob = Vec::new();
//! blob.write_compressed_uint(0x80)?;
//! blob.write_compressed_int(-3)?;
//! assert_eq!(blob, vec![0x80, 0x80, 0x7B]);
//! # Ok::<(), cilsig::Error>(())
//! ```

use crate::{metadata::token::Token, Error, Result};

/// Largest value representable as a compressed unsigned integer
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Smallest value representable as a compressed signed integer
pub const MIN_COMPRESSED_INT: i32 = -(1 << 28);

/// Largest value representable as a compressed signed integer
pub const MAX_COMPRESSED_INT: i32 = (1 << 28) - 1;

/// An append-only output for signature blobs.
///
/// Implementors only provide [`BlobSink::write_byte`]; the compressed encodings are derived from
/// it. The encoders never read back or rewind a sink, so a failure half-way through a signature
/// leaves the already-appended bytes in place. Callers that share one sink between several
/// signatures must buffer per signature if they need to discard a failed one atomically.
pub trait BlobSink {
    /// Appends a single raw byte.
    fn write_byte(&mut self, value: u8);

    /// Appends raw bytes in order.
    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    /// Appends a compressed unsigned integer (ECMA-335 §II.23.2).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ValueTooLarge`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
    fn write_compressed_uint(&mut self, value: u32) -> Result<()> {
        if value <= 0x7F {
            #[allow(clippy::cast_possible_truncation)]
            let encoded = value as u8;
            self.write_byte(encoded);
        } else if value <= 0x3FFF {
            #[allow(clippy::cast_possible_truncation)]
            let encoded = (0x8000 | value) as u16;
            self.write_bytes(&encoded.to_be_bytes());
        } else if value <= MAX_COMPRESSED_UINT {
            self.write_bytes(&(0xC000_0000 | value).to_be_bytes());
        } else {
            return Err(Error::ValueTooLarge(i64::from(value)));
        }
        Ok(())
    }

    /// Appends a compressed signed integer (ECMA-335 §II.23.2).
    ///
    /// The value is truncated to 7, 14 or 29 bits in two's complement and rotated left by one, so
    /// the sign ends up in the lowest bit. The width is picked from the signed range, not from the
    /// rotated result: `-8192` is written as `0x80 0x01` even though `0x01` alone would fit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ValueTooLarge`] if `value` lies outside
    /// [`MIN_COMPRESSED_INT`]`..=`[`MAX_COMPRESSED_INT`].
    fn write_compressed_int(&mut self, value: i32) -> Result<()> {
        let sign = u32::from(value < 0);
        #[allow(clippy::cast_sign_loss)]
        let bits = value as u32;

        if (-(1 << 6)..(1 << 6)).contains(&value) {
            #[allow(clippy::cast_possible_truncation)]
            let encoded = (((bits & 0x3F) << 1) | sign) as u8;
            self.write_byte(encoded);
        } else if (-(1 << 13)..(1 << 13)).contains(&value) {
            #[allow(clippy::cast_possible_truncation)]
            let encoded = (0x8000 | ((bits & 0x1FFF) << 1) | sign) as u16;
            self.write_bytes(&encoded.to_be_bytes());
        } else if (MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT).contains(&value) {
            let encoded = 0xC000_0000 | ((bits & 0x0FFF_FFFF) << 1) | sign;
            self.write_bytes(&encoded.to_be_bytes());
        } else {
            return Err(Error::ValueTooLarge(i64::from(value)));
        }
        Ok(())
    }

    /// Appends a token as a compressed `TypeDefOrRef` coded index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidToken`] if the token is not from the `TypeDef`, `TypeRef` or
    /// `TypeSpec` table, or [`crate::Error::ValueTooLarge`] if the coded row does not fit.
    fn write_type_def_or_ref(&mut self, token: Token) -> Result<()> {
        let coded_index = token.type_def_or_ref_index()?;
        self.write_compressed_uint(coded_index)
    }
}

impl BlobSink for Vec<u8> {
    fn write_byte(&mut self, value: u8) {
        self.push(value);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Writes a compressed unsigned integer into `buffer`.
///
/// Convenience wrapper around [`BlobSink::write_compressed_uint`] for plain byte vectors.
///
/// # Errors
///
/// Returns [`crate::Error::ValueTooLarge`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.write_compressed_uint(value)
}

/// Writes a compressed signed integer into `buffer`.
///
/// # Errors
///
/// Returns [`crate::Error::ValueTooLarge`] if `value` is outside the 29-bit signed range.
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.write_compressed_int(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(value: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_compressed_uint(value, &mut buffer).unwrap();
        buffer
    }

    fn int(value: i32) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_compressed_int(value, &mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_compressed_uint_vectors() {
        // Reference values from ECMA-335 §II.23.2
        assert_eq!(uint(0x03), vec![0x03]);
        assert_eq!(uint(0x7F), vec![0x7F]);
        assert_eq!(uint(0x80), vec![0x80, 0x80]);
        assert_eq!(uint(0x2E57), vec![0xAE, 0x57]);
        assert_eq!(uint(0x3FFF), vec![0xBF, 0xFF]);
        assert_eq!(uint(0x4000), vec![0xC0, 0x00, 0x40, 0x00]);
        assert_eq!(uint(0x1FFF_FFFF), vec![0xDF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_compressed_uint_overflow() {
        let mut buffer = Vec::new();
        assert_eq!(
            write_compressed_uint(0x2000_0000, &mut buffer),
            Err(Error::ValueTooLarge(0x2000_0000))
        );
        assert!(buffer.is_empty(), "Nothing is written for rejected values");
    }

    #[test]
    fn test_compressed_int_vectors() {
        // Reference values from ECMA-335 §II.23.2 (6th edition)
        assert_eq!(int(3), vec![0x06]);
        assert_eq!(int(-3), vec![0x7B]);
        assert_eq!(int(64), vec![0x80, 0x80]);
        assert_eq!(int(-64), vec![0x01]);
        assert_eq!(int(8192), vec![0xC0, 0x00, 0x40, 0x00]);
        assert_eq!(int(-8192), vec![0x80, 0x01]);
        assert_eq!(int(268_435_455), vec![0xDF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(int(-268_435_456), vec![0xC0, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_compressed_int_overflow() {
        let mut buffer = Vec::new();
        assert!(write_compressed_int(MAX_COMPRESSED_INT + 1, &mut buffer).is_err());
        assert!(write_compressed_int(MIN_COMPRESSED_INT - 1, &mut buffer).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_type_def_or_ref() {
        let mut buffer = Vec::new();
        buffer.write_type_def_or_ref(Token::new(0x0100_0001)).unwrap();
        assert_eq!(buffer, vec![0x05]);

        // TypeDef row 0x30 -> 0xC0, needs the two byte form
        buffer.clear();
        buffer.write_type_def_or_ref(Token::new(0x0200_0030)).unwrap();
        assert_eq!(buffer, vec![0x80, 0xC0]);

        buffer.clear();
        let field = Token::new(0x0400_0001);
        assert_eq!(
            buffer.write_type_def_or_ref(field),
            Err(Error::InvalidToken(field))
        );
    }
}
