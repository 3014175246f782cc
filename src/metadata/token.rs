//! Metadata tokens and their `TypeDefOrRef` coded-index form.
//!
//! A token is the 32-bit handle a module builder hands out for every row it allocates: the
//! high byte names the table, the low 24 bits the row. Signatures never store raw tokens;
//! they store the compressed `TypeDefOrRef` coded index defined in ECMA-335 §II.23.2.8.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Error, Result};

/// Table identifier of the `TypeRef` table
pub const TABLE_TYPEREF: u8 = 0x01;
/// Table identifier of the `TypeDef` table
pub const TABLE_TYPEDEF: u8 = 0x02;
/// Table identifier of the `TypeSpec` table
pub const TABLE_TYPESPEC: u8 = 0x1B;

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Converts the token into a `TypeDefOrRef` coded index (ECMA-335 §II.24.2.6).
    ///
    /// | Table    | Tag | Coded value        |
    /// |----------|-----|--------------------|
    /// | TypeDef  | 0   | `(rid << 2)`       |
    /// | TypeRef  | 1   | `(rid << 2) \| 1`  |
    /// | TypeSpec | 2   | `(rid << 2) \| 2`  |
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidToken`] if the token belongs to any other table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilsig::metadata::token::Token;
    ///
    /// let typeref = Token::new(0x0100_0005);
    /// assert_eq!(typeref.type_def_or_ref_index()?, (5 << 2) | 1);
    /// # Ok::<(), cilsig::Error>(())
    /// ```
    pub fn type_def_or_ref_index(&self) -> Result<u32> {
        let rid = self.row();
        match self.table() {
            TABLE_TYPEDEF => Ok(rid << 2),
            TABLE_TYPEREF => Ok((rid << 2) | 1),
            TABLE_TYPESPEC => Ok((rid << 2) | 2),
            _ => Err(Error::InvalidToken(*self)),
        }
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
