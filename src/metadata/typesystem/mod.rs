//! Type descriptors and the single-type signature encoder.
//!
//! This module holds the closed description of the types that can appear inside a signature,
//! and the encoder that turns one such description into element-type tagged bytes.
//!
//! # Key Components
//!
//! - [`TypeDescriptor`]: The tagged union every encoder consumes
//! - [`PrimitiveKind`]: Built-in types with a dedicated element-type tag
//! - [`NominalType`]: Classes and value types referenced through a token
//! - [`GenericOrigin`] / [`GenericContext`]: Declaring scope of generic parameters
//! - [`TypeSignatureEncoder`]: Writes a [`TypeDescriptor`] into a [`crate::utils::BlobSink`]
//! - [`ELEMENT_TYPE`]: The element-type tag constants
//!
//! # Examples
//!
//! ```rust
//! use cilsig::metadata::module::TypeTokenTable;
//! use cilsig::metadata::token::Token;
//! use cilsig::metadata::typesystem::{
//!     GenericContext, NominalType, TypeDescriptor, TypeSignatureEncoder, ELEMENT_TYPE,
//! };
//!
//! let mut module = TypeTokenTable::new();
//! module.insert_type(NominalType::value_type("System", "DateTime"), Token::new(0x0100_0004));
//!
//! let mut blob = Vec::new();
//! TypeSignatureEncoder::new(&module, &mut blob).encode(
//!     &TypeDescriptor::value_type("System", "DateTime"),
//!     GenericContext::None,
//! )?;
//! assert_eq!(blob, vec![ELEMENT_TYPE::VALUETYPE, 0x11]);
//! # Ok::<(), cilsig::Error>(())
//! ```

mod base;
mod encoder;

pub use base::{
    ArrayDimensions, ArrayShape, GenericContext, GenericOrigin, NominalType, PrimitiveKind,
    TypeDescriptor, ELEMENT_TYPE,
};
pub(crate) use encoder::element_count;
pub use encoder::TypeSignatureEncoder;
