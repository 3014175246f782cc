// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cilsig
//!
//! An encoder for ECMA-335 type signatures, the binary blobs a .NET metadata writer stores in
//! the `#Blob` heap to describe field types, method signatures, property signatures and type
//! specifications.
//!
//! Callers describe a signature with plain descriptors ([`metadata::typesystem::TypeDescriptor`],
//! [`metadata::signatures::MethodSignatureDescriptor`], ...) and supply a
//! [`metadata::module::ModuleContext`] that hands out the tokens of referenced classes and value
//! types. The encoders produce the exact byte sequence to be stored in the heap.
//!
//! ## Features
//!
//! - **Field, method and property signatures** with custom modifiers
//! - **Generic types and methods**, with `VAR`/`MVAR` resolved from the generic type definition
//! - **TypeSpec and generic instantiation** blobs
//! - **Compressed integer and `TypeDefOrRef`** encoding through the [`utils::BlobSink`] trait
//! - **Typed errors** for every shape that can not be encoded
//!
//! ## Quick Start
//!
//! ```rust
//! use cilsig::prelude::*;
//!
//! let mut module = TypeTokenTable::new();
//! module.insert_type(NominalType::class("System", "Console"), Token::new(0x0100_0005));
//!
//! // static void Write(class System.Console, int32&)
//! let method = MethodSignatureDescriptor::new("Write")
//!     .param(TypeDescriptor::class("System", "Console"))
//!     .param(TypeDescriptor::by_ref(PrimitiveKind::I4.into()));
//!
//! let blob = encode_method_signature(&module, &method)?;
//! assert_eq!(blob, vec![0x00, 0x02, 0x01, 0x12, 0x15, 0x10, 0x08]);
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`utils`] - The byte sink and ECMA-335 integer packing
//! - [`metadata::token`] - Metadata tokens and coded indexes
//! - [`metadata::typesystem`] - Type descriptors and the single-type encoder
//! - [`metadata::signatures`] - Signature descriptors and encoders
//! - [`metadata::module`] - Token resolution collaborator
//!
//! ## Logging
//!
//! The encoders emit `tracing` events: `trace` when a signature is started and `debug` when it
//! is rejected. No subscriber is installed by this crate.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with [`Error`] describing the shape, token or
//! calling convention that could not be encoded.
//!
//! ### References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilsig::prelude::*;
///
/// let module = TypeTokenTable::new();
/// let field = FieldSignatureDescriptor::new("name", PrimitiveKind::String.into());
/// assert_eq!(encode_field_signature(&module, &field)?, vec![0x06, 0x0E]);
/// # Ok::<(), cilsig::Error>(())
/// ```
pub mod prelude;

/// Metadata tokens, type descriptors and signature encoders based on ECMA-335
pub mod metadata;

/// Blob writing utilities: the byte sink and compressed integer encoding
pub mod utils;

/// `cilsig` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilsig` Error type
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::module::TypeTokenTable;
/// use cilsig::metadata::signatures::encode_typespec_signature;
/// use cilsig::metadata::typesystem::TypeDescriptor;
/// use cilsig::Error;
///
/// let module = TypeTokenTable::new();
/// match encode_typespec_signature(&module, &TypeDescriptor::class("System", "Uri")) {
///     Ok(blob) => println!("{:02X?}", blob),
///     Err(Error::TokenResolutionFailure(name)) => println!("no token for {}", name),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Maximum nesting depth of type descriptors processed by the encoders.
///
/// Deeper nesting of generic instantiations fails with [`Error::RecursionLimit`].
pub const MAX_RECURSION_DEPTH: usize = 50;
