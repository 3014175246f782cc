//! Method, field and type signature encoding for .NET metadata.
//!
//! This module turns signature descriptors into the compact binary blobs stored in the `#Blob`
//! heap, following ECMA-335 §II.23.2. The produced bytes are final: they are written to the heap
//! unmodified and referenced from MethodDef, MemberRef, Field, Property and TypeSpec rows.
//!
//! # Signature Types
//!
//! - **Method Signatures** - Calling convention, generic arity, return and parameter types
//! - **Field Signatures** - Field type and its custom modifiers
//! - **Property Signatures** - Property type and indexer parameters
//! - **Generic Instantiations** - Closed generic types such as `List<int32>`
//! - **TypeSpec Signatures** - A single type for TypeSpec rows
//!
//! # Binary Format
//!
//! - Calling conventions and signature headers are single bytes
//! - Parameter counts and generic arities use compressed unsigned integers
//! - Type references use element-type tags followed by `TypeDefOrRef` coded indexes
//! - Generic parameters are written as `VAR` or `MVAR` followed by their position
//! - Custom modifiers precede the type they apply to, required ones first
//!
//! # Examples
//!
//! ```rust
//! use cilsig::metadata::module::TypeTokenTable;
//! use cilsig::metadata::signatures::{encode_method_signature, MethodSignatureDescriptor};
//! use cilsig::metadata::typesystem::{PrimitiveKind, TypeDescriptor};
//!
//! let module = TypeTokenTable::new();
//!
//! // instance string Format(object[])
//! let method = MethodSignatureDescriptor::new("Format")
//!     .instance()
//!     .returns(PrimitiveKind::String.into())
//!     .param(TypeDescriptor::sz_array(TypeDescriptor::object()));
//!
//! let blob = encode_method_signature(&module, &method)?;
//! assert_eq!(blob, vec![0x20, 0x01, 0x0E, 0x1D, 0x1C]);
//! # Ok::<(), cilsig::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod encoders;
mod modifiers;
mod types;

pub use encoders::*;
pub use modifiers::write_custom_modifiers;
pub use types::*;
