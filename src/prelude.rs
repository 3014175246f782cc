//! # cilsig Prelude
//!
//! This module re-exports the types needed to describe and encode signatures. Import it to get
//! quick access to the descriptors, the encoders and the module collaborator.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilsig operations
pub use crate::Error;

/// The result type used throughout cilsig
pub use crate::Result;

/// Maximum nesting depth of generic instantiations
pub use crate::MAX_RECURSION_DEPTH;

// ================================================================================================
// Tokens and Module
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Token resolution for nominal types
pub use crate::metadata::module::{ModuleContext, TypeTokenTable};

// ================================================================================================
// Type System
// ================================================================================================

/// Type descriptors and the type encoder
pub use crate::metadata::typesystem::{
    ArrayDimensions, ArrayShape, GenericContext, GenericOrigin, NominalType, PrimitiveKind,
    TypeDescriptor, TypeSignatureEncoder, ELEMENT_TYPE,
};

// ================================================================================================
// Signatures
// ================================================================================================

/// Signature descriptors
pub use crate::metadata::signatures::{
    CallingConventionFlags, CallingConventionKind, CustomModifier, FieldSignatureDescriptor,
    MethodShadow, MethodSignatureDescriptor, ParamDescriptor, PropertySignatureDescriptor,
    CALLING_CONVENTION, SIGNATURE_HEADER,
};

/// Signature encoders
pub use crate::metadata::signatures::{
    encode_field_signature, encode_generic_inst_signature, encode_method_signature,
    encode_method_signature_resolved, encode_property_signature, encode_typespec_signature,
    resolve_generic_context, write_custom_modifiers, write_field_signature,
    write_generic_inst_signature, write_method_signature, write_method_signature_resolved,
    write_property_signature, write_typespec_signature,
};

// ================================================================================================
// Blob Writing
// ================================================================================================

/// Byte sink and compressed integer helpers
pub use crate::utils::{write_compressed_int, write_compressed_uint, BlobSink};
