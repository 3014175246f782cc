//! Metadata building blocks for signature emission.
//!
//! - [`token`]: Metadata tokens and their `TypeDefOrRef` coded index
//! - [`typesystem`]: Type descriptors and the single-type encoder
//! - [`signatures`]: Field, method, property and TypeSpec signature encoders
//! - [`module`]: The collaborator resolving types to tokens

pub mod module;
pub mod signatures;
pub mod token;
pub mod typesystem;
