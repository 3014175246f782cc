//! Encoder for single type references inside signatures (ECMA-335 §II.23.2.12).
//!
//! [`TypeSignatureEncoder`] writes one [`TypeDescriptor`] as a sequence of element-type tags:
//!
//! ```text
//! Type ::= ( SZARRAY | BYREF )* Terminal
//! Terminal ::= <primitive tag>
//!            | VAR number | MVAR number
//!            | GENERICINST (CLASS | VALUETYPE) TypeDefOrRefEncoded count Type*
//!            | (CLASS | VALUETYPE) TypeDefOrRefEncoded
//! ```
//!
//! The encoder decides *what* to write; packing integers and tokens is left to the
//! [`BlobSink`]. Generic parameters are only written when the caller passes the matching
//! [`GenericContext`]; deciding that context is the signature builder's job.

use crate::{
    metadata::{
        module::ModuleContext,
        typesystem::{GenericContext, GenericOrigin, NominalType, TypeDescriptor, ELEMENT_TYPE},
    },
    utils::BlobSink,
    Error::{self, RecursionLimit},
    Result, MAX_RECURSION_DEPTH,
};

/// Converts a collection length into a compressed-integer count.
pub(crate) fn element_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::ValueTooLarge(i64::try_from(len).unwrap_or(i64::MAX)))
}

/// Writes type references into a blob sink.
///
/// One encoder is created per signature. It borrows the module used for token lookups and the
/// sink being appended to, and tracks the nesting depth of generic instantiations so that deeply
/// nested descriptors fail with [`crate::Error::RecursionLimit`] instead of exhausting the stack.
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::module::TypeTokenTable;
/// use cilsig::metadata::typesystem::{GenericContext, PrimitiveKind, TypeDescriptor, TypeSignatureEncoder};
///
/// let module = TypeTokenTable::new();
/// let mut blob = Vec::new();
///
/// let mut encoder = TypeSignatureEncoder::new(&module, &mut blob);
/// encoder.encode(
///     &TypeDescriptor::by_ref(TypeDescriptor::sz_array(PrimitiveKind::U1.into())),
///     GenericContext::None,
/// )?;
///
/// assert_eq!(blob, vec![0x10, 0x1D, 0x05]);
/// # Ok::<(), cilsig::Error>(())
/// ```
pub struct TypeSignatureEncoder<'a, M: ?Sized, S: ?Sized> {
    /// Token lookups for nominal types
    module: &'a M,
    /// Output the encoded bytes are appended to
    sink: &'a mut S,
    /// Current recursion depth for stack overflow prevention
    depth: usize,
}

impl<'a, M, S> TypeSignatureEncoder<'a, M, S>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    /// Creates an encoder appending to `sink` and resolving tokens through `module`.
    pub fn new(module: &'a M, sink: &'a mut S) -> Self {
        TypeSignatureEncoder {
            module,
            sink,
            depth: 0,
        }
    }

    /// Gives access to the underlying sink, for headers and counts written around types.
    pub fn sink(&mut self) -> &mut S {
        &mut *self.sink
    }

    /// Encodes one type reference.
    ///
    /// `context` is the generic scope resolved for this position. It is only consulted when a
    /// generic parameter is reached, after all array and byref wrappers.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnsupportedTypeShape`] for general arrays and non-nominal generic
    ///   definitions
    /// - [`crate::Error::UnresolvedGenericOrigin`] if a generic parameter does not match
    ///   `context`
    /// - [`crate::Error::TokenResolutionFailure`] or [`crate::Error::InvalidToken`] from the
    ///   token lookup
    /// - [`crate::Error::RecursionLimit`] if generic instantiations nest too deeply
    pub fn encode(&mut self, ty: &TypeDescriptor, context: GenericContext) -> Result<()> {
        if self.depth + 1 >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        self.depth += 1;
        let result = self.encode_inner(ty, context);
        self.depth -= 1;
        result
    }

    fn encode_inner(&mut self, ty: &TypeDescriptor, context: GenericContext) -> Result<()> {
        let mut current = ty;
        loop {
            match current {
                TypeDescriptor::SzArray(element) => {
                    self.sink.write_byte(ELEMENT_TYPE::SZARRAY);
                    current = element;
                }
                TypeDescriptor::ByRef(pointee) => {
                    self.sink.write_byte(ELEMENT_TYPE::BYREF);
                    current = pointee;
                }
                TypeDescriptor::Primitive(kind) => {
                    self.sink.write_byte(kind.element_type());
                    return Ok(());
                }
                TypeDescriptor::GenericParameter { origin, position } => {
                    return self.write_generic_parameter(*origin, *position, context);
                }
                TypeDescriptor::GenericInstantiation {
                    definition,
                    arguments,
                } => {
                    return self.encode_generic_instantiation(definition, arguments);
                }
                TypeDescriptor::Nominal(nominal) => {
                    return self.write_nominal(nominal);
                }
                TypeDescriptor::Array(shape) => {
                    return Err(unsupported_shape!(
                        "array '{}' of rank {} is not a single-dimension zero-based array",
                        current,
                        shape.rank
                    ));
                }
            }
        }
    }

    /// Writes `VAR` or `MVAR` followed by the parameter position.
    fn write_generic_parameter(
        &mut self,
        origin: GenericOrigin,
        position: u32,
        context: GenericContext,
    ) -> Result<()> {
        let resolved = match context {
            GenericContext::None => {
                return Err(Error::UnresolvedGenericOrigin {
                    position,
                    reason: format!(
                        "{} parameter used where no generic context applies",
                        origin
                    ),
                })
            }
            GenericContext::TypeParam => GenericOrigin::TypeParam,
            GenericContext::MethodParam => GenericOrigin::MethodParam,
        };
        if resolved != origin {
            return Err(Error::UnresolvedGenericOrigin {
                position,
                reason: format!(
                    "declared as {} parameter but resolved as {} parameter",
                    origin, resolved
                ),
            });
        }

        self.sink.write_byte(match origin {
            GenericOrigin::TypeParam => ELEMENT_TYPE::VAR,
            GenericOrigin::MethodParam => ELEMENT_TYPE::MVAR,
        });
        self.sink.write_compressed_uint(position)
    }

    /// Writes `CLASS` or `VALUETYPE` followed by the type's coded token.
    ///
    /// # Errors
    ///
    /// Returns an error if the module can not resolve the type, or resolves it to a token that is
    /// not a valid `TypeDefOrRef` target.
    pub fn write_nominal(&mut self, nominal: &NominalType) -> Result<()> {
        self.sink.write_byte(if nominal.is_value_type {
            ELEMENT_TYPE::VALUETYPE
        } else {
            ELEMENT_TYPE::CLASS
        });
        self.write_type_token(nominal)
    }

    /// Writes only the coded token of `nominal`, without an element-type tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the module can not resolve the type, or resolves it to a token that is
    /// not a valid `TypeDefOrRef` target.
    pub fn write_type_token(&mut self, nominal: &NominalType) -> Result<()> {
        let token = self.module.type_token(nominal)?;
        self.sink.write_type_def_or_ref(token)
    }

    /// Writes a generic instantiation: `GENERICINST`, the definition, the argument count and each
    /// argument.
    ///
    /// Arguments are closed types relative to the instantiation and are encoded without a generic
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedTypeShape`] if `definition` is not a nominal type or if
    /// no arguments are given, and propagates any error from encoding the arguments.
    pub fn encode_generic_instantiation(
        &mut self,
        definition: &TypeDescriptor,
        arguments: &[TypeDescriptor],
    ) -> Result<()> {
        let TypeDescriptor::Nominal(nominal) = definition else {
            return Err(unsupported_shape!(
                "generic instantiation requires a nominal type definition, got '{}'",
                definition
            ));
        };
        if arguments.is_empty() {
            return Err(unsupported_shape!(
                "generic instantiation of '{}' has no type arguments",
                nominal
            ));
        }

        self.sink.write_byte(ELEMENT_TYPE::GENERICINST);
        self.write_nominal(nominal)?;
        self.sink
            .write_compressed_uint(element_count(arguments.len())?)?;
        for argument in arguments {
            self.encode(argument, GenericContext::None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::metadata::{
        module::TypeTokenTable,
        token::Token,
        typesystem::PrimitiveKind,
    };

    fn module() -> TypeTokenTable {
        let mut module = TypeTokenTable::new();
        module
            .insert_type(NominalType::class("System", "Console"), Token::new(0x0100_0001))
            .insert_type(NominalType::value_type("System", "Guid"), Token::new(0x0100_0002))
            .insert_type(
                NominalType::class("System.Collections.Generic", "List`1"),
                Token::new(0x0200_0003),
            );
        module
    }

    fn encode(ty: &TypeDescriptor, context: GenericContext) -> Result<Vec<u8>> {
        let module = module();
        let mut buffer = Vec::new();
        TypeSignatureEncoder::new(&module, &mut buffer).encode(ty, context)?;
        Ok(buffer)
    }

    #[test]
    fn test_encode_primitives() {
        for kind in PrimitiveKind::iter() {
            let encoded = encode(&kind.into(), GenericContext::None).unwrap();
            assert_eq!(encoded, vec![kind.element_type()], "Primitive {:?}", kind);
        }
    }

    #[test]
    fn test_encode_nested_sz_arrays() {
        for depth in 0..8 {
            let mut ty = TypeDescriptor::object();
            for _ in 0..depth {
                ty = TypeDescriptor::sz_array(ty);
            }

            let encoded = encode(&ty, GenericContext::None).unwrap();
            let mut expected = vec![ELEMENT_TYPE::SZARRAY; depth];
            expected.push(ELEMENT_TYPE::OBJECT);
            assert_eq!(encoded, expected);
        }
    }

    #[test]
    fn test_encode_byref_and_array_interleaved() {
        // int32[]&[] is not valid CLI, but the wrappers are written in descriptor order
        let ty = TypeDescriptor::sz_array(TypeDescriptor::by_ref(TypeDescriptor::sz_array(
            PrimitiveKind::I4.into(),
        )));
        assert_eq!(
            encode(&ty, GenericContext::None).unwrap(),
            vec![
                ELEMENT_TYPE::SZARRAY,
                ELEMENT_TYPE::BYREF,
                ELEMENT_TYPE::SZARRAY,
                ELEMENT_TYPE::I4
            ]
        );
    }

    #[test]
    fn test_encode_nominal() {
        assert_eq!(
            encode(&TypeDescriptor::class("System", "Console"), GenericContext::None).unwrap(),
            vec![ELEMENT_TYPE::CLASS, 0x05]
        );
        assert_eq!(
            encode(&TypeDescriptor::value_type("System", "Guid"), GenericContext::None).unwrap(),
            vec![ELEMENT_TYPE::VALUETYPE, 0x09]
        );
    }

    #[test]
    fn test_encode_unknown_nominal() {
        let result = encode(&TypeDescriptor::class("System", "Missing"), GenericContext::None);
        assert_eq!(
            result,
            Err(Error::TokenResolutionFailure("System.Missing".to_string()))
        );
    }

    #[test]
    fn test_encode_generic_parameters() {
        assert_eq!(
            encode(&TypeDescriptor::type_param(0), GenericContext::TypeParam).unwrap(),
            vec![ELEMENT_TYPE::VAR, 0x00]
        );
        assert_eq!(
            encode(
                &TypeDescriptor::sz_array(TypeDescriptor::method_param(0x81)),
                GenericContext::MethodParam
            )
            .unwrap(),
            vec![ELEMENT_TYPE::SZARRAY, ELEMENT_TYPE::MVAR, 0x80, 0x81]
        );
    }

    #[test]
    fn test_encode_generic_parameter_without_context() {
        let result = encode(&TypeDescriptor::type_param(1), GenericContext::None);
        assert!(matches!(
            result,
            Err(Error::UnresolvedGenericOrigin { position: 1, .. })
        ));

        let result = encode(&TypeDescriptor::method_param(0), GenericContext::TypeParam);
        assert!(matches!(
            result,
            Err(Error::UnresolvedGenericOrigin { position: 0, .. })
        ));
    }

    #[test]
    fn test_encode_generic_instantiation() {
        // List<int32[]>
        let ty = TypeDescriptor::generic_inst(
            TypeDescriptor::class("System.Collections.Generic", "List`1"),
            vec![TypeDescriptor::sz_array(PrimitiveKind::I4.into())],
        );
        assert_eq!(
            encode(&ty, GenericContext::None).unwrap(),
            vec![
                ELEMENT_TYPE::GENERICINST,
                ELEMENT_TYPE::CLASS,
                0x0C,
                0x01,
                ELEMENT_TYPE::SZARRAY,
                ELEMENT_TYPE::I4
            ]
        );
    }

    #[test]
    fn test_generic_arguments_are_encoded_without_context() {
        let ty = TypeDescriptor::generic_inst(
            TypeDescriptor::class("System.Collections.Generic", "List`1"),
            vec![TypeDescriptor::type_param(0)],
        );
        assert!(matches!(
            encode(&ty, GenericContext::TypeParam),
            Err(Error::UnresolvedGenericOrigin { .. })
        ));
    }

    #[test]
    fn test_encode_invalid_generic_definitions() {
        let not_nominal =
            TypeDescriptor::generic_inst(TypeDescriptor::object(), vec![PrimitiveKind::I4.into()]);
        assert!(matches!(
            encode(&not_nominal, GenericContext::None),
            Err(Error::UnsupportedTypeShape { .. })
        ));

        let no_arguments = TypeDescriptor::generic_inst(
            TypeDescriptor::class("System.Collections.Generic", "List`1"),
            Vec::new(),
        );
        assert!(matches!(
            encode(&no_arguments, GenericContext::None),
            Err(Error::UnsupportedTypeShape { .. })
        ));
    }

    #[test]
    fn test_encode_multi_dimensional_array_rejected() {
        for rank in [1, 2, 3] {
            let ty = TypeDescriptor::sz_array(TypeDescriptor::array(TypeDescriptor::object(), rank));
            assert!(matches!(
                encode(&ty, GenericContext::None),
                Err(Error::UnsupportedTypeShape { .. })
            ));
        }
    }

    #[test]
    fn test_recursion_limit() {
        let list = TypeDescriptor::class("System.Collections.Generic", "List`1");
        let mut ty = TypeDescriptor::object();
        for _ in 0..MAX_RECURSION_DEPTH {
            ty = TypeDescriptor::generic_inst(list.clone(), vec![ty]);
        }
        assert_eq!(
            encode(&ty, GenericContext::None),
            Err(Error::RecursionLimit(MAX_RECURSION_DEPTH))
        );
    }

    #[test]
    fn test_encoder_reusable_after_error() {
        let module = module();
        let mut buffer = Vec::new();
        let mut encoder = TypeSignatureEncoder::new(&module, &mut buffer);

        assert!(encoder
            .encode(&TypeDescriptor::type_param(0), GenericContext::None)
            .is_err());
        encoder
            .encode(&PrimitiveKind::Boolean.into(), GenericContext::None)
            .unwrap();
        assert_eq!(buffer, vec![ELEMENT_TYPE::BOOLEAN]);
    }
}
