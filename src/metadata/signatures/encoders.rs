//! Signature encoders for .NET metadata blob emission.
//!
//! Each entry point comes in two forms. The `write_*` functions append to a caller-provided
//! [`BlobSink`]; on error the sink holds a partial signature that the caller has to discard.
//! The `encode_*` functions build into a fresh buffer and only hand it out on success.
//!
//! # Available Encoders
//!
//! - [`encode_field_signature`] - Field signatures for Field and MemberRef rows
//! - [`encode_method_signature`] - Method signatures for MethodDef and MemberRef rows
//! - [`encode_method_signature_resolved`] - Method signatures with the definition-level
//!   counterpart looked up through the module
//! - [`encode_property_signature`] - Property signatures for Property rows
//! - [`encode_generic_inst_signature`] - Closed generic types
//! - [`encode_typespec_signature`] - Type specification signatures for TypeSpec rows
//!
//! # Generic Parameters
//!
//! A generic parameter is written as `VAR` when it belongs to the declaring type and as `MVAR`
//! when it belongs to the method. Which of the two applies at a method position is decided by
//! [`resolve_generic_context`], comparing each written type against the method's shadow (the
//! same method on the other side of the generic type instantiation).

use tracing::{debug, trace};

use crate::{
    metadata::{
        module::ModuleContext,
        signatures::{
            write_custom_modifiers, CallingConventionFlags, CallingConventionKind,
            FieldSignatureDescriptor, MethodSignatureDescriptor, ParamDescriptor,
            PropertySignatureDescriptor, CALLING_CONVENTION, SIGNATURE_HEADER,
        },
        typesystem::{
            element_count, GenericContext, GenericOrigin, TypeDescriptor, TypeSignatureEncoder,
        },
    },
    utils::BlobSink,
    Error, Result,
};

/// Decides the generic context of one method signature position.
///
/// `ty` is the type written at the position and `shadow` the type at the same position of the
/// method's counterpart across the generic type instantiation. Both are walked in lockstep
/// through matching array and byref wrappers:
///
/// - if the method is generic and the shadow ends in a method-level generic parameter, the
///   position is [`GenericContext::MethodParam`]
/// - otherwise, if `ty` ends in a generic parameter, it is [`GenericContext::TypeParam`]
/// - otherwise no generic context applies
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::signatures::resolve_generic_context;
/// use cilsig::metadata::typesystem::{GenericContext, TypeDescriptor};
///
/// let ty = TypeDescriptor::sz_array(TypeDescriptor::method_param(0));
/// assert_eq!(resolve_generic_context(&ty, &ty, true), GenericContext::MethodParam);
/// assert_eq!(resolve_generic_context(&ty, &ty, false), GenericContext::TypeParam);
/// ```
#[must_use]
pub fn resolve_generic_context(
    ty: &TypeDescriptor,
    shadow: &TypeDescriptor,
    method_is_generic: bool,
) -> GenericContext {
    let mut current = ty;
    let mut shadow_current = shadow;
    loop {
        match (current, shadow_current) {
            (TypeDescriptor::SzArray(inner), TypeDescriptor::SzArray(shadow_inner))
            | (TypeDescriptor::ByRef(inner), TypeDescriptor::ByRef(shadow_inner)) => {
                current = inner;
                shadow_current = shadow_inner;
            }
            _ => break,
        }
    }

    let shadow_leaf = match shadow_current {
        TypeDescriptor::GenericParameter { origin, .. } => Some(*origin),
        _ => None,
    };
    if method_is_generic && shadow_leaf == Some(GenericOrigin::MethodParam) {
        GenericContext::MethodParam
    } else if current.is_generic_parameter() {
        GenericContext::TypeParam
    } else {
        GenericContext::None
    }
}

/// Writes a field signature: `FIELD`, custom modifiers and the field type.
///
/// # Errors
///
/// Returns an error if the field type or a modifier can not be encoded, see
/// [`TypeSignatureEncoder::encode`].
pub fn write_field_signature<M, S>(
    module: &M,
    sink: &mut S,
    field: &FieldSignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    trace!(field = %field.name, ty = %field.field.ty, "encoding field signature");

    let mut encoder = TypeSignatureEncoder::new(module, sink);
    encoder.sink().write_byte(SIGNATURE_HEADER::FIELD);
    write_custom_modifiers(&mut encoder, &field.field.modifiers)
        .and_then(|()| encoder.encode(&field.field.ty, GenericContext::None))
        .inspect_err(|error| debug!(field = %field.name, %error, "field signature rejected"))
}

/// Encodes a field signature into a new buffer.
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::module::TypeTokenTable;
/// use cilsig::metadata::signatures::{encode_field_signature, FieldSignatureDescriptor};
/// use cilsig::metadata::typesystem::PrimitiveKind;
///
/// let module = TypeTokenTable::new();
/// let field = FieldSignatureDescriptor::new("count", PrimitiveKind::I4.into());
///
/// assert_eq!(encode_field_signature(&module, &field)?, vec![0x06, 0x08]);
/// # Ok::<(), cilsig::Error>(())
/// ```
///
/// # Errors
///
/// See [`write_field_signature`].
pub fn encode_field_signature<M>(module: &M, field: &FieldSignatureDescriptor) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_field_signature(module, &mut buffer, field)?;
    Ok(buffer)
}

/// Computes the calling convention byte, rejecting everything besides the managed default
/// convention with optional `HASTHIS` and `GENERIC`.
fn calling_convention(method: &MethodSignatureDescriptor) -> Result<u8> {
    if method.kind != CallingConventionKind::Default {
        return Err(Error::InvalidCallingConvention(format!(
            "method '{}' uses the {:?} calling convention, only the default convention is supported",
            method, method.kind
        )));
    }

    let supported = CallingConventionFlags::HAS_THIS | CallingConventionFlags::GENERIC;
    if !supported.contains(method.flags) {
        return Err(Error::InvalidCallingConvention(format!(
            "method '{}' uses unsupported calling convention flags 0x{:02X}",
            method,
            method.flags.difference(supported).bits()
        )));
    }

    match (method.is_generic(), method.generic_arity) {
        (true, 0) => Err(Error::InvalidCallingConvention(format!(
            "generic method '{}' declares no generic parameters",
            method
        ))),
        (false, arity) if arity > 0 => Err(Error::InvalidCallingConvention(format!(
            "method '{}' declares {} generic parameters but is not marked generic",
            method, arity
        ))),
        _ => Ok(method.kind.bits() | method.flags.bits()),
    }
}

/// Writes one return or parameter position: its modifiers, then the type in the resolved
/// generic context.
fn write_position<M, S>(
    encoder: &mut TypeSignatureEncoder<'_, M, S>,
    param: &ParamDescriptor,
    shadow: &TypeDescriptor,
    method_is_generic: bool,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    write_custom_modifiers(encoder, &param.modifiers)?;
    let context = resolve_generic_context(&param.ty, shadow, method_is_generic);
    encoder.encode(&param.ty, context)
}

fn write_method_signature_inner<M, S>(
    module: &M,
    sink: &mut S,
    method: &MethodSignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    let convention = calling_convention(method)?;
    if let Some(shadow) = &method.shadow {
        if shadow.params.len() != method.params.len() {
            return Err(unsupported_shape!(
                "method '{}' has {} parameters but its definition has {}",
                method,
                method.params.len(),
                shadow.params.len()
            ));
        }
    }

    let is_generic = method.is_generic();
    let mut encoder = TypeSignatureEncoder::new(module, sink);

    encoder.sink().write_byte(convention);
    if is_generic {
        encoder.sink().write_compressed_uint(method.generic_arity)?;
    }
    encoder
        .sink()
        .write_compressed_uint(element_count(method.params.len())?)?;

    match &method.return_param {
        None => encoder.encode(&TypeDescriptor::void(), GenericContext::None)?,
        Some(ret) => {
            let shadow = method
                .shadow
                .as_ref()
                .and_then(|shadow| shadow.return_type.as_ref())
                .unwrap_or(&ret.ty);
            write_position(&mut encoder, ret, shadow, is_generic)?;
        }
    }

    for (index, param) in method.params.iter().enumerate() {
        let shadow = method
            .shadow
            .as_ref()
            .and_then(|shadow| shadow.params.get(index))
            .unwrap_or(&param.ty);
        write_position(&mut encoder, param, shadow, is_generic)?;
    }
    Ok(())
}

/// Writes a method signature (II.23.2.1).
///
/// ```text
/// MethodDefSig ::= conv [GenParamCount] ParamCount RetType Param*
/// ```
///
/// A method without a return position returns `VOID`. A method without a shadow is treated as
/// its own definition.
///
/// # Errors
///
/// - [`crate::Error::InvalidCallingConvention`] for non-default conventions, `EXPLICITTHIS`,
///   or a generic arity that does not match the `GENERIC` flag
/// - [`crate::Error::UnsupportedTypeShape`] if the shadow has a different parameter count, or a
///   type can not be encoded
/// - [`crate::Error::UnresolvedGenericOrigin`] if a generic parameter does not fit its position
/// - token resolution errors from `module`
pub fn write_method_signature<M, S>(
    module: &M,
    sink: &mut S,
    method: &MethodSignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    trace!(
        method = %method,
        params = method.params.len(),
        generic_arity = method.generic_arity,
        "encoding method signature"
    );

    write_method_signature_inner(module, sink, method)
        .inspect_err(|error| debug!(method = %method, %error, "method signature rejected"))
}

/// Encodes a method signature into a new buffer.
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::module::TypeTokenTable;
/// use cilsig::metadata::signatures::{encode_method_signature, MethodSignatureDescriptor};
///
/// let module = TypeTokenTable::new();
/// let main = MethodSignatureDescriptor::new("Main");
///
/// // static void Main()
/// assert_eq!(encode_method_signature(&module, &main)?, vec![0x00, 0x00, 0x01]);
/// # Ok::<(), cilsig::Error>(())
/// ```
///
/// # Errors
///
/// See [`write_method_signature`].
pub fn encode_method_signature<M>(
    module: &M,
    method: &MethodSignatureDescriptor,
) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_method_signature(module, &mut buffer, method)?;
    Ok(buffer)
}

/// Writes the signature of a method reached through a generic type instantiation.
///
/// The definition-level counterpart returned by [`ModuleContext::method_on_definition`] is what
/// gets written: its convention, its types and its modifiers. The instance types only serve as
/// the shadow. A position becomes `MVAR` when the method is generic and the instance type ends
/// in a method-level generic parameter, otherwise `VAR` when the definition type ends in a
/// generic parameter. Without a counterpart, `method` is written as given.
///
/// ```text
/// List<string>.Add(string)  ->  instance void Add(!0)  ->  20 01 01 13 00
/// ```
///
/// # Errors
///
/// Propagates lookup errors from `module`, then see [`write_method_signature`].
pub fn write_method_signature_resolved<M, S>(
    module: &M,
    sink: &mut S,
    method: &MethodSignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    let definition = module
        .method_on_definition(method)
        .inspect_err(|error| debug!(method = %method, %error, "method definition lookup failed"))?;

    match definition {
        Some(definition) => {
            trace!(method = %method, definition = %definition, "resolved definition-level method");
            let definition = definition.for_instance(method);
            write_method_signature(module, sink, &definition)
        }
        None => write_method_signature(module, sink, method),
    }
}

/// Encodes a method signature into a new buffer, see [`write_method_signature_resolved`].
///
/// # Errors
///
/// See [`write_method_signature_resolved`].
pub fn encode_method_signature_resolved<M>(
    module: &M,
    method: &MethodSignatureDescriptor,
) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_method_signature_resolved(module, &mut buffer, method)?;
    Ok(buffer)
}

/// Writes a closed generic type: `GENERICINST`, the definition's tag and token, the argument
/// count and each argument.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedTypeShape`] if `definition` is not a nominal type or
/// `arguments` is empty, and [`crate::Error::UnresolvedGenericOrigin`] if an argument is an
/// open generic parameter.
pub fn write_generic_inst_signature<M, S>(
    module: &M,
    sink: &mut S,
    definition: &TypeDescriptor,
    arguments: &[TypeDescriptor],
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    trace!(definition = %definition, arguments = arguments.len(), "encoding generic instantiation");

    TypeSignatureEncoder::new(module, sink)
        .encode_generic_instantiation(definition, arguments)
        .inspect_err(|error| {
            debug!(definition = %definition, %error, "generic instantiation rejected");
        })
}

/// Encodes a closed generic type into a new buffer.
///
/// # Errors
///
/// See [`write_generic_inst_signature`].
pub fn encode_generic_inst_signature<M>(
    module: &M,
    definition: &TypeDescriptor,
    arguments: &[TypeDescriptor],
) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_generic_inst_signature(module, &mut buffer, definition, arguments)?;
    Ok(buffer)
}

/// Writes a property signature (II.23.2.5).
///
/// ```text
/// PropertySig ::= PROPERTY [| HASTHIS] ParamCount CustomMod* Type Param*
/// ```
///
/// Properties have no method-level generic parameters, so a generic parameter in the property
/// type or an index parameter is written as a type parameter.
///
/// # Errors
///
/// Returns an error if the property type, an index parameter or a modifier can not be encoded.
pub fn write_property_signature<M, S>(
    module: &M,
    sink: &mut S,
    property: &PropertySignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    trace!(
        property = %property.name,
        params = property.params.len(),
        "encoding property signature"
    );

    write_property_signature_inner(module, sink, property).inspect_err(|error| {
        debug!(property = %property.name, %error, "property signature rejected");
    })
}

fn write_property_signature_inner<M, S>(
    module: &M,
    sink: &mut S,
    property: &PropertySignatureDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    let mut prolog = SIGNATURE_HEADER::PROPERTY;
    if property.has_this {
        prolog |= CALLING_CONVENTION::HASTHIS;
    }

    let mut encoder = TypeSignatureEncoder::new(module, sink);
    encoder.sink().write_byte(prolog);
    encoder
        .sink()
        .write_compressed_uint(element_count(property.params.len())?)?;

    write_position(&mut encoder, &property.property, &property.property.ty, false)?;
    for param in &property.params {
        write_position(&mut encoder, param, &param.ty, false)?;
    }
    Ok(())
}

/// Encodes a property signature into a new buffer.
///
/// # Errors
///
/// See [`write_property_signature`].
pub fn encode_property_signature<M>(
    module: &M,
    property: &PropertySignatureDescriptor,
) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_property_signature(module, &mut buffer, property)?;
    Ok(buffer)
}

/// Writes a type specification signature, a bare encoded type.
///
/// `context` must be passed explicitly when the type is an open generic parameter, for example
/// `GenericContext::TypeParam` for a TypeSpec row describing `!0`.
///
/// # Errors
///
/// See [`TypeSignatureEncoder::encode`].
pub fn write_typespec_signature<M, S>(
    module: &M,
    sink: &mut S,
    ty: &TypeDescriptor,
    context: GenericContext,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    trace!(ty = %ty, ?context, "encoding typespec signature");

    TypeSignatureEncoder::new(module, sink)
        .encode(ty, context)
        .inspect_err(|error| debug!(ty = %ty, %error, "typespec signature rejected"))
}

/// Encodes a closed type specification signature into a new buffer.
///
/// # Errors
///
/// See [`write_typespec_signature`]. Open generic parameters are rejected.
pub fn encode_typespec_signature<M>(module: &M, ty: &TypeDescriptor) -> Result<Vec<u8>>
where
    M: ModuleContext + ?Sized,
{
    let mut buffer = Vec::new();
    write_typespec_signature(module, &mut buffer, ty, GenericContext::None)?;
    Ok(buffer)
}
