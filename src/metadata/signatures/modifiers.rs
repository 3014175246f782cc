//! Custom modifier prefixes (ECMA-335 §II.23.2.7).
//!
//! ```text
//! CustomMod ::= ( CMOD_OPT | CMOD_REQD ) TypeDefOrRefEncoded
//! ```
//!
//! All required modifiers of a position are written first, then all optional ones. Inside each
//! group the source order is kept, so identical descriptors always produce identical blobs.

use crate::{
    metadata::{
        module::ModuleContext,
        signatures::CustomModifier,
        typesystem::{TypeDescriptor, TypeSignatureEncoder, ELEMENT_TYPE},
    },
    utils::BlobSink,
    Result,
};

/// Writes the custom modifiers of one signature position.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedTypeShape`] if a modifier does not name a nominal type,
/// and propagates token resolution errors from the module.
pub fn write_custom_modifiers<M, S>(
    encoder: &mut TypeSignatureEncoder<'_, M, S>,
    modifiers: &[CustomModifier],
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    let required = modifiers.iter().filter(|modifier| modifier.is_required);
    let optional = modifiers.iter().filter(|modifier| !modifier.is_required);

    for modifier in required {
        write_custom_modifier(encoder, ELEMENT_TYPE::CMOD_REQD, &modifier.modifier_type)?;
    }
    for modifier in optional {
        write_custom_modifier(encoder, ELEMENT_TYPE::CMOD_OPT, &modifier.modifier_type)?;
    }
    Ok(())
}

fn write_custom_modifier<M, S>(
    encoder: &mut TypeSignatureEncoder<'_, M, S>,
    tag: u8,
    modifier_type: &TypeDescriptor,
) -> Result<()>
where
    M: ModuleContext + ?Sized,
    S: BlobSink + ?Sized,
{
    let TypeDescriptor::Nominal(nominal) = modifier_type else {
        return Err(unsupported_shape!(
            "custom modifier '{}' must be a class or value type",
            modifier_type
        ));
    };

    encoder.sink().write_byte(tag);
    encoder.write_type_token(nominal)
}
