//! The module collaborator consulted while encoding signatures.
//!
//! Encoding never allocates tokens itself. Whenever a class or value type has to be referenced,
//! the encoder asks a [`ModuleContext`] for the token the module builder assigned to that type.
//! The same collaborator maps a method reached through a generic type instantiation back to its
//! definition-level counterpart, which the method signature encoder needs to tell type-level and
//! method-level generic parameters apart.
//!
//! [`TypeTokenTable`] is a self-contained implementation backed by hash maps, useful for tests
//! and for callers that allocate tokens up front.

use std::collections::HashMap;

use crate::{
    metadata::{
        signatures::MethodSignatureDescriptor,
        token::Token,
        typesystem::{NominalType, TypeDescriptor},
    },
    Error, Result,
};

/// Token and definition lookups required by the signature encoders.
///
/// Implementations are queried synchronously and must be deterministic for the duration of one
/// signature; any locking around shared builder state is the implementor's concern.
pub trait ModuleContext {
    /// Returns the token of a `TypeDef`, `TypeRef` or `TypeSpec` row for `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TokenResolutionFailure`] if the type is not known to the module.
    fn type_token(&self, ty: &NominalType) -> Result<Token>;

    /// Returns the definition-level counterpart of `method`.
    ///
    /// For a method declared on a generic type instantiation this is the same method on the
    /// generic type definition. `Ok(None)` means the method already is definition-level.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TokenResolutionFailure`] if the method is declared on a generic
    /// instantiation but its definition can not be found.
    fn method_on_definition(
        &self,
        method: &MethodSignatureDescriptor,
    ) -> Result<Option<MethodSignatureDescriptor>> {
        let _ = method;
        Ok(None)
    }
}

impl<T: ModuleContext + ?Sized> ModuleContext for &T {
    fn type_token(&self, ty: &NominalType) -> Result<Token> {
        (**self).type_token(ty)
    }

    fn method_on_definition(
        &self,
        method: &MethodSignatureDescriptor,
    ) -> Result<Option<MethodSignatureDescriptor>> {
        (**self).method_on_definition(method)
    }
}

/// Key of a definition-level method: declaring generic type definition, name and parameter count.
/// Overloads sharing a key are told apart by their parameter types.
type MethodKey = (NominalType, String, usize);

/// An in-memory [`ModuleContext`].
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::module::{ModuleContext, TypeTokenTable};
/// use cilsig::metadata::token::Token;
/// use cilsig::metadata::typesystem::NominalType;
///
/// let console = NominalType::class("System", "Console");
///
/// let mut module = TypeTokenTable::new();
/// module.insert_type(console.clone(), Token::new(0x0100_0012));
///
/// assert_eq!(module.type_token(&console)?, Token::new(0x0100_0012));
/// # Ok::<(), cilsig::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeTokenTable {
    types: HashMap<NominalType, Token>,
    definitions: HashMap<MethodKey, Vec<MethodSignatureDescriptor>>,
}

impl TypeTokenTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the token of a type, replacing any previous registration
    pub fn insert_type(&mut self, ty: NominalType, token: Token) -> &mut Self {
        self.types.insert(ty, token);
        self
    }

    /// Registers a method as declared on a generic type definition.
    ///
    /// A method with the same name and parameter types as an earlier registration replaces it;
    /// any other overload is kept alongside.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedTypeShape`] if the method has no declaring type, or if
    /// the declaring type is not a nominal type.
    pub fn insert_definition(&mut self, method: MethodSignatureDescriptor) -> Result<&mut Self> {
        let Some(TypeDescriptor::Nominal(owner)) = &method.declaring_type else {
            return Err(unsupported_shape!(
                "definition-level method '{}' must be declared on a nominal type",
                method
            ));
        };

        let key = (owner.clone(), method.name.clone(), method.params.len());
        let overloads = self.definitions.entry(key).or_default();
        match overloads
            .iter_mut()
            .find(|existing| same_param_types(existing, &method))
        {
            Some(existing) => *existing = method,
            None => overloads.push(method),
        }
        Ok(self)
    }
}

fn same_param_types(left: &MethodSignatureDescriptor, right: &MethodSignatureDescriptor) -> bool {
    left.params
        .iter()
        .map(|param| &param.ty)
        .eq(right.params.iter().map(|param| &param.ty))
}

/// `true` if `definition`, with the type arguments of the instantiation substituted, takes the
/// parameter types of `instance`
fn matches_instance(
    definition: &MethodSignatureDescriptor,
    instance: &MethodSignatureDescriptor,
    arguments: &[TypeDescriptor],
) -> bool {
    definition.params.len() == instance.params.len()
        && definition
            .params
            .iter()
            .zip(&instance.params)
            .all(|(declared, actual)| declared.ty.substitute_type_args(arguments) == actual.ty)
}

impl ModuleContext for TypeTokenTable {
    fn type_token(&self, ty: &NominalType) -> Result<Token> {
        self.types
            .get(ty)
            .copied()
            .ok_or_else(|| Error::TokenResolutionFailure(ty.fullname()))
    }

    fn method_on_definition(
        &self,
        method: &MethodSignatureDescriptor,
    ) -> Result<Option<MethodSignatureDescriptor>> {
        let Some(TypeDescriptor::GenericInstantiation {
            definition,
            arguments,
        }) = &method.declaring_type
        else {
            return Ok(None);
        };
        let TypeDescriptor::Nominal(owner) = definition.as_ref() else {
            return Err(unsupported_shape!(
                "method '{}' is declared on an instantiation of a non-nominal type",
                method
            ));
        };

        let key = (owner.clone(), method.name.clone(), method.params.len());
        self.definitions
            .get(&key)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|definition| matches_instance(definition, method, arguments))
            })
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::TokenResolutionFailure(format!("{}::{}", owner, method.name)))
    }
}
