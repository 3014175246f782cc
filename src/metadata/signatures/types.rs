use std::fmt;

use bitflags::bitflags;

use crate::metadata::typesystem::{NominalType, TypeDescriptor};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Leading bytes of the signature kinds written by this crate
pub mod SIGNATURE_HEADER {
    pub const FIELD: u8 = 0x06;
    pub const PROPERTY: u8 = 0x08;
}

#[allow(non_snake_case, dead_code, missing_docs)]
/// Calling convention bits of a method signature (II.23.2.1)
pub mod CALLING_CONVENTION {
    pub const DEFAULT: u8 = 0x00;
    pub const C: u8 = 0x01;
    pub const STDCALL: u8 = 0x02;
    pub const THISCALL: u8 = 0x03;
    pub const FASTCALL: u8 = 0x04;
    pub const VARARG: u8 = 0x05;
    pub const GENERIC: u8 = 0x10;
    pub const HASTHIS: u8 = 0x20;
    pub const EXPLICITTHIS: u8 = 0x40;
}

/// The low nibble of a method's calling convention byte.
///
/// Only [`CallingConventionKind::Default`] can be encoded; the others are modeled so that a
/// caller describing an unmanaged or vararg method receives a precise error instead of a
/// silently wrong blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallingConventionKind {
    /// Managed default convention
    #[default]
    Default,
    /// Unmanaged cdecl
    C,
    /// Unmanaged stdcall
    StdCall,
    /// Unmanaged thiscall
    ThisCall,
    /// Unmanaged fastcall
    FastCall,
    /// Managed vararg
    VarArg,
}

impl CallingConventionKind {
    /// Returns the raw low-nibble value
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            CallingConventionKind::Default => CALLING_CONVENTION::DEFAULT,
            CallingConventionKind::C => CALLING_CONVENTION::C,
            CallingConventionKind::StdCall => CALLING_CONVENTION::STDCALL,
            CallingConventionKind::ThisCall => CALLING_CONVENTION::THISCALL,
            CallingConventionKind::FastCall => CALLING_CONVENTION::FASTCALL,
            CallingConventionKind::VarArg => CALLING_CONVENTION::VARARG,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// The high-nibble flags of a method's calling convention byte
    pub struct CallingConventionFlags: u8 {
        /// Instance method, an implicit `this` is passed
        const HAS_THIS = CALLING_CONVENTION::HASTHIS;
        /// The `this` parameter is listed explicitly in the parameter list
        const EXPLICIT_THIS = CALLING_CONVENTION::EXPLICITTHIS;
        /// Generic method, the generic arity follows the convention byte
        const GENERIC = CALLING_CONVENTION::GENERIC;
    }
}

/// A custom modifier attached to one signature position.
///
/// Within a position all required modifiers are written before all optional ones, each group in
/// the order it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomModifier {
    /// `modreq` when true, `modopt` otherwise
    pub is_required: bool,
    /// The modifier type, must be [`TypeDescriptor::Nominal`]
    pub modifier_type: TypeDescriptor,
}

impl CustomModifier {
    /// A required modifier (`modreq`)
    #[must_use]
    pub fn required(modifier_type: NominalType) -> Self {
        CustomModifier {
            is_required: true,
            modifier_type: TypeDescriptor::Nominal(modifier_type),
        }
    }

    /// An optional modifier (`modopt`)
    #[must_use]
    pub fn optional(modifier_type: NominalType) -> Self {
        CustomModifier {
            is_required: false,
            modifier_type: TypeDescriptor::Nominal(modifier_type),
        }
    }
}

/// A typed signature position (return type, parameter, field or property type) and its
/// custom modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDescriptor {
    /// The type at this position
    pub ty: TypeDescriptor,
    /// Custom modifiers, in source order
    pub modifiers: Vec<CustomModifier>,
}

impl ParamDescriptor {
    /// A position without modifiers
    #[must_use]
    pub fn new(ty: TypeDescriptor) -> Self {
        ParamDescriptor {
            ty,
            modifiers: Vec::new(),
        }
    }

    /// Adds a custom modifier
    #[must_use]
    pub fn modifier(mut self, modifier: CustomModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Adds a required modifier
    #[must_use]
    pub fn modreq(self, modifier_type: NominalType) -> Self {
        self.modifier(CustomModifier::required(modifier_type))
    }

    /// Adds an optional modifier
    #[must_use]
    pub fn modopt(self, modifier_type: NominalType) -> Self {
        self.modifier(CustomModifier::optional(modifier_type))
    }
}

impl From<TypeDescriptor> for ParamDescriptor {
    fn from(ty: TypeDescriptor) -> Self {
        ParamDescriptor::new(ty)
    }
}

/// The parameter and return types of a method's counterpart on the other side of a generic type
/// instantiation.
///
/// A method written as seen through an instantiation (`List<int>.Add`) carries the types of the
/// same method on the generic type definition (`List<T>.Add`). A definition-level method written
/// on behalf of an instantiation carries the instance types instead, see
/// [`MethodSignatureDescriptor::for_instance`]. The shadow is only consulted to decide whether a
/// generic parameter belongs to the method or to the type; it is never written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodShadow {
    /// Return type of the counterpart, `None` for void
    pub return_type: Option<TypeDescriptor>,
    /// Parameter types of the counterpart
    pub params: Vec<TypeDescriptor>,
}

impl MethodShadow {
    /// The return and parameter types of `method`, without modifiers
    #[must_use]
    pub fn of(method: &MethodSignatureDescriptor) -> Self {
        MethodShadow {
            return_type: method.return_param.as_ref().map(|ret| ret.ty.clone()),
            params: method.params.iter().map(|param| param.ty.clone()).collect(),
        }
    }
}

/// Describes a method signature to be written (II.23.2.1).
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::signatures::MethodSignatureDescriptor;
/// use cilsig::metadata::typesystem::{PrimitiveKind, TypeDescriptor};
///
/// // instance !!0 Convert<T>(string)
/// let method = MethodSignatureDescriptor::new("Convert")
///     .instance()
///     .generic(1)
///     .returns(TypeDescriptor::method_param(0))
///     .param(PrimitiveKind::String.into());
///
/// assert!(method.is_generic());
/// assert_eq!(method.params.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSignatureDescriptor {
    /// Method name, used for diagnostics and definition lookups
    pub name: String,
    /// The type declaring the method, if known
    pub declaring_type: Option<TypeDescriptor>,
    /// The calling convention kind (low nibble)
    pub kind: CallingConventionKind,
    /// The calling convention flags (high nibble)
    pub flags: CallingConventionFlags,
    /// Number of generic parameters declared by the method, only written when `GENERIC` is set
    pub generic_arity: u32,
    /// The return position, `None` for void
    pub return_param: Option<ParamDescriptor>,
    /// The parameters, in declaration order
    pub params: Vec<ParamDescriptor>,
    /// Types of the counterpart across the generic type instantiation, `None` if there is none
    pub shadow: Option<MethodShadow>,
}

impl Default for CallingConventionFlags {
    fn default() -> Self {
        CallingConventionFlags::empty()
    }
}

impl MethodSignatureDescriptor {
    /// Creates a static, non-generic `void` method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        MethodSignatureDescriptor {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the declaring type
    #[must_use]
    pub fn declared_on(mut self, declaring_type: TypeDescriptor) -> Self {
        self.declaring_type = Some(declaring_type);
        self
    }

    /// Marks the method as an instance method (`HASTHIS`)
    #[must_use]
    pub fn instance(mut self) -> Self {
        self.flags |= CallingConventionFlags::HAS_THIS;
        self
    }

    /// Marks the method as generic with `arity` method type parameters
    #[must_use]
    pub fn generic(mut self, arity: u32) -> Self {
        self.flags |= CallingConventionFlags::GENERIC;
        self.generic_arity = arity;
        self
    }

    /// Sets the calling convention kind
    #[must_use]
    pub fn convention(mut self, kind: CallingConventionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the return type
    #[must_use]
    pub fn returns(self, ty: TypeDescriptor) -> Self {
        self.returns_param(ParamDescriptor::new(ty))
    }

    /// Sets the return position including its modifiers
    #[must_use]
    pub fn returns_param(mut self, param: ParamDescriptor) -> Self {
        self.return_param = Some(param);
        self
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(self, ty: TypeDescriptor) -> Self {
        self.param_with(ParamDescriptor::new(ty))
    }

    /// Appends a parameter including its modifiers
    #[must_use]
    pub fn param_with(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Attaches the types of `definition` as this method's shadow
    #[must_use]
    pub fn with_definition(mut self, definition: &MethodSignatureDescriptor) -> Self {
        self.shadow = Some(MethodShadow::of(definition));
        self
    }

    /// Turns this definition-level method into the one written for `instance`.
    ///
    /// Convention, generic arity, types and modifiers stay those of the definition. Name and
    /// declaring type are taken from `instance`, whose types become the shadow.
    #[must_use]
    pub fn for_instance(mut self, instance: &MethodSignatureDescriptor) -> Self {
        self.name.clone_from(&instance.name);
        self.declaring_type.clone_from(&instance.declaring_type);
        self.shadow = Some(MethodShadow::of(instance));
        self
    }

    /// `true` if the method declares its own generic parameters
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.flags.contains(CallingConventionFlags::GENERIC)
    }

    /// `true` if the method takes an implicit `this`
    #[must_use]
    pub fn has_this(&self) -> bool {
        self.flags.contains(CallingConventionFlags::HAS_THIS)
    }
}

impl fmt::Display for MethodSignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaring_type {
            Some(declaring_type) => write!(f, "{}::{}", declaring_type, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSignatureDescriptor {
    /// Field name, used for diagnostics
    pub name: String,
    /// The field type and its modifiers
    pub field: ParamDescriptor,
}

impl FieldSignatureDescriptor {
    /// A field of the given type without modifiers
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        FieldSignatureDescriptor {
            name: name.into(),
            field: ParamDescriptor::new(ty),
        }
    }

    /// Adds a custom modifier to the field type
    #[must_use]
    pub fn modifier(mut self, modifier: CustomModifier) -> Self {
        self.field.modifiers.push(modifier);
        self
    }
}

/// Property signature (II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySignatureDescriptor {
    /// Property name, used for diagnostics
    pub name: String,
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The property type and its modifiers
    pub property: ParamDescriptor,
    /// Index parameters (for indexers)
    pub params: Vec<ParamDescriptor>,
}

impl PropertySignatureDescriptor {
    /// An instance property of the given type without index parameters
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        PropertySignatureDescriptor {
            name: name.into(),
            has_this: true,
            property: ParamDescriptor::new(ty),
            params: Vec::new(),
        }
    }

    /// Marks the property as static
    #[must_use]
    pub fn static_property(mut self) -> Self {
        self.has_this = false;
        self
    }

    /// Appends an index parameter
    #[must_use]
    pub fn index(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }
}
