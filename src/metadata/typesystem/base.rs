use std::fmt;

use strum::{EnumCount, EnumIter};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Possible bytes that represent varioud 'Types' for a signature - from coreclr
pub mod ELEMENT_TYPE {
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    // Generic parameter in a generic type definition, represented as number
    pub const VAR: u8 = 0x13;
    // Generic type instantiation. Followed by type type-arg-count type-1 ... type-n
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
    // Single-dim array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter in a generic method definition,represented as number
    pub const MVAR: u8 = 0x1e;
    // Required modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_REQD: u8 = 0x1f;
    // Optional modifier : followed by a TypeDef or TypeRef token
    pub const CMOD_OPT: u8 = 0x20;
}

/// The built-in types that have a dedicated element-type tag.
///
/// Every kind maps to exactly one tag byte through [`PrimitiveKind::element_type`]; no token is
/// involved when writing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// System.Void - only valid as a return type
    Void,
    /// System.Boolean
    Boolean,
    /// System.Char - UTF-16 code unit
    Char,
    /// System.SByte
    I1,
    /// System.Byte
    U1,
    /// System.Int16
    I2,
    /// System.UInt16
    U2,
    /// System.Int32
    I4,
    /// System.UInt32
    U4,
    /// System.Int64
    I8,
    /// System.UInt64
    U8,
    /// System.Single
    R4,
    /// System.Double
    R8,
    /// System.String
    String,
    /// System.IntPtr
    NativeInt,
    /// System.UIntPtr
    UNativeInt,
    /// System.Object
    Object,
    /// System.TypedReference
    TypedReference,
}

impl PrimitiveKind {
    /// Returns the element-type tag written for this primitive.
    #[must_use]
    pub const fn element_type(self) -> u8 {
        match self {
            PrimitiveKind::Void => ELEMENT_TYPE::VOID,
            PrimitiveKind::Boolean => ELEMENT_TYPE::BOOLEAN,
            PrimitiveKind::Char => ELEMENT_TYPE::CHAR,
            PrimitiveKind::I1 => ELEMENT_TYPE::I1,
            PrimitiveKind::U1 => ELEMENT_TYPE::U1,
            PrimitiveKind::I2 => ELEMENT_TYPE::I2,
            PrimitiveKind::U2 => ELEMENT_TYPE::U2,
            PrimitiveKind::I4 => ELEMENT_TYPE::I4,
            PrimitiveKind::U4 => ELEMENT_TYPE::U4,
            PrimitiveKind::I8 => ELEMENT_TYPE::I8,
            PrimitiveKind::U8 => ELEMENT_TYPE::U8,
            PrimitiveKind::R4 => ELEMENT_TYPE::R4,
            PrimitiveKind::R8 => ELEMENT_TYPE::R8,
            PrimitiveKind::String => ELEMENT_TYPE::STRING,
            PrimitiveKind::NativeInt => ELEMENT_TYPE::I,
            PrimitiveKind::UNativeInt => ELEMENT_TYPE::U,
            PrimitiveKind::Object => ELEMENT_TYPE::OBJECT,
            PrimitiveKind::TypedReference => ELEMENT_TYPE::TYPEDBYREF,
        }
    }

    /// Returns the ILAsm keyword for this primitive
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I1 => "int8",
            PrimitiveKind::U1 => "uint8",
            PrimitiveKind::I2 => "int16",
            PrimitiveKind::U2 => "uint16",
            PrimitiveKind::I4 => "int32",
            PrimitiveKind::U4 => "uint32",
            PrimitiveKind::I8 => "int64",
            PrimitiveKind::U8 => "uint64",
            PrimitiveKind::R4 => "float32",
            PrimitiveKind::R8 => "float64",
            PrimitiveKind::String => "string",
            PrimitiveKind::NativeInt => "native int",
            PrimitiveKind::UNativeInt => "native uint",
            PrimitiveKind::Object => "object",
            PrimitiveKind::TypedReference => "typedref",
        }
    }
}

/// A single dimension of an array
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArrayDimensions {
    /// The size of this dimension
    pub size: Option<u32>,
    /// The lower bound of this dimension (lowest index that can be used to access an element)
    pub lower_bound: Option<i32>,
}

impl fmt::Display for ArrayDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower_bound, self.size) {
            (Some(lower), Some(size)) => {
                let upper = i64::from(lower) + i64::from(size) - 1;
                write!(f, "{}...{}", lower, upper)
            }
            (Some(lower), None) => write!(f, "{}...", lower),
            (None, Some(size)) => write!(f, "{}", size),
            (None, None) => Ok(()),
        }
    }
}

/// A general array: multi-dimensional, or single-dimensional with explicit bounds.
///
/// Signatures built by this crate only write `SZARRAY`; a general array can be described but is
/// always rejected by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    /// The type in the array
    pub element: Box<TypeDescriptor>,
    /// The number of dimensions
    pub rank: u32,
    /// The dimensions (can be less than 'rank', are in order from 0..count)
    pub dimensions: Vec<ArrayDimensions>,
}

/// A class or value type referenced by metadata token.
///
/// The identity is the namespace, name and value-type-ness; the token itself is allocated by the
/// module being built and looked up through [`crate::metadata::module::ModuleContext`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NominalType {
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`, including the generic arity suffix for generic definitions (e.g. ``List`1``)
    pub name: String,
    /// `true` for value types (`VALUETYPE`), `false` for reference types (`CLASS`)
    pub is_value_type: bool,
}

impl NominalType {
    /// Creates a reference type
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NominalType {
            namespace: namespace.into(),
            name: name.into(),
            is_value_type: false,
        }
    }

    /// Creates a value type
    pub fn value_type(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NominalType {
            namespace: namespace.into(),
            name: name.into(),
            is_value_type: true,
        }
    }

    /// Returns `Namespace.Name`, or just `Name` for types in the global namespace
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for NominalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// The scope that declares a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericOrigin {
    /// Declared by the enclosing type, written as `VAR`
    TypeParam,
    /// Declared by the method itself, written as `MVAR`
    MethodParam,
}

impl fmt::Display for GenericOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericOrigin::TypeParam => f.write_str("type"),
            GenericOrigin::MethodParam => f.write_str("method"),
        }
    }
}

/// The generic scope resolved for one signature position.
///
/// Generic parameters may only be written under a context equal to their own origin. Positions
/// that hold no generic parameter, and the arguments of a generic instantiation, are encoded
/// under [`GenericContext::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenericContext {
    /// No generic parameter is expected at this position
    #[default]
    None,
    /// Generic parameters at this position belong to the enclosing type
    TypeParam,
    /// Generic parameters at this position belong to the method
    MethodParam,
}

impl From<GenericOrigin> for GenericContext {
    fn from(origin: GenericOrigin) -> Self {
        match origin {
            GenericOrigin::TypeParam => GenericContext::TypeParam,
            GenericOrigin::MethodParam => GenericContext::MethodParam,
        }
    }
}

/// The closed description of a type reference inside a signature.
///
/// This is the only input shape the encoders accept. It carries no reflection handles: nominal
/// types are identified by name and resolved to tokens by the module collaborator, generic
/// parameters carry their declaring scope and position.
///
/// # Examples
///
/// ```rust
/// use cilsig::metadata::typesystem::{PrimitiveKind, TypeDescriptor};
///
/// // List<int>[]
/// let list = TypeDescriptor::class("System.Collections.Generic", "List`1");
/// let ty = TypeDescriptor::sz_array(TypeDescriptor::generic_inst(
///     list,
///     vec![PrimitiveKind::I4.into()],
/// ));
/// assert_eq!(ty.to_string(), "System.Collections.Generic.List`1<int32>[]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A built-in type with its own element-type tag
    Primitive(PrimitiveKind),
    /// Single dimension array with a zero lower bound
    SzArray(Box<TypeDescriptor>),
    /// Any other array; never encodable
    Array(ArrayShape),
    /// Managed reference to the inner type
    ByRef(Box<TypeDescriptor>),
    /// A generic parameter, identified by scope and position
    GenericParameter {
        /// The scope that declares the parameter
        origin: GenericOrigin,
        /// Zero based position in the declaring scope's parameter list
        position: u32,
    },
    /// A closed instantiation of a generic type definition
    GenericInstantiation {
        /// The generic type definition, must be [`TypeDescriptor::Nominal`]
        definition: Box<TypeDescriptor>,
        /// The type arguments, in declaration order
        arguments: Vec<TypeDescriptor>,
    },
    /// A class or value type referenced through its metadata token
    Nominal(NominalType),
}

impl TypeDescriptor {
    /// `System.Void`
    #[must_use]
    pub fn void() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Void)
    }

    /// `System.Object`
    #[must_use]
    pub fn object() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Object)
    }

    /// A reference type by name
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDescriptor::Nominal(NominalType::class(namespace, name))
    }

    /// A value type by name
    pub fn value_type(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDescriptor::Nominal(NominalType::value_type(namespace, name))
    }

    /// `element[]`
    #[must_use]
    pub fn sz_array(element: TypeDescriptor) -> Self {
        TypeDescriptor::SzArray(Box::new(element))
    }

    /// A general array of the given rank without explicit bounds
    #[must_use]
    pub fn array(element: TypeDescriptor, rank: u32) -> Self {
        Self::array_with_dimensions(element, rank, Vec::new())
    }

    /// A general array with sizes or lower bounds for its leading dimensions
    #[must_use]
    pub fn array_with_dimensions(
        element: TypeDescriptor,
        rank: u32,
        dimensions: Vec<ArrayDimensions>,
    ) -> Self {
        TypeDescriptor::Array(ArrayShape {
            element: Box::new(element),
            rank,
            dimensions,
        })
    }

    /// `pointee&`
    #[must_use]
    pub fn by_ref(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::ByRef(Box::new(pointee))
    }

    /// `!position`, a parameter of the enclosing type
    #[must_use]
    pub fn type_param(position: u32) -> Self {
        TypeDescriptor::GenericParameter {
            origin: GenericOrigin::TypeParam,
            position,
        }
    }

    /// `!!position`, a parameter of the method
    #[must_use]
    pub fn method_param(position: u32) -> Self {
        TypeDescriptor::GenericParameter {
            origin: GenericOrigin::MethodParam,
            position,
        }
    }

    /// `definition<arguments...>`
    #[must_use]
    pub fn generic_inst(definition: TypeDescriptor, arguments: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::GenericInstantiation {
            definition: Box::new(definition),
            arguments,
        }
    }

    /// Returns the wrapped type for arrays and byrefs, `None` for every other shape.
    #[must_use]
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::SzArray(inner) | TypeDescriptor::ByRef(inner) => Some(inner),
            TypeDescriptor::Array(shape) => Some(&shape.element),
            _ => None,
        }
    }

    /// Strips all array and byref wrappers.
    #[must_use]
    pub fn innermost(&self) -> &TypeDescriptor {
        let mut current = self;
        while let Some(inner) = current.element() {
            current = inner;
        }
        current
    }

    /// Returns the origin of the generic parameter under any array and byref wrappers.
    #[must_use]
    pub fn generic_origin(&self) -> Option<GenericOrigin> {
        match self.innermost() {
            TypeDescriptor::GenericParameter { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// `true` if this type is a generic parameter, possibly under array and byref wrappers.
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        self.generic_origin().is_some()
    }

    /// Replaces every type-level generic parameter `!n` with `arguments[n]`.
    ///
    /// This maps a member type of a generic type definition onto an instantiation of that type:
    /// `!0[]` over `List<string>` becomes `string[]`. Method-level parameters and type parameters
    /// without a matching argument are kept as they are.
    #[must_use]
    pub fn substitute_type_args(&self, arguments: &[TypeDescriptor]) -> TypeDescriptor {
        match self {
            TypeDescriptor::GenericParameter {
                origin: GenericOrigin::TypeParam,
                position,
            } => usize::try_from(*position)
                .ok()
                .and_then(|index| arguments.get(index))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeDescriptor::SzArray(inner) => {
                TypeDescriptor::sz_array(inner.substitute_type_args(arguments))
            }
            TypeDescriptor::ByRef(inner) => {
                TypeDescriptor::by_ref(inner.substitute_type_args(arguments))
            }
            TypeDescriptor::Array(shape) => TypeDescriptor::array_with_dimensions(
                shape.element.substitute_type_args(arguments),
                shape.rank,
                shape.dimensions.clone(),
            ),
            TypeDescriptor::GenericInstantiation {
                definition,
                arguments: inner_arguments,
            } => TypeDescriptor::GenericInstantiation {
                definition: definition.clone(),
                arguments: inner_arguments
                    .iter()
                    .map(|argument| argument.substitute_type_args(arguments))
                    .collect(),
            },
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::GenericParameter { .. }
            | TypeDescriptor::Nominal(_) => self.clone(),
        }
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(kind)
    }
}

impl From<NominalType> for TypeDescriptor {
    fn from(nominal: NominalType) -> Self {
        TypeDescriptor::Nominal(nominal)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => f.write_str(kind.keyword()),
            TypeDescriptor::SzArray(element) => write!(f, "{}[]", element),
            TypeDescriptor::Array(shape) => {
                write!(f, "{}[", shape.element)?;
                for index in 0..shape.rank as usize {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    if let Some(dimension) = shape.dimensions.get(index) {
                        write!(f, "{}", dimension)?;
                    }
                }
                f.write_str("]")
            }
            TypeDescriptor::ByRef(pointee) => write!(f, "{}&", pointee),
            TypeDescriptor::GenericParameter { origin, position } => match origin {
                GenericOrigin::TypeParam => write!(f, "!{}", position),
                GenericOrigin::MethodParam => write!(f, "!!{}", position),
            },
            TypeDescriptor::GenericInstantiation {
                definition,
                arguments,
            } => {
                write!(f, "{}<", definition)?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Nominal(nominal) => write!(f, "{}", nominal),
        }
    }
}
