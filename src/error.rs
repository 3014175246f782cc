use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! unsupported_shape {
    // Single string version
    ($msg:expr) => {
        crate::Error::UnsupportedTypeShape {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::UnsupportedTypeShape {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error is a deterministic input-validation failure: retrying the same call with the same
/// descriptor produces the same error. When an error is returned while appending to a caller
/// supplied sink, the bytes already written for the in-progress signature are invalid and must be
/// discarded by the caller.
///
/// # Error Categories
///
/// ## Descriptor Errors
/// - [`Error::UnsupportedTypeShape`] - A type shape the signature format cannot express here
/// - [`Error::UnresolvedGenericOrigin`] - A generic parameter reached the encoder without a scope
/// - [`Error::InvalidCallingConvention`] - A calling convention other than standard/instance/generic
///
/// ## Collaborator Errors
/// - [`Error::TokenResolutionFailure`] - The module could not produce a token for a type
/// - [`Error::InvalidToken`] - A token that cannot be written as a `TypeDefOrRef` coded index
///
/// ## Encoding Limits
/// - [`Error::ValueTooLarge`] - A value exceeds the compressed integer range
/// - [`Error::RecursionLimit`] - Type nesting exceeded [`crate::MAX_RECURSION_DEPTH`]
///
/// # Examples
///
/// ```rust
/// use cilsig::{Error, metadata::typesystem::TypeDescriptor, metadata::module::TypeTokenTable};
/// use cilsig::metadata::signatures::encode_typespec_signature;
///
/// let module = TypeTokenTable::new();
/// let multi_dim = TypeDescriptor::array(TypeDescriptor::object(), 2);
///
/// match encode_typespec_signature(&module, &multi_dim) {
///     Err(Error::UnsupportedTypeShape { message, .. }) => println!("rejected: {}", message),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The descriptor contains a shape that cannot be encoded at this position.
    ///
    /// Raised for arrays that are not single-dimensional with a zero lower bound, for generic
    /// instantiations whose definition is not a nominal type, for custom modifiers that do not
    /// name a nominal type, and for method shadows whose arity differs from the method itself.
    /// The error includes the source location where the shape was rejected.
    #[error("Unsupported type shape - {file}:{line}: {message}")]
    UnsupportedTypeShape {
        /// The message to be printed for the rejected shape
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A generic parameter was encoded without a matching generic context.
    ///
    /// Generic parameters must arrive with their scope resolved by the signature builder.
    /// This error is raised when no context applies at all, or when the resolved context
    /// disagrees with the scope recorded on the parameter itself.
    #[error("Unresolved generic origin for parameter !{position} - {reason}")]
    UnresolvedGenericOrigin {
        /// Position of the generic parameter within its declaring scope
        position: u32,
        /// Which rule was violated
        reason: String,
    },

    /// The module collaborator could not produce a token for a type.
    ///
    /// Occurs when a nominal type is referenced by a signature but has not been
    /// registered in the image being built.
    #[error("Failed to resolve a token for type '{0}'")]
    TokenResolutionFailure(String),

    /// The method uses a calling convention this encoder does not write.
    ///
    /// Only the default convention, optionally combined with `HASTHIS` and `GENERIC`,
    /// is supported. The associated value describes the offending method and flags.
    #[error("Invalid calling convention - {0}")]
    InvalidCallingConvention(String),

    /// The token does not belong to the `TypeDef`, `TypeRef` or `TypeSpec` table.
    ///
    /// Only these three tables can be referenced through a `TypeDefOrRef` coded index.
    #[error("Token {0} can not be encoded as a TypeDefOrRef coded index")]
    InvalidToken(Token),

    /// The value exceeds the range of the compressed integer encoding.
    ///
    /// Compressed unsigned integers hold at most `0x1FFF_FFFF`, compressed signed integers
    /// range from `-2^28` to `2^28 - 1`.
    #[error("Value {0} exceeds the compressed integer range")]
    ValueTooLarge(i64),

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow on hostile or cyclic-looking descriptors, nested types are
    /// limited in depth. The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
