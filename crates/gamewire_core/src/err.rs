//! Error implementations

use serde::{de, ser};

use crate::marshal::ValidationReport;

/// Custom error object for this library
#[derive(Debug)]
pub enum WireError {
    /// A read ran off the end of the cursor.
    UnexpectedEof { needed: usize, remaining: usize },

    /// A length-prefixed string did not contain valid UTF-8.
    InvalidUtf8,

    /// A count prefix was negative.
    NegativeCount(i32),

    /// The type number cannot be expressed in the one- or two-byte
    /// tag encoding, or falls inside a reserved band.
    TagOutOfRange(i32),

    /// A type number was read off the wire that the registry
    /// knows nothing about.
    UnknownTypeNumber(i16),

    /// A type name with no registry entry.
    UnknownTypeName(String),

    /// The name is already registered.
    DuplicateName(String),

    /// The explicit type number is already held by another name.
    NumberTaken { number: i16, holder: String },

    /// The explicit type number collides with the builtin band.
    BuiltinCollision(i16),

    /// A marshaller has already been bound to this name.
    DoubleBind(String),

    /// The type is registered but no marshaller has been bound to it.
    NotBound(String),

    /// Marshalling was attempted before `validate_and_freeze`.
    NotFrozen,

    /// A mutating registry call was made after `validate_and_freeze`.
    Frozen,

    /// An erased marshaller was handed an instance of the wrong type.
    WrongType { expected: &'static str },

    /// The value does not support the generic serialization fallback.
    NotGenericSerializable(&'static str),

    /// The registry failed completeness validation.
    Validation(ValidationReport),

    /// A generic-codec prefix byte did not match the expected kind.
    PrefixNotMatched(String),

    /// A generic-codec collection delimiter was missing.
    DelimiterNotFound(char),

    /// Catch-all for serde-reported errors in the generic codec.
    Message(String),
}

impl std::error::Error for WireError {}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof { needed, remaining } => write!(
                f,
                "unexpected end of buffer: needed {} bytes, {} remaining",
                needed, remaining
            ),
            Self::InvalidUtf8 => write!(f, "string payload is not valid UTF-8"),
            Self::NegativeCount(c) => write!(f, "negative element count: {}", c),
            Self::TagOutOfRange(t) => write!(f, "type number {} cannot be encoded as a tag", t),
            Self::UnknownTypeNumber(n) => write!(f, "unknown type number: {}", n),
            Self::UnknownTypeName(n) => write!(f, "unknown type name: {}", n),
            Self::DuplicateName(n) => write!(f, "type {} is already registered", n),
            Self::NumberTaken { number, holder } => {
                write!(f, "type number {} is already held by {}", number, holder)
            }
            Self::BuiltinCollision(n) => {
                write!(f, "type number {} is inside the builtin band", n)
            }
            Self::DoubleBind(n) => write!(f, "marshaller for {} is already bound", n),
            Self::NotBound(n) => write!(f, "no marshaller bound for {}", n),
            Self::NotFrozen => write!(f, "registry has not been validated and frozen"),
            Self::Frozen => write!(f, "registry is frozen"),
            Self::WrongType { expected } => {
                write!(f, "marshaller invoked with a value that is not a {}", expected)
            }
            Self::NotGenericSerializable(n) => {
                write!(f, "{} does not support generic serialization", n)
            }
            Self::Validation(report) => write!(f, "{}", report),
            Self::PrefixNotMatched(msg) => write!(f, "prefix not matched: {}", msg),
            Self::DelimiterNotFound(c) => write!(f, "expected delimiter {:?}", c),
            Self::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<ValidationReport> for WireError {
    fn from(report: ValidationReport) -> Self {
        Self::Validation(report)
    }
}

impl ser::Error for WireError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Message(msg.to_string())
    }
}

impl de::Error for WireError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Message(msg.to_string())
    }
}
