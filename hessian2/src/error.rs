//! Custom error

use std::fmt::Display;
use std::panic::Location;

/// The kind of failure a decode or encode operation can produce.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ErrorKind {
    #[error("Message {0}")]
    Message(String),

    #[error("IO {0}")]
    Io(std::io::Error),

    /// The stream ended before a value was fully read.
    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    /// A byte was encountered that is not a valid tag in the current position.
    #[error("invalid tag byte 0x{0:02x}")]
    InvalidTag(u8),

    /// A typed object or typed map named a class absent from the type map.
    #[error("no host type registered for wire class {0:?}")]
    UnresolvableClass(String),

    /// A back-reference index exceeded the current reference table size.
    #[error("reference index {0} is out of range")]
    ReferenceOutOfRange(u32),

    /// A decoded value could not be assigned to the target host field.
    #[error("field {field:?} expected {expected}, found incompatible value")]
    FieldKindMismatch {
        /// name of the field that failed to convert
        field: String,
        /// description of what the field expects
        expected: &'static str,
    },

    /// An encoder was handed a host kind it cannot represent on the wire.
    #[error("cannot encode value of kind {0}")]
    UnsupportedValue(&'static str),

    /// A numeric value has no legal Hessian encoding (practically unreachable).
    #[error("value has no representable Hessian encoding")]
    EncoderRangeOverflow,

    /// A string or byte chunk exceeded the maximum representable length.
    #[error("value is too long to encode")]
    TooLong,

    /// Found invalid UTF-8 while decoding a string.
    #[error("invalid UTF-8 encoding")]
    InvalidUtf8,
}

/// A codec error, annotated with the call site that raised it.
///
/// Mirrors `original_source/error.go`'s `runtime.Caller`-based
/// `newCodecError`: every error carries the file:line where it was
/// constructed, without needing reflection to get there.
#[derive(Debug, thiserror::Error)]
#[error("{kind} at {location}")]
pub struct Error {
    /// what went wrong
    pub kind: ErrorKind,
    /// where the error was raised
    pub location: &'static Location<'static>,
}

impl Error {
    /// Construct an error from its kind, capturing the caller's location.
    #[track_caller]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn unexpected_eof(what: &'static str) -> Self {
        Self::new(ErrorKind::UnexpectedEof(what))
    }

    #[track_caller]
    pub(crate) fn invalid_tag(tag: u8) -> Self {
        Self::new(ErrorKind::InvalidTag(tag))
    }

    #[track_caller]
    pub(crate) fn too_long() -> Self {
        Self::new(ErrorKind::TooLong)
    }

    #[track_caller]
    pub(crate) fn reference_out_of_range(index: u32) -> Self {
        Self::new(ErrorKind::ReferenceOutOfRange(index))
    }

    #[track_caller]
    pub(crate) fn unresolvable_class(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvableClass(name.into()))
    }

    #[track_caller]
    pub(crate) fn field_kind_mismatch(field: impl Into<String>, expected: &'static str) -> Self {
        Self::new(ErrorKind::FieldKindMismatch {
            field: field.into(),
            expected,
        })
    }

    #[track_caller]
    pub(crate) fn unsupported_value(kind: &'static str) -> Self {
        Self::new(ErrorKind::UnsupportedValue(kind))
    }

    /// Custom error with a message, for callers building on top of this crate.
    #[track_caller]
    pub fn custom<T: Display>(msg: T) -> Self {
        Self::new(ErrorKind::Message(msg.to_string()))
    }
}

impl From<std::io::Error> for Error {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    #[track_caller]
    fn from(_: std::string::FromUtf8Error) -> Self {
        Self::new(ErrorKind::InvalidUtf8)
    }
}

impl From<std::str::Utf8Error> for Error {
    #[track_caller]
    fn from(_: std::str::Utf8Error) -> Self {
        Self::new(ErrorKind::InvalidUtf8)
    }
}
