use thiserror::Error;

/// Failures decoding a canonical binary blob into a [`crate::object::FieldObject`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("unexpected end of buffer while decoding {0}")]
    UnexpectedEof(&'static str),

    #[error("unknown field: type-code {type_code}, field-code {field_code}")]
    UnknownField { type_code: u8, field_code: u8 },

    #[error("duplicate field {0:?} in one object")]
    DuplicateField(crate::field::Field),

    #[error("fields out of canonical (type-code, field-code) order")]
    FieldOrderViolation,

    #[error("variable-length prefix exceeds the maximum encodable length (918744)")]
    VlTooLong,

    #[error("non-canonical amount: mantissa out of [10^15, 10^16) while nonzero")]
    NonCanonicalAmount,

    #[error("object was not terminated by an ObjectEnd marker")]
    MissingObjectEnd,

    #[error("array was not terminated by an ArrayEnd marker")]
    MissingArrayEnd,

    #[error("malformed path set")]
    MalformedPathSet,

    #[error("trailing bytes after decoding a top-level object")]
    TrailingBytes,
}

/// Failures encoding a [`crate::object::FieldObject`] to its canonical binary form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("variable-length value exceeds the maximum encodable length (918744)")]
    VlTooLong,

    #[error("non-canonical amount: mantissa out of [10^15, 10^16) while nonzero")]
    NonCanonicalAmount,

    #[error("value type does not match the field's declared wire type: {0:?}")]
    WireTypeMismatch(crate::field::Field),
}
