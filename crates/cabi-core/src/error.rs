//! Errors raised by type providers.

/// Failure to resolve a type or to move a scalar in or out of a buffer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    /// The provider has no type with this name.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// The access would run past the end of the buffer.
    #[error("access of {size} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        size: usize,
        len: usize,
    },

    /// The value cannot be stored as the given type.
    #[error("cannot store {value} as `{type_name}`")]
    ValueMismatch { type_name: String, value: String },

    /// The descriptor itself is unusable (e.g. zero indirection).
    #[error("invalid type descriptor: {0}")]
    InvalidDescriptor(String),
}
