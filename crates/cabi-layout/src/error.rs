//! Errors raised while declaring schemas or accessing instances.

use cabi_core::TypeError;

/// Every failure is reported at the call that caused it; nothing is retried and
/// a failed schema mutation leaves the schema untouched.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The schema already backs an instance (or was sealed).
    #[error("cannot declare field `{field}`: schema is frozen")]
    SchemaFrozen { field: String },

    #[error("invalid field name `{name}`: {reason}")]
    InvalidFieldName { name: String, reason: &'static str },

    #[error("field `{field}` has an invalid type: {reason}")]
    InvalidType { field: String, reason: String },

    /// Bit width too large for the storage type, or a bitfield over a pointer.
    #[error("bitfield `{field}`: {reason}")]
    BitfieldOverflow { field: String, reason: String },

    #[error("buffer of {actual} bytes is smaller than the {needed}-byte layout")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Internal invariant: a computed offset is not a multiple of its alignment.
    #[error("field `{field}` placed at offset {offset}, not a multiple of its alignment {alignment}")]
    UnalignedLayout {
        field: String,
        offset: usize,
        alignment: usize,
    },

    #[error("no field named `{0}`")]
    UnknownField(String),

    /// The type provider refused a read or write.
    #[error("field `{field}`: {source}")]
    Access {
        field: String,
        #[source]
        source: TypeError,
    },

    /// A composite value was assigned from an instance of another schema.
    #[error("field `{field}` expects a `{expected}` value, got `{actual}`")]
    SchemaMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LayoutError {
    pub(crate) fn invalid_type(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn access(field: &str, source: TypeError) -> Self {
        Self::Access {
            field: field.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
