//! Declarative schema loading.
//!
//! ```json
//! { "kind": "struct", "name": "Flags", "packed": false,
//!   "fields": [ { "name": "a", "type": "uint64", "bits": 7 },
//!               { "name": "v", "type": "int32", "length": 4 },
//!               { "name": "inner", "type": { "kind": "union", "fields": [] } } ] }
//! ```
//!
//! Type names are resolved by the supplied provider; every field goes through
//! `add_field`, so the usual declaration errors apply.

use std::sync::Arc;

use serde::Deserialize;

use crate::decl::Decl;
use crate::error::{LayoutError, Result};
use crate::options::LayoutOptions;
use crate::schema::{CompositeKind, CompositeType, SharedProvider};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    #[default]
    Struct,
    Union,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    kind: RawKind,
    name: Option<String>,
    #[serde(default)]
    packed: bool,
    alignment: Option<usize>,
    fields: Vec<RawField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
    bits: Option<u32>,
    length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawType {
    Name(String),
    Composite(Box<RawSchema>),
}

impl CompositeType {
    /// Build a schema from its JSON declaration.
    pub fn from_json(json: &str, provider: SharedProvider) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(json)?;
        build(raw, &provider)
    }
}

fn build(raw: RawSchema, provider: &SharedProvider) -> Result<CompositeType> {
    let kind = match raw.kind {
        RawKind::Struct => CompositeKind::Struct,
        RawKind::Union => CompositeKind::Union,
    };
    let options = LayoutOptions::new()
        .packed(raw.packed)
        .alignment(raw.alignment);
    let mut schema = CompositeType::with_provider(kind, options, Arc::clone(provider));
    if let Some(name) = raw.name {
        schema = schema.named(name);
    }

    for field in raw.fields {
        let base = match field.ty {
            RawType::Name(name) => Decl::Name(name),
            RawType::Composite(nested) => Decl::Composite(Arc::new(build(*nested, provider)?)),
        };
        let decl = match (field.bits, field.length) {
            (Some(_), Some(_)) => {
                return Err(LayoutError::invalid_type(
                    &field.name,
                    "a field cannot be both a bitfield and an array",
                ));
            }
            (Some(bits), None) => Decl::bitfield(base, bits),
            (None, Some(length)) => Decl::array(base, length),
            (None, None) => base,
        };
        schema.add_field(field.name, decl)?;
    }
    Ok(schema)
}
