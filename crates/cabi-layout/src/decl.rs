//! Field declarations and their resolved types.
//!
//! A `Decl` is what callers write (`"uint32"`, `Decl::bitfield("uint64", 7)`).
//! Resolving it against a `TypeProvider` yields a `FieldType`, which is what the
//! layout engines consume.

use std::fmt;
use std::sync::Arc;

use cabi_core::{TypeDescriptor, TypeProvider};

use crate::error::{LayoutError, Result};
use crate::schema::CompositeType;

/// Unresolved field declaration.
#[derive(Clone, Debug)]
pub enum Decl {
    /// Symbolic type name, resolved by the provider.
    Name(String),
    Type(TypeDescriptor),
    Bitfield { underlying: Box<Decl>, bits: u32 },
    Array { element: Box<Decl>, length: usize },
    Composite(Arc<CompositeType>),
}

impl Decl {
    /// `underlying name : bits`.
    pub fn bitfield(underlying: impl Into<Decl>, bits: u32) -> Self {
        Self::Bitfield {
            underlying: Box::new(underlying.into()),
            bits,
        }
    }

    /// `element name[length]`.
    pub fn array(element: impl Into<Decl>, length: usize) -> Self {
        Self::Array {
            element: Box::new(element.into()),
            length,
        }
    }

    /// Resolve against `provider`, validating on behalf of `field`.
    pub fn resolve(&self, field: &str, provider: &dyn TypeProvider) -> Result<FieldType> {
        match self {
            Decl::Name(name) => {
                let ty = provider
                    .coerce_type(name)
                    .map_err(|e| LayoutError::invalid_type(field, e.to_string()))?;
                check_descriptor(field, &ty)?;
                Ok(FieldType::Scalar(ty))
            }
            Decl::Type(ty) => {
                check_descriptor(field, ty)?;
                Ok(FieldType::Scalar(ty.clone()))
            }
            Decl::Bitfield { underlying, bits } => {
                let FieldType::Scalar(ty) = underlying.resolve(field, provider)? else {
                    return Err(LayoutError::invalid_type(
                        field,
                        "bitfields need a scalar underlying type",
                    ));
                };
                BitfieldSpec::new(field, ty, *bits).map(FieldType::Bitfield)
            }
            Decl::Array { element, length } => {
                let element = element.resolve(field, provider)?;
                if matches!(element, FieldType::Bitfield(_) | FieldType::Array(_)) {
                    return Err(LayoutError::invalid_type(
                        field,
                        "array elements must be scalars or composites",
                    ));
                }
                if *length == 0 {
                    return Err(LayoutError::invalid_type(field, "zero-length array"));
                }
                Ok(FieldType::Array(ArrayType {
                    element: Box::new(element),
                    length: *length,
                }))
            }
            Decl::Composite(schema) => {
                if schema.size() == 0 {
                    return Err(LayoutError::invalid_type(
                        field,
                        format!("`{}` has zero size", schema.display_name()),
                    ));
                }
                Ok(FieldType::Composite(Arc::clone(schema)))
            }
        }
    }
}

fn check_descriptor(field: &str, ty: &TypeDescriptor) -> Result<()> {
    if ty.indirection() == 0 {
        return Err(LayoutError::invalid_type(
            field,
            format!("`{}` has indirection 0", ty.name()),
        ));
    }
    if ty.alignment() == Some(0) {
        return Err(LayoutError::invalid_type(
            field,
            format!("`{}` has zero alignment", ty.name()),
        ));
    }
    if !ty.is_pointer() && ty.size() == 0 {
        return Err(LayoutError::invalid_type(
            field,
            format!("`{}` has zero size", ty.name()),
        ));
    }
    if let Some(width) = ty.kind().size()
        && !ty.is_pointer()
        && width != ty.size()
    {
        return Err(LayoutError::invalid_type(
            field,
            format!(
                "`{}` is {} bytes, but {} values take {width}",
                ty.name(),
                ty.size(),
                ty.kind().name()
            ),
        ));
    }
    Ok(())
}

impl From<&str> for Decl {
    fn from(name: &str) -> Self {
        Decl::Name(name.to_string())
    }
}

impl From<String> for Decl {
    fn from(name: String) -> Self {
        Decl::Name(name)
    }
}

impl From<TypeDescriptor> for Decl {
    fn from(ty: TypeDescriptor) -> Self {
        Decl::Type(ty)
    }
}

impl From<Arc<CompositeType>> for Decl {
    fn from(schema: Arc<CompositeType>) -> Self {
        Decl::Composite(schema)
    }
}

impl From<&Arc<CompositeType>> for Decl {
    fn from(schema: &Arc<CompositeType>) -> Self {
        Decl::Composite(Arc::clone(schema))
    }
}

/// A scalar type narrowed to `bits` bits.
///
/// Not a `TypeDescriptor`, so it can never be handed to the provider for a
/// direct buffer access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitfieldSpec {
    underlying: TypeDescriptor,
    bits: u32,
}

impl BitfieldSpec {
    fn new(field: &str, underlying: TypeDescriptor, bits: u32) -> Result<Self> {
        if underlying.is_pointer() {
            return Err(LayoutError::BitfieldOverflow {
                field: field.to_string(),
                reason: format!("cannot declare a bitfield over pointer type `{underlying}`"),
            });
        }
        if !underlying.kind().is_integer() {
            return Err(LayoutError::invalid_type(
                field,
                format!("bitfield storage `{}` is not an integer type", underlying.name()),
            ));
        }
        if bits == 0 {
            return Err(LayoutError::invalid_type(field, "zero-width bitfield"));
        }
        let capacity = underlying.bit_width();
        if bits as usize > capacity {
            return Err(LayoutError::BitfieldOverflow {
                field: field.to_string(),
                reason: format!(
                    "{bits} bits do not fit in `{}` ({capacity} bits)",
                    underlying.name()
                ),
            });
        }
        Ok(Self { underlying, bits })
    }

    pub fn underlying(&self) -> &TypeDescriptor {
        &self.underlying
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }
}

/// Fixed-length run of `length` elements.
#[derive(Clone, Debug)]
pub struct ArrayType {
    element: Box<FieldType>,
    length: usize,
}

impl ArrayType {
    pub fn element(&self) -> &FieldType {
        &self.element
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// Resolved field type.
#[derive(Clone, Debug)]
pub enum FieldType {
    Scalar(TypeDescriptor),
    Bitfield(BitfieldSpec),
    Array(ArrayType),
    Composite(Arc<CompositeType>),
}

impl FieldType {
    pub fn is_bitfield(&self) -> bool {
        matches!(self, FieldType::Bitfield(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(ty) => write!(f, "{ty}"),
            FieldType::Bitfield(spec) => write!(f, "{}:{}", spec.underlying, spec.bits),
            FieldType::Array(array) => write!(f, "{}[{}]", array.element, array.length),
            FieldType::Composite(schema) => f.write_str(&schema.display_name()),
        }
    }
}
