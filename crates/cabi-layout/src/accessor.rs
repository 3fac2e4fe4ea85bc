//! Per-field readers and writers.
//!
//! Each declared field gets a `FieldAccessor` when the schema is laid out. Plain
//! fields hand the buffer straight to the type provider; bitfields load their
//! whole storage unit, edit the field's bits and store the unit back, so that
//! sibling bitfields sharing the unit are left intact.

use std::sync::Arc;

use cabi_core::{TypeDescriptor, TypeError, TypeProvider, Value};

use crate::bits::{extract, insert, narrow, raw_bits};
use crate::decl::FieldType;
use crate::error::{LayoutError, Result};
use crate::layout::{BitPlacement, FieldLayout, Placement};
use crate::schema::CompositeType;

#[derive(Clone, Debug)]
pub enum FieldAccessor {
    Plain {
        offset: usize,
        ty: TypeDescriptor,
    },
    Bitfield {
        offset: usize,
        unit: TypeDescriptor,
        bits: BitPlacement,
        signed: bool,
    },
    Array {
        offset: usize,
        stride: usize,
        length: usize,
        /// Accessor for one element, relative to the element's first byte.
        element: Box<FieldAccessor>,
    },
    Composite {
        offset: usize,
        schema: Arc<CompositeType>,
    },
}

impl FieldAccessor {
    pub(crate) fn new(ty: &FieldType, layout: &FieldLayout, provider: &dyn TypeProvider) -> Self {
        Self::at(ty, layout.offset(), layout.placement(), provider)
    }

    fn at(
        ty: &FieldType,
        offset: usize,
        placement: Placement,
        provider: &dyn TypeProvider,
    ) -> Self {
        match (ty, placement) {
            (FieldType::Bitfield(spec), Placement::Bitfield(bits)) => FieldAccessor::Bitfield {
                offset,
                unit: spec.underlying().clone(),
                bits,
                signed: provider.is_signed(spec.underlying()),
            },
            (FieldType::Array(array), Placement::Array { stride, length }) => FieldAccessor::Array {
                offset,
                stride,
                length,
                element: Box::new(Self::at(array.element(), 0, Placement::Plain, provider)),
            },
            (FieldType::Composite(schema), _) => FieldAccessor::Composite {
                offset,
                schema: Arc::clone(schema),
            },
            (FieldType::Scalar(ty), _) => FieldAccessor::Plain {
                offset,
                ty: ty.clone(),
            },
            (ty, placement) => unreachable!("{ty} laid out as {placement:?}"),
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            FieldAccessor::Plain { offset, .. }
            | FieldAccessor::Bitfield { offset, .. }
            | FieldAccessor::Array { offset, .. }
            | FieldAccessor::Composite { offset, .. } => *offset,
        }
    }

    /// Read the field's value out of `buf`.
    pub fn get(&self, field: &str, provider: &dyn TypeProvider, buf: &[u8]) -> Result<Value> {
        match self {
            FieldAccessor::Plain { offset, ty } => provider
                .read(buf, *offset, ty)
                .map_err(|e| LayoutError::access(field, e)),
            FieldAccessor::Bitfield {
                offset,
                unit,
                bits,
                signed,
            } => {
                let storage = read_unit(field, provider, buf, *offset, unit)?;
                let width = unit.bit_width() as u32;
                Ok(narrow(extract(storage, *bits), bits.width(), width, *signed))
            }
            FieldAccessor::Array {
                offset,
                stride,
                length,
                element,
            } => (0..*length)
                .map(|i| {
                    let start = offset + i * stride;
                    element.get(field, provider, tail(field, buf, start)?)
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            FieldAccessor::Composite { offset, schema } => {
                let bytes = window(field, buf, *offset, schema.size())?;
                schema.read_object(bytes)
            }
        }
    }

    /// Store `value` into `buf`.
    pub fn set(
        &self,
        field: &str,
        provider: &dyn TypeProvider,
        buf: &mut [u8],
        value: &Value,
    ) -> Result<()> {
        match self {
            FieldAccessor::Plain { offset, ty } => provider
                .write(buf, *offset, value, ty)
                .map_err(|e| LayoutError::access(field, e)),
            FieldAccessor::Bitfield {
                offset,
                unit,
                bits,
                signed,
            } => {
                let width = unit.bit_width() as u32;
                let new_bits =
                    raw_bits(value, width).ok_or_else(|| mismatch(field, &self.type_name(), value))?;
                // read first: the unit may be shared with sibling bitfields
                let storage = read_unit(field, provider, buf, *offset, unit)?;
                let combined = insert(storage, new_bits, *bits);
                provider
                    .write(buf, *offset, &narrow(combined, width, width, *signed), unit)
                    .map_err(|e| LayoutError::access(field, e))
            }
            FieldAccessor::Array {
                offset,
                stride,
                length,
                element,
            } => {
                let Value::Array(items) = value else {
                    return Err(mismatch(field, &self.type_name(), value));
                };
                if items.len() > *length {
                    return Err(mismatch(field, &self.type_name(), value));
                }
                // staged so a bad element leaves the earlier ones unwritten
                let mut scratch = buf.to_vec();
                for (i, item) in items.iter().enumerate() {
                    let start = offset + i * stride;
                    element.set(field, provider, tail_mut(field, &mut scratch, start)?, item)?;
                }
                buf.copy_from_slice(&scratch);
                Ok(())
            }
            FieldAccessor::Composite { offset, schema } => {
                if !matches!(value, Value::Object(_)) {
                    return Err(mismatch(field, &self.type_name(), value));
                }
                let bytes = window_mut(field, buf, *offset, schema.size())?;
                schema.write_object(bytes, value)
            }
        }
    }

    fn type_name(&self) -> String {
        match self {
            FieldAccessor::Plain { ty, .. } => ty.to_string(),
            FieldAccessor::Bitfield { unit, bits, .. } => format!("{}:{}", unit, bits.width()),
            FieldAccessor::Array {
                element, length, ..
            } => format!("{}[{}]", element.type_name(), length),
            FieldAccessor::Composite { schema, .. } => schema.display_name(),
        }
    }
}

/// Load a whole storage unit as raw bits.
fn read_unit(
    field: &str,
    provider: &dyn TypeProvider,
    buf: &[u8],
    offset: usize,
    unit: &TypeDescriptor,
) -> Result<u128> {
    let value = provider
        .read(buf, offset, unit)
        .map_err(|e| LayoutError::access(field, e))?;
    raw_bits(&value, unit.bit_width() as u32).ok_or_else(|| mismatch(field, unit.name(), &value))
}

fn mismatch(field: &str, type_name: &str, value: &Value) -> LayoutError {
    LayoutError::access(
        field,
        TypeError::ValueMismatch {
            type_name: type_name.to_string(),
            value: value.describe(),
        },
    )
}

fn out_of_bounds(field: &str, offset: usize, size: usize, len: usize) -> LayoutError {
    LayoutError::access(field, TypeError::OutOfBounds { offset, size, len })
}

fn tail<'b>(field: &str, buf: &'b [u8], start: usize) -> Result<&'b [u8]> {
    let len = buf.len();
    buf.get(start..)
        .ok_or_else(|| out_of_bounds(field, start, 0, len))
}

fn tail_mut<'b>(field: &str, buf: &'b mut [u8], start: usize) -> Result<&'b mut [u8]> {
    let len = buf.len();
    buf.get_mut(start..)
        .ok_or_else(|| out_of_bounds(field, start, 0, len))
}

fn window<'b>(field: &str, buf: &'b [u8], offset: usize, size: usize) -> Result<&'b [u8]> {
    let len = buf.len();
    buf.get(offset..offset + size)
        .ok_or_else(|| out_of_bounds(field, offset, size, len))
}

fn window_mut<'b>(field: &str, buf: &'b mut [u8], offset: usize, size: usize) -> Result<&'b mut [u8]> {
    let len = buf.len();
    buf.get_mut(offset..offset + size)
        .ok_or_else(|| out_of_bounds(field, offset, size, len))
}
