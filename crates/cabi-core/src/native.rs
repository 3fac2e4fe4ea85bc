//! Built-in type provider for the host's primitive types.
//!
//! Names follow the fixed-width spellings (`int8` … `uint128`, `float`, `double`)
//! plus the usual C aliases. `long` is 4 bytes, as on the Microsoft ABI.
//! Values are stored in native byte order.

use crate::{ScalarKind, SignCache, TypeDescriptor, TypeError, TypeProvider, Value, probe_signed};

/// Provider for the host's native scalars.
#[derive(Debug)]
pub struct NativeTypes {
    pointer_size: usize,
    pointer_alignment: usize,
    signs: SignCache,
}

impl Default for NativeTypes {
    fn default() -> Self {
        Self::with_pointer(size_of::<usize>(), align_of::<usize>())
    }
}

impl NativeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider laying out pointers as `size` bytes aligned to `alignment`,
    /// e.g. `with_pointer(4, 4)` for a 32-bit target.
    pub fn with_pointer(size: usize, alignment: usize) -> Self {
        Self {
            pointer_size: size,
            pointer_alignment: alignment,
            signs: SignCache::new(),
        }
    }

    /// Descriptor of the untyped pointer scalar.
    pub fn pointer(&self) -> TypeDescriptor {
        TypeDescriptor::new(
            "pointer",
            ScalarKind::Pointer,
            self.pointer_size,
            Some(self.pointer_alignment),
        )
    }

    /// Number of descriptors whose signedness has been probed.
    pub fn probed_types(&self) -> usize {
        self.signs.len()
    }

    fn base_type(&self, name: &str) -> Option<TypeDescriptor> {
        let kind = match name {
            "bool" => ScalarKind::Bool,
            "int8" | "char" => ScalarKind::Int8,
            "uint8" | "uchar" | "byte" => ScalarKind::UInt8,
            "int16" | "short" => ScalarKind::Int16,
            "uint16" | "ushort" => ScalarKind::UInt16,
            "int32" | "int" | "long" => ScalarKind::Int32,
            "uint32" | "uint" | "ulong" => ScalarKind::UInt32,
            "int64" | "longlong" => ScalarKind::Int64,
            "uint64" | "ulonglong" => ScalarKind::UInt64,
            "int128" => ScalarKind::Int128,
            "uint128" => ScalarKind::UInt128,
            "float" => ScalarKind::Float32,
            "double" => ScalarKind::Float64,
            "pointer" => return Some(self.pointer()),
            "size_t" => {
                let kind = match self.pointer_size {
                    4 => ScalarKind::UInt32,
                    8 => ScalarKind::UInt64,
                    _ => return None,
                };
                return Some(TypeDescriptor::scalar(kind).named("size_t"));
            }
            _ => return None,
        };
        let ty = TypeDescriptor::scalar(kind);
        Some(if ty.name() == name { ty } else { ty.named(name.to_string()) })
    }

    fn pointer_bytes(&self, value: u64) -> Result<Vec<u8>, TypeError> {
        match self.pointer_size {
            4 => Ok((value as u32).to_ne_bytes().to_vec()),
            8 => Ok(value.to_ne_bytes().to_vec()),
            n => Err(TypeError::InvalidDescriptor(format!(
                "unsupported pointer size {n}"
            ))),
        }
    }
}

impl TypeProvider for NativeTypes {
    fn coerce_type(&self, name: &str) -> Result<TypeDescriptor, TypeError> {
        let trimmed = name.trim();
        let base = trimmed.trim_end_matches(|c: char| c == '*' || c.is_whitespace());
        let stars = trimmed[base.len()..].chars().filter(|&c| c == '*').count() as u32;

        if base == "void" {
            return match stars {
                0 => Err(TypeError::InvalidDescriptor("`void` has no size".to_string())),
                n => Ok(self.pointer().named("void *").with_indirection(n)),
            };
        }

        let ty = self
            .base_type(base)
            .ok_or_else(|| TypeError::UnknownType(name.to_string()))?;
        Ok(ty.with_indirection(1 + stars))
    }

    fn read(&self, buf: &[u8], offset: usize, ty: &TypeDescriptor) -> Result<Value, TypeError> {
        if ty.indirection() == 0 {
            return Err(TypeError::InvalidDescriptor(format!(
                "`{}` has indirection 0",
                ty.name()
            )));
        }
        if ty.is_pointer() {
            let bytes = slice(buf, offset, self.pointer_size)?;
            let addr = match self.pointer_size {
                4 => u32::from_ne_bytes(array(bytes)?) as u64,
                8 => u64::from_ne_bytes(array(bytes)?),
                n => {
                    return Err(TypeError::InvalidDescriptor(format!(
                        "unsupported pointer size {n}"
                    )));
                }
            };
            return Ok(Value::Pointer(addr));
        }

        let bytes = slice(buf, offset, ty.size())?;
        let value = match ty.kind() {
            ScalarKind::Bool => Value::Bool(bytes.iter().any(|&b| b != 0)),
            ScalarKind::Int8 => Value::Int(i8::from_ne_bytes(array(bytes)?) as i64),
            ScalarKind::UInt8 => Value::UInt(u8::from_ne_bytes(array(bytes)?) as u64),
            ScalarKind::Int16 => Value::Int(i16::from_ne_bytes(array(bytes)?) as i64),
            ScalarKind::UInt16 => Value::UInt(u16::from_ne_bytes(array(bytes)?) as u64),
            ScalarKind::Int32 => Value::Int(i32::from_ne_bytes(array(bytes)?) as i64),
            ScalarKind::UInt32 => Value::UInt(u32::from_ne_bytes(array(bytes)?) as u64),
            ScalarKind::Int64 => Value::Int(i64::from_ne_bytes(array(bytes)?)),
            ScalarKind::UInt64 => Value::UInt(u64::from_ne_bytes(array(bytes)?)),
            ScalarKind::Int128 => Value::Int128(i128::from_ne_bytes(array(bytes)?)),
            ScalarKind::UInt128 => Value::UInt128(u128::from_ne_bytes(array(bytes)?)),
            ScalarKind::Float32 => Value::Float(f32::from_ne_bytes(array(bytes)?) as f64),
            ScalarKind::Float64 => Value::Float(f64::from_ne_bytes(array(bytes)?)),
            ScalarKind::Opaque => Value::Array(bytes.iter().map(|&b| Value::UInt(b as u64)).collect()),
            ScalarKind::Pointer => unreachable!("pointer kinds are handled above"),
        };
        Ok(value)
    }

    fn write(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        ty: &TypeDescriptor,
    ) -> Result<(), TypeError> {
        let mismatch = || TypeError::ValueMismatch {
            type_name: ty.to_string(),
            value: value.describe(),
        };
        if ty.indirection() == 0 {
            return Err(TypeError::InvalidDescriptor(format!(
                "`{}` has indirection 0",
                ty.name()
            )));
        }

        let bytes: Vec<u8> = if ty.is_pointer() {
            let addr = match value {
                Value::Null => 0,
                other => other.as_i128().ok_or_else(mismatch)? as u64,
            };
            self.pointer_bytes(addr)?
        } else {
            match ty.kind() {
                ScalarKind::Bool => {
                    let v = value.as_i128().ok_or_else(mismatch)?;
                    vec![(v != 0) as u8]
                }
                ScalarKind::Float32 => {
                    (value.as_f64().ok_or_else(mismatch)? as f32).to_ne_bytes().to_vec()
                }
                ScalarKind::Float64 => value.as_f64().ok_or_else(mismatch)?.to_ne_bytes().to_vec(),
                ScalarKind::Opaque => {
                    let Value::Array(items) = value else {
                        return Err(mismatch());
                    };
                    if items.len() > ty.size() {
                        return Err(mismatch());
                    }
                    items
                        .iter()
                        .map(|item| item.as_i128().map(|b| b as u8).ok_or_else(mismatch))
                        .collect::<Result<_, _>>()?
                }
                kind => {
                    let v = match value.as_i128() {
                        Some(v) => v,
                        None => value.as_f64().ok_or_else(mismatch)? as i128,
                    };
                    integer_bytes(kind, v)
                }
            }
        };

        let dst = slice_mut(buf, offset, bytes.len())?;
        dst.copy_from_slice(&bytes);
        Ok(())
    }

    fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    fn pointer_alignment(&self) -> usize {
        self.pointer_alignment
    }

    fn is_signed(&self, ty: &TypeDescriptor) -> bool {
        self.signs.get_or_probe(ty, || probe_signed(self, ty))
    }
}

/// Truncate `v` to the width of `kind`, like a C cast.
fn integer_bytes(kind: ScalarKind, v: i128) -> Vec<u8> {
    match kind {
        ScalarKind::Int8 | ScalarKind::UInt8 => (v as u8).to_ne_bytes().to_vec(),
        ScalarKind::Int16 | ScalarKind::UInt16 => (v as u16).to_ne_bytes().to_vec(),
        ScalarKind::Int32 | ScalarKind::UInt32 => (v as u32).to_ne_bytes().to_vec(),
        ScalarKind::Int64 | ScalarKind::UInt64 => (v as u64).to_ne_bytes().to_vec(),
        _ => (v as u128).to_ne_bytes().to_vec(),
    }
}

fn slice(buf: &[u8], offset: usize, size: usize) -> Result<&[u8], TypeError> {
    let len = buf.len();
    offset
        .checked_add(size)
        .and_then(|end| buf.get(offset..end))
        .ok_or(TypeError::OutOfBounds { offset, size, len })
}

fn slice_mut(buf: &mut [u8], offset: usize, size: usize) -> Result<&mut [u8], TypeError> {
    let len = buf.len();
    offset
        .checked_add(size)
        .and_then(|end| buf.get_mut(offset..end))
        .ok_or(TypeError::OutOfBounds { offset, size, len })
}

fn array<const N: usize>(bytes: &[u8]) -> Result<[u8; N], TypeError> {
    bytes.try_into().map_err(|_| {
        TypeError::InvalidDescriptor(format!(
            "descriptor size {} does not match scalar width {N}",
            bytes.len()
        ))
    })
}
