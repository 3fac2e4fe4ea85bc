//! Primitive type descriptors.
//!
//! A `TypeDescriptor` is all the layout engine ever sees of a primitive type:
//! its byte size, its alignment and its indirection level. The scalar kind tells
//! the provider how to marshal the bytes.

use std::borrow::Cow;
use std::fmt;

/// Scalar kinds known to the built-in provider.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum ScalarKind {
    Bool = 0,
    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Int64 = 7,
    UInt64 = 8,
    Int128 = 9,
    UInt128 = 10,
    Float32 = 11,
    Float64 = 12,
    /// Address-sized value; size comes from the provider.
    Pointer = 13,
    /// Raw bytes with no scalar interpretation.
    Opaque = 14,
}

impl ScalarKind {
    /// Natural byte size, `None` for kinds whose size is provider-defined.
    pub fn size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::Int128 | Self::UInt128 => Some(16),
            Self::Pointer | Self::Opaque => None,
        }
    }

    /// Canonical type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Int128 => "int128",
            Self::UInt128 => "uint128",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Pointer => "pointer",
            Self::Opaque => "opaque",
        }
    }

    /// Whether values of this kind are two's complement integers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Int128
                | Self::UInt128
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Size, alignment and indirection of one primitive type.
///
/// `indirection == 1` is a direct value; every extra level is one pointer hop.
/// Pointer-typed descriptors are always laid out with the provider's pointer
/// size and alignment, whatever the pointee's own size.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    kind: ScalarKind,
    size: usize,
    /// `None` when the provider leaves alignment unspecified; the layout engine
    /// then falls back to pointer alignment.
    alignment: Option<usize>,
    indirection: u32,
}

impl TypeDescriptor {
    /// Descriptor for a fixed-size scalar kind with natural alignment.
    ///
    /// # Panics
    /// Panics for `Pointer` and `Opaque`, whose size is not intrinsic.
    pub fn scalar(kind: ScalarKind) -> Self {
        let size = kind
            .size()
            .unwrap_or_else(|| panic!("scalar kind `{}` has no intrinsic size", kind.name()));
        Self {
            name: Cow::Borrowed(kind.name()),
            kind,
            size,
            alignment: Some(size),
            indirection: 1,
        }
    }

    /// Descriptor with an explicit name, size and alignment.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        kind: ScalarKind,
        size: usize,
        alignment: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            alignment,
            indirection: 1,
        }
    }

    /// Raw byte blob of `size` bytes.
    pub fn opaque(name: impl Into<Cow<'static, str>>, size: usize, alignment: usize) -> Self {
        Self::new(name, ScalarKind::Opaque, size, Some(alignment))
    }

    /// Same type renamed (e.g. `int` for `int32`).
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// One more level of indirection (`T` → `T *`).
    pub fn pointer_to(mut self) -> Self {
        self.indirection += 1;
        self
    }

    pub fn with_indirection(mut self, indirection: u32) -> Self {
        self.indirection = indirection;
        self
    }

    pub fn with_alignment(mut self, alignment: Option<usize>) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Size of the pointee (or of the value itself for `indirection == 1`).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> Option<usize> {
        self.alignment
    }

    pub fn indirection(&self) -> u32 {
        self.indirection
    }

    pub fn is_pointer(&self) -> bool {
        self.indirection > 1 || self.kind == ScalarKind::Pointer
    }

    /// Width of the value in bits.
    pub fn bit_width(&self) -> usize {
        self.size * 8
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for _ in 1..self.indirection {
            f.write_str(" *")?;
        }
        Ok(())
    }
}
