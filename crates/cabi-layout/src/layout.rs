//! Struct layout engine.
//!
//! Reproduces the Microsoft (VC) rules: every plain field is rounded up to its
//! natural alignment, and consecutive bitfields share one storage unit of their
//! underlying type until it overflows or the type changes. A change of
//! underlying type always pads to the new type's alignment first.
//!
//! The engine is a pure function of the declared field list; schemas rerun it
//! over the whole list on every mutation.

use cabi_core::{TypeDescriptor, TypeProvider};

use crate::decl::FieldType;
use crate::error::{LayoutError, Result};
use crate::trace::{LayoutTracer, PadReason};

/// Platform constants the engines need from the type provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub pointer_size: usize,
    pub pointer_alignment: usize,
}

impl Target {
    pub fn of(provider: &dyn TypeProvider) -> Self {
        Self {
            pointer_size: provider.pointer_size(),
            pointer_alignment: provider.pointer_alignment(),
        }
    }
}

/// Bit position of a bitfield inside its storage unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitPlacement {
    start: u32,
    width: u32,
    /// `width` low bits set, in the storage unit's integer width.
    mask: u128,
}

impl BitPlacement {
    pub(crate) fn new(start: u32, width: u32) -> Self {
        let mask = if width >= 128 {
            u128::MAX
        } else {
            (1u128 << width) - 1
        };
        Self { start, width, mask }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// One past the highest bit.
    pub fn end(&self) -> u32 {
        self.start + self.width
    }

    pub fn mask(&self) -> u128 {
        self.mask
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Plain,
    Bitfield(BitPlacement),
    /// `length` elements, `stride` bytes apart.
    Array { stride: usize, length: usize },
}

/// Where one field lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    offset: usize,
    /// Bytes spanned; for bitfields, the whole storage unit.
    size: usize,
    placement: Placement,
}

impl FieldLayout {
    pub(crate) fn at_zero(size: usize, placement: Placement) -> Self {
        Self {
            offset: 0,
            size,
            placement,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn bits(&self) -> Option<BitPlacement> {
        match self.placement {
            Placement::Bitfield(bits) => Some(bits),
            _ => None,
        }
    }
}

/// Computed aggregate layout, fields in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    pub size: usize,
    pub alignment: usize,
    pub fields: Vec<FieldLayout>,
}

/// Size and natural alignment of one storage slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Unit {
    pub size: usize,
    pub alignment: usize,
}

pub(crate) fn scalar_unit(ty: &TypeDescriptor, target: Target) -> Unit {
    if ty.is_pointer() {
        Unit {
            size: target.pointer_size,
            alignment: target.pointer_alignment,
        }
    } else {
        Unit {
            size: ty.size(),
            alignment: ty.alignment().unwrap_or(target.pointer_alignment),
        }
    }
}

/// Slot of one field, or of one element for arrays.
pub(crate) fn unit_of(ty: &FieldType, target: Target) -> Unit {
    match ty {
        FieldType::Scalar(ty) => scalar_unit(ty, target),
        FieldType::Bitfield(spec) => scalar_unit(spec.underlying(), target),
        FieldType::Array(array) => unit_of(array.element(), target),
        FieldType::Composite(schema) => Unit {
            size: schema.size(),
            alignment: schema.alignment(),
        },
    }
}

/// Bytes needed to bring `size` up to a multiple of `alignment`.
pub(crate) fn padding(size: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return 0;
    }
    (alignment - size % alignment) % alignment
}

/// Bitfield group being filled.
#[derive(Default)]
struct OpenGroup<'a> {
    used_bits: u32,
    last_type: Option<&'a TypeDescriptor>,
    offset: usize,
}

/// Lay out a struct.
pub fn compute_layout<T: LayoutTracer>(
    fields: &[(&str, &FieldType)],
    packed: bool,
    target: Target,
    tracer: &mut T,
) -> Result<Layout> {
    // Pass 1: aggregate alignment
    let mut alignment = 0;
    for (i, (_, ty)) in fields.iter().enumerate() {
        let natural = unit_of(ty, target).alignment;
        alignment = match (i, packed) {
            (0, _) => natural,
            (_, true) => alignment.min(natural),
            (_, false) => alignment.max(natural),
        };
    }

    // Pass 2: offsets
    let mut size = 0;
    let mut group = OpenGroup::default();
    let mut placed = Vec::with_capacity(fields.len());

    for &(name, ty) in fields {
        let layout = match ty {
            FieldType::Bitfield(spec) => {
                let underlying = spec.underlying();
                let unit = scalar_unit(underlying, target);
                let capacity = underlying.bit_width() as u32;
                let mut needed = group.used_bits + spec.bits();

                let type_changed = group.last_type != Some(underlying);
                let first_in_group = group.last_type.is_none_or(|last| {
                    (last.size(), last.alignment()) != (underlying.size(), underlying.alignment())
                }) || needed > capacity;

                if type_changed {
                    let pad = if packed {
                        0
                    } else {
                        padding(size, unit.alignment)
                    };
                    tracer.trace_padding(Some(name), pad, PadReason::BitfieldTypeChange);
                    size += pad;
                }

                if first_in_group {
                    group.used_bits = 0;
                    needed = spec.bits();
                    group.offset = size;
                    size += unit.size;
                    tracer.trace_group_start(name, group.offset, unit.size);
                }

                let bits = BitPlacement::new(group.used_bits, spec.bits());
                group.used_bits = needed;
                group.last_type = Some(underlying);

                FieldLayout {
                    offset: group.offset,
                    size: unit.size,
                    placement: Placement::Bitfield(bits),
                }
            }
            FieldType::Array(array) => {
                group = OpenGroup::default();
                let unit = unit_of(ty, target);
                let first = place(&mut size, name, unit, packed, tracer)?;
                let mut stride = if packed {
                    unit.size
                } else {
                    unit.size + padding(unit.size, unit.alignment)
                };
                for i in 1..array.length() {
                    let offset = place(&mut size, name, unit, packed, tracer)?;
                    if i == 1 {
                        stride = offset - first;
                    }
                }
                FieldLayout {
                    offset: first,
                    size: size - first,
                    placement: Placement::Array {
                        stride,
                        length: array.length(),
                    },
                }
            }
            FieldType::Scalar(_) | FieldType::Composite(_) => {
                // a plain field (pointers included) closes any open bitfield group
                group = OpenGroup::default();
                let unit = unit_of(ty, target);
                let offset = place(&mut size, name, unit, packed, tracer)?;
                FieldLayout {
                    offset,
                    size: unit.size,
                    placement: Placement::Plain,
                }
            }
        };
        tracer.trace_field(name, &layout);
        placed.push(layout);
    }

    if alignment == 0 {
        tracer.trace_finish(0, 0);
        return Ok(Layout {
            size: 0,
            alignment: 0,
            fields: placed,
        });
    }

    let tail = padding(size, alignment);
    tracer.trace_padding(None, tail, PadReason::Tail);
    size += tail;
    tracer.trace_finish(size, alignment);

    Ok(Layout {
        size,
        alignment,
        fields: placed,
    })
}

/// Place one slot after `size`, advancing `size` past it.
fn place<T: LayoutTracer>(
    size: &mut usize,
    name: &str,
    unit: Unit,
    packed: bool,
    tracer: &mut T,
) -> Result<usize> {
    let alignment = if packed { 1 } else { unit.alignment };
    let pad = padding(*size, alignment);
    tracer.trace_padding(Some(name), pad, PadReason::Alignment);
    let offset = *size + pad;
    if !packed && unit.alignment != 0 && offset % unit.alignment != 0 {
        return Err(LayoutError::UnalignedLayout {
            field: name.to_string(),
            offset,
            alignment: unit.alignment,
        });
    }
    *size = offset + unit.size;
    Ok(offset)
}
