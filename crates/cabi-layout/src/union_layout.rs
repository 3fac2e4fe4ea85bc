//! Union layout engine.
//!
//! Every member sits at offset 0. The union is as large as its largest member
//! and as aligned as its most aligned member. Bitfields are not grouped: each
//! occupies the low bits of its own storage unit.

use crate::decl::FieldType;
use crate::error::Result;
use crate::layout::{BitPlacement, FieldLayout, Layout, Placement, Target, padding, unit_of};
use crate::trace::{LayoutTracer, PadReason};

/// Lay out a union.
pub fn compute_union_layout<T: LayoutTracer>(
    fields: &[(&str, &FieldType)],
    target: Target,
    tracer: &mut T,
) -> Result<Layout> {
    let mut size = 0;
    let mut alignment = 0;
    let mut placed = Vec::with_capacity(fields.len());

    for &(name, ty) in fields {
        let unit = unit_of(ty, target);
        let (span, placement) = match ty {
            FieldType::Bitfield(spec) => (
                unit.size,
                Placement::Bitfield(BitPlacement::new(0, spec.bits())),
            ),
            FieldType::Array(array) => {
                let stride = unit.size + padding(unit.size, unit.alignment);
                let span = stride * (array.length() - 1) + unit.size;
                (
                    span,
                    Placement::Array {
                        stride,
                        length: array.length(),
                    },
                )
            }
            FieldType::Scalar(_) | FieldType::Composite(_) => (unit.size, Placement::Plain),
        };

        size = size.max(span);
        alignment = alignment.max(unit.alignment);

        let layout = FieldLayout::at_zero(span, placement);
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
