//! Human-readable layout dump for debugging and documentation.
//!
//! ```text
//! struct Flags (size 16, align 8)
//!      0  a  uint64:7  bits 0..7
//!      8  n  int32     4 bytes
//! ```

use std::fmt::Write as _;

use cabi_core::Colors;

use crate::layout::Placement;
use crate::schema::CompositeType;

/// Render the committed layout of `schema`, one line per field.
pub fn dump(schema: &CompositeType, colors: Colors) -> String {
    let c = &colors;
    let mut out = String::new();

    write!(
        out,
        "{} {}",
        c.type_name(&schema.display_name()),
        c.meta(&format!(
            "(size {}, align {})",
            schema.size(),
            schema.alignment()
        ))
    )
    .unwrap();

    let rows: Vec<(usize, &str, String, String)> = schema
        .fields()
        .map(|(name, info)| {
            let layout = info.layout();
            let detail = match layout.placement() {
                Placement::Plain => match layout.size() {
                    1 => "1 byte".to_string(),
                    n => format!("{n} bytes"),
                },
                Placement::Bitfield(bits) => format!("bits {}..{}", bits.start(), bits.end()),
                Placement::Array { stride, length } => format!("{length} x {stride} bytes"),
            };
            (layout.offset(), name, info.ty().to_string(), detail)
        })
        .collect();

    let name_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|r| r.2.len()).max().unwrap_or(0);

    for (offset, name, ty, detail) in &rows {
        write!(
            out,
            "\n{}  {}  {}  {}",
            c.meta(&format!("{offset:>6}")),
            c.field(&format!("{name:<name_width$}")),
            c.type_name(&format!("{ty:<type_width$}")),
            c.meta(detail)
        )
        .unwrap();
    }

    out
}
