//! Tracing infrastructure for debugging layout computation.
//!
//! The layout engines report every placement decision to a `LayoutTracer`.
//! Schema mutations run with `NoopTracer`, whose empty `#[inline(always)]`
//! methods compile away. `PrintTracer` collects one line per decision and is
//! driven by `CompositeType::trace_layout`.

use cabi_core::Colors;

use crate::layout::{FieldLayout, Placement};

/// Why padding bytes were inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadReason {
    /// Round up to the field's natural alignment.
    Alignment,
    /// A bitfield's underlying type differs from the previous bitfield's.
    BitfieldTypeChange,
    /// Round the aggregate size up to its alignment.
    Tail,
}

impl PadReason {
    fn as_str(self) -> &'static str {
        match self {
            PadReason::Alignment => "alignment",
            PadReason::BitfieldTypeChange => "bitfield type change",
            PadReason::Tail => "tail",
        }
    }
}

/// Instrumentation hooks for the layout engines.
///
/// `field` is `None` only for tail padding.
pub trait LayoutTracer {
    /// Called when padding is charged to the running size.
    fn trace_padding(&mut self, field: Option<&str>, bytes: usize, reason: PadReason);

    /// Called when a bitfield opens a fresh storage unit.
    fn trace_group_start(&mut self, field: &str, offset: usize, unit: usize);

    /// Called after a field has been placed.
    fn trace_field(&mut self, field: &str, layout: &FieldLayout);

    /// Called once with the final aggregate size and alignment.
    fn trace_finish(&mut self, size: usize, alignment: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl LayoutTracer for NoopTracer {
    #[inline(always)]
    fn trace_padding(&mut self, _field: Option<&str>, _bytes: usize, _reason: PadReason) {}

    #[inline(always)]
    fn trace_group_start(&mut self, _field: &str, _offset: usize, _unit: usize) {}

    #[inline(always)]
    fn trace_field(&mut self, _field: &str, _layout: &FieldLayout) {}

    #[inline(always)]
    fn trace_finish(&mut self, _size: usize, _alignment: usize) {}
}

/// Tracer that collects a readable log of placement decisions.
pub struct PrintTracer {
    lines: Vec<String>,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(colors: Colors) -> Self {
        Self {
            lines: Vec::new(),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All collected lines, newline separated.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    /// Write the collected lines to stderr.
    pub fn print(&self) {
        for line in &self.lines {
            eprintln!("{line}");
        }
    }
}

impl LayoutTracer for PrintTracer {
    fn trace_padding(&mut self, field: Option<&str>, bytes: usize, reason: PadReason) {
        if bytes == 0 {
            return;
        }
        let c = &self.colors;
        let line = match field {
            Some(name) => format!(
                "  pad    {} before {} {}",
                bytes,
                c.field(name),
                c.meta(&format!("({})", reason.as_str()))
            ),
            None => format!("  pad    {} {}", bytes, c.meta(&format!("({})", reason.as_str()))),
        };
        self.lines.push(line);
    }

    fn trace_group_start(&mut self, field: &str, offset: usize, unit: usize) {
        let c = &self.colors;
        self.lines.push(format!(
            "  group  {} @{} {}",
            c.field(field),
            offset,
            c.meta(&format!("unit {unit}"))
        ));
    }

    fn trace_field(&mut self, field: &str, layout: &FieldLayout) {
        let c = &self.colors;
        let detail = match layout.placement() {
            Placement::Plain => format!("size {}", layout.size()),
            Placement::Bitfield(bits) => format!("bits {}..{}", bits.start(), bits.end()),
            Placement::Array { stride, length } => format!("{length} x {stride}"),
        };
        self.lines.push(format!(
            "  place  {} @{} {}",
            c.field(field),
            layout.offset(),
            c.meta(&detail)
        ));
    }

    fn trace_finish(&mut self, size: usize, alignment: usize) {
        self.lines
            .push(format!("  done   size {size} align {alignment}"));
    }
}
