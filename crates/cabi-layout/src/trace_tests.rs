use std::sync::Arc;

use cabi_core::{Colors, NativeTypes};

use crate::decl::Decl;
use crate::layout::FieldLayout;
use crate::options::LayoutOptions;
use crate::schema::{CompositeKind, CompositeType};
use crate::trace::{LayoutTracer, PadReason, PrintTracer};

fn schema(kind: CompositeKind, fields: Vec<(&str, Decl)>) -> CompositeType {
    let mut schema = CompositeType::with_provider(
        kind,
        LayoutOptions::default(),
        Arc::new(NativeTypes::with_pointer(8, 8)),
    );
    schema.add_fields(fields).unwrap();
    schema
}

#[test]
fn traces_struct_decisions() {
    let s = schema(
        CompositeKind::Struct,
        vec![
            ("a", Decl::bitfield("uint8", 3)),
            ("b", Decl::bitfield("uint8", 2)),
            ("c", Decl::bitfield("int32", 4)),
            ("d", Decl::from("int8")),
            ("e", Decl::array("int16", 2)),
        ],
    );
    let mut tracer = PrintTracer::new(Colors::OFF);

    let layout = s.trace_layout(&mut tracer).unwrap();

    assert_eq!(layout, s.layout());
    assert_eq!(
        tracer.lines(),
        [
            "  group  a @0 unit 1",
            "  place  a @0 bits 0..3",
            "  place  b @0 bits 3..5",
            "  pad    3 before c (bitfield type change)",
            "  group  c @4 unit 4",
            "  place  c @4 bits 0..4",
            "  place  d @8 size 1",
            "  pad    1 before e (alignment)",
            "  place  e @10 2 x 2",
            "  pad    2 (tail)",
            "  done   size 16 align 4",
        ]
    );
}

#[test]
fn traces_union_decisions() {
    let u = schema(
        CompositeKind::Union,
        vec![("n", Decl::from("int32")), ("c", Decl::from("int8"))],
    );
    let mut tracer = PrintTracer::new(Colors::OFF);

    u.trace_layout(&mut tracer).unwrap();

    assert_eq!(
        tracer.output(),
        "  place  n @0 size 4\n  place  c @0 size 1\n  done   size 4 align 4"
    );
}

#[test]
fn zero_byte_padding_is_silent() {
    let mut tracer = PrintTracer::new(Colors::OFF);

    tracer.trace_padding(Some("x"), 0, PadReason::Alignment);
    tracer.trace_padding(None, 0, PadReason::Tail);

    assert!(tracer.lines().is_empty());
}

/// Counts events instead of rendering them.
#[derive(Default)]
struct Counter {
    padding: usize,
    groups: usize,
    fields: usize,
    finished: Option<(usize, usize)>,
}

impl LayoutTracer for Counter {
    fn trace_padding(&mut self, _field: Option<&str>, bytes: usize, _reason: PadReason) {
        self.padding += bytes;
    }

    fn trace_group_start(&mut self, _field: &str, _offset: usize, _unit: usize) {
        self.groups += 1;
    }

    fn trace_field(&mut self, _field: &str, _layout: &FieldLayout) {
        self.fields += 1;
    }

    fn trace_finish(&mut self, size: usize, alignment: usize) {
        self.finished = Some((size, alignment));
    }
}

#[test]
fn custom_tracer_sees_every_event() {
    let s = schema(
        CompositeKind::Struct,
        vec![
            ("a", Decl::bitfield("uint64", 7)),
            ("b", Decl::bitfield("uint64", 60)),
            ("c", Decl::from("int8")),
        ],
    );
    let mut counter = Counter::default();

    s.trace_layout(&mut counter).unwrap();

    assert_eq!(counter.groups, 2);
    assert_eq!(counter.fields, 3);
    assert_eq!(counter.padding, 7);
    assert_eq!(counter.finished, Some((24, 8)));
}
