use std::sync::Arc;

use cabi_core::{NativeTypes, TypeDescriptor};

use crate::decl::{Decl, FieldType};
use crate::layout::{Placement, Target};
use crate::options::LayoutOptions;
use crate::schema::{CompositeKind, CompositeType};
use crate::trace::NoopTracer;
use crate::union_layout::compute_union_layout;

fn union(fields: &[(&str, Decl)]) -> CompositeType {
    union_with(fields, LayoutOptions::default())
}

fn union_with(fields: &[(&str, Decl)], options: LayoutOptions) -> CompositeType {
    let provider = Arc::new(NativeTypes::with_pointer(8, 8));
    let mut schema = CompositeType::with_provider(CompositeKind::Union, options, provider);
    schema.add_fields(fields.iter().cloned()).unwrap();
    schema
}

fn blobs() -> Vec<(&'static str, Decl)> {
    vec![
        ("a", TypeDescriptor::opaque("a7", 7, 1).into()),
        ("b", TypeDescriptor::opaque("b3", 3, 4).into()),
        ("c", TypeDescriptor::opaque("c11", 11, 8).into()),
    ]
}

#[test]
fn size_is_largest_member_rounded_to_alignment() {
    let u = union(&blobs());

    assert_eq!(u.size(), 16);
    assert_eq!(u.alignment(), 8);
}

#[test]
fn every_member_starts_at_zero() {
    let u = union(&[
        ("a", "int8".into()),
        ("b", "double".into()),
        ("c", Decl::array("int16", 5)),
    ]);

    assert!(u.fields().all(|(_, info)| info.offset() == 0));
    assert_eq!(u.size(), 16);
    assert_eq!(u.alignment(), 8);
}

#[test]
fn bitfields_are_not_grouped() {
    let u = union(&[
        ("lo", Decl::bitfield("uint32", 3)),
        ("hi", Decl::bitfield("uint32", 5)),
    ]);

    for (_, info) in u.fields() {
        assert_eq!(info.offset(), 0);
        assert_eq!(info.layout().bits().unwrap().start(), 0);
    }
    assert_eq!(u.field("hi").unwrap().layout().bits().unwrap().end(), 5);
    assert_eq!(u.size(), 4);
}

#[test]
fn array_span_skips_trailing_element_padding() {
    let u = union(&[("v", Decl::array(TypeDescriptor::opaque("odd", 3, 2), 3))]);

    let v = u.field("v").unwrap().layout();
    assert_eq!(v.size(), 11);
    assert_eq!(
        v.placement(),
        Placement::Array {
            stride: 4,
            length: 3
        }
    );
    assert_eq!(u.size(), 12);
}

#[test]
fn packed_option_is_ignored() {
    let packed = union_with(&blobs(), LayoutOptions::new().packed(true));

    assert!(packed.is_packed());
    assert_eq!(packed.size(), 16);
    assert_eq!(packed.alignment(), 8);
}

#[test]
fn empty_union() {
    let u = union(&[]);

    assert_eq!(u.size(), 0);
    assert_eq!(u.alignment(), 0);
}

#[test]
fn pointer_member_uses_target_width() {
    let provider = NativeTypes::with_pointer(4, 4);
    let ty = Decl::from("int32 *").resolve("p", &provider).unwrap();
    let byte = Decl::from("int8").resolve("b", &provider).unwrap();
    let fields: Vec<(&str, &FieldType)> = vec![("p", &ty), ("b", &byte)];
    let target = Target {
        pointer_size: 4,
        pointer_alignment: 4,
    };

    let layout = compute_union_layout(&fields, target, &mut NoopTracer).unwrap();

    assert_eq!(layout.size, 4);
    assert_eq!(layout.alignment, 4);
    assert_eq!(layout.fields[0].size(), 4);
    assert_eq!(layout.fields[1].size(), 1);
}
