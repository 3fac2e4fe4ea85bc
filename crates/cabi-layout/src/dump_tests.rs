use std::sync::Arc;

use cabi_core::{Colors, NativeTypes};

use crate::decl::Decl;
use crate::dump::dump;
use crate::options::LayoutOptions;
use crate::schema::{CompositeKind, CompositeType};

fn packet() -> CompositeType {
    let mut schema = CompositeType::with_provider(
        CompositeKind::Struct,
        LayoutOptions::default(),
        Arc::new(NativeTypes::with_pointer(8, 8)),
    )
    .named("Packet");
    schema
        .add_fields([
            ("kind", Decl::bitfield("uint8", 3)),
            ("urgent", Decl::bitfield("uint8", 1)),
            ("length", Decl::from("uint16")),
            ("payload", Decl::array("uint8", 5)),
            ("next", Decl::from("void *")),
        ])
        .unwrap();
    schema
}

#[test]
fn dump_struct() {
    insta::assert_snapshot!(dump(&packet(), Colors::OFF), @r"
    struct Packet (size 24, align 8)
         0  kind     uint8:3   bits 0..3
         0  urgent   uint8:1   bits 3..4
         2  length   uint16    2 bytes
         4  payload  uint8[5]  5 x 1 bytes
        16  next     void *    8 bytes
    ");
}

#[test]
fn dump_union() {
    let mut word = CompositeType::new_union().named("Word");
    word.add_fields([("raw", Decl::from("uint32")), ("lo", Decl::from("uint8"))])
        .unwrap();

    insta::assert_snapshot!(dump(&word, Colors::OFF), @r"
    union Word (size 4, align 4)
         0  raw  uint32  4 bytes
         0  lo   uint8   1 byte
    ");
}

#[test]
fn dump_nested_and_anonymous() {
    let mut inner = CompositeType::new_struct();
    inner.add_field("x", "double").unwrap();
    let inner = Arc::new(inner);
    let mut outer = CompositeType::new_struct().named("Outer");
    outer
        .add_fields([("tag", Decl::from("int8")), ("pos", Decl::from(&inner))])
        .unwrap();

    insta::assert_snapshot!(dump(&inner, Colors::OFF), @r"
    struct (size 8, align 8)
         0  x  double  8 bytes
    ");
    insta::assert_snapshot!(dump(&outer, Colors::OFF), @r"
    struct Outer (size 16, align 8)
         0  tag  int8    1 byte
         8  pos  struct  8 bytes
    ");
}

#[test]
fn dump_empty() {
    let empty = CompositeType::new_struct().named("Empty");

    insta::assert_snapshot!(dump(&empty, Colors::OFF), @"struct Empty (size 0, align 0)");
}

#[test]
fn dump_with_colors() {
    let out = dump(&packet(), Colors::ON);

    assert!(out.contains("\x1b[32mstruct Packet\x1b[0m"));
    assert!(out.contains("\x1b[34mkind   \x1b[0m"));
    assert!(out.contains("\x1b[2mbits 0..3\x1b[0m"));
}
