use std::sync::Arc;

use cabi_core::NativeTypes;
use indoc::indoc;

use crate::decl::FieldType;
use crate::error::LayoutError;
use crate::schema::{CompositeKind, CompositeType, SharedProvider};

fn provider() -> SharedProvider {
    Arc::new(NativeTypes::with_pointer(8, 8))
}

#[test]
fn loads_struct_declaration() {
    let json = indoc! {r#"
        {
          "name": "Header",
          "fields": [
            { "name": "version", "type": "uint8", "bits": 4 },
            { "name": "flags", "type": "uint8", "bits": 4 },
            { "name": "ids", "type": "uint16", "length": 3 },
            { "name": "next", "type": "Header *" }
          ]
        }
    "#};

    let err = CompositeType::from_json(json, provider()).unwrap_err();
    // self references are not resolvable by name
    assert!(matches!(err, LayoutError::InvalidType { ref field, .. } if field == "next"));

    let json = json.replace("Header *", "void *");
    let schema = CompositeType::from_json(&json, provider()).unwrap();

    assert_eq!(schema.kind(), CompositeKind::Struct);
    assert_eq!(schema.display_name(), "struct Header");
    assert_eq!(
        schema.field_names().collect::<Vec<_>>(),
        ["version", "flags", "ids", "next"]
    );
    assert_eq!(schema.field("flags").unwrap().layout().bits().unwrap().start(), 4);
    assert_eq!(schema.field("ids").unwrap().offset(), 2);
    assert_eq!(schema.field("next").unwrap().offset(), 8);
    assert_eq!(schema.size(), 16);
}

#[test]
fn loads_nested_union() {
    let json = indoc! {r#"
        {
          "kind": "struct",
          "packed": true,
          "alignment": 2,
          "fields": [
            { "name": "tag", "type": "uint8" },
            {
              "name": "body",
              "type": {
                "kind": "union",
                "name": "Body",
                "fields": [
                  { "name": "i", "type": "int32" },
                  { "name": "d", "type": "double" }
                ]
              }
            }
          ]
        }
    "#};

    let schema = CompositeType::from_json(json, provider()).unwrap();

    assert!(schema.is_packed());
    assert_eq!(schema.options().get_alignment(), Some(2));
    assert_eq!(schema.field("body").unwrap().offset(), 1);
    assert_eq!(schema.size(), 9);
    let FieldType::Composite(body) = schema.field("body").unwrap().ty() else {
        panic!("expected composite");
    };
    assert_eq!(body.display_name(), "union Body");
    assert_eq!(body.size(), 8);
    assert!(body.is_frozen());
}

#[test]
fn rejects_bitfield_arrays() {
    let json = r#"{ "fields": [ { "name": "x", "type": "uint8", "bits": 1, "length": 2 } ] }"#;

    let err = CompositeType::from_json(json, provider()).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"field `x` has an invalid type: a field cannot be both a bitfield and an array");
}

#[test]
fn rejects_unknown_keys() {
    let json = r#"{ "fields": [], "pragma": "pack" }"#;

    let err = CompositeType::from_json(json, provider()).unwrap_err();
    assert!(matches!(err, LayoutError::Json(_)));
}

#[test]
fn propagates_declaration_errors() {
    let json = r#"{ "fields": [ { "name": "buffer", "type": "int8" } ] }"#;

    let err = CompositeType::from_json(json, provider()).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidFieldName { .. }));

    let json = r#"{ "fields": [ { "name": "w", "type": "uint8", "bits": 9 } ] }"#;
    let err = CompositeType::from_json(json, provider()).unwrap_err();
    assert!(matches!(err, LayoutError::BitfieldOverflow { .. }));
}
