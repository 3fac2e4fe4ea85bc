use crate::{NativeTypes, ScalarKind, TypeError, TypeProvider, Value};

#[test]
fn coerce_fixed_width_names() {
    let types = NativeTypes::new();

    let ty = types.coerce_type("uint16").unwrap();
    assert_eq!(ty.kind(), ScalarKind::UInt16);
    assert_eq!(ty.size(), 2);
    assert_eq!(ty.alignment(), Some(2));
    assert_eq!(ty.indirection(), 1);
}

#[test]
fn coerce_c_aliases() {
    let types = NativeTypes::new();

    assert_eq!(types.coerce_type("char").unwrap().kind(), ScalarKind::Int8);
    assert_eq!(types.coerce_type("int").unwrap().kind(), ScalarKind::Int32);
    assert_eq!(types.coerce_type("long").unwrap().size(), 4);
    assert_eq!(types.coerce_type("ulonglong").unwrap().kind(), ScalarKind::UInt64);
    assert_eq!(types.coerce_type("int").unwrap().name(), "int");
}

#[test]
fn coerce_pointer_suffix() {
    let types = NativeTypes::with_pointer(8, 8);

    let ty = types.coerce_type("int32 *").unwrap();
    assert_eq!(ty.kind(), ScalarKind::Int32);
    assert_eq!(ty.indirection(), 2);

    let ty = types.coerce_type("uint8**").unwrap();
    assert_eq!(ty.indirection(), 3);

    let ty = types.coerce_type("void *").unwrap();
    assert_eq!(ty.kind(), ScalarKind::Pointer);
    assert_eq!(ty.size(), 8);
}

#[test]
fn coerce_unknown_fails() {
    let types = NativeTypes::new();

    assert_eq!(
        types.coerce_type("quux"),
        Err(TypeError::UnknownType("quux".to_string()))
    );
    assert!(matches!(
        types.coerce_type("void"),
        Err(TypeError::InvalidDescriptor(_))
    ));
}

#[test]
fn size_t_follows_pointer_width() {
    assert_eq!(NativeTypes::with_pointer(4, 4).coerce_type("size_t").unwrap().size(), 4);
    assert_eq!(NativeTypes::with_pointer(8, 8).coerce_type("size_t").unwrap().size(), 8);
}

#[test]
fn write_then_read_integers() {
    let types = NativeTypes::new();
    let mut buf = types.allocate(16);
    let ty = types.coerce_type("int16").unwrap();

    types.write(&mut buf, 2, &Value::Int(-300), &ty).unwrap();

    assert_eq!(types.read(&buf, 2, &ty).unwrap(), Value::Int(-300));
    assert_eq!(&buf[2..4], &(-300i16).to_ne_bytes());
    assert_eq!(&buf[0..2], &[0, 0]);
}

#[test]
fn write_truncates_like_a_cast() {
    let types = NativeTypes::new();
    let mut buf = types.allocate(1);
    let ty = types.coerce_type("uint8").unwrap();

    types.write(&mut buf, 0, &Value::Int(0x1ff), &ty).unwrap();
    assert_eq!(types.read(&buf, 0, &ty).unwrap(), Value::UInt(0xff));

    types.write(&mut buf, 0, &Value::Int(-1), &ty).unwrap();
    assert_eq!(types.read(&buf, 0, &ty).unwrap(), Value::UInt(255));
}

#[test]
fn floats_round_trip() {
    let types = NativeTypes::new();
    let mut buf = types.allocate(12);
    let float = types.coerce_type("float").unwrap();
    let double = types.coerce_type("double").unwrap();

    types.write(&mut buf, 0, &Value::Float(1.5), &float).unwrap();
    types.write(&mut buf, 4, &Value::Int(3), &double).unwrap();

    assert_eq!(types.read(&buf, 0, &float).unwrap(), Value::Float(1.5));
    assert_eq!(types.read(&buf, 4, &double).unwrap(), Value::Float(3.0));
}

#[test]
fn pointers_use_pointer_width() {
    let types = NativeTypes::with_pointer(4, 4);
    let mut buf = types.allocate(4);
    let ty = types.coerce_type("double *").unwrap();

    types.write(&mut buf, 0, &Value::Pointer(0xdead_beef), &ty).unwrap();
    assert_eq!(types.read(&buf, 0, &ty).unwrap(), Value::Pointer(0xdead_beef));

    types.write(&mut buf, 0, &Value::Null, &ty).unwrap();
    assert_eq!(types.read(&buf, 0, &ty).unwrap(), Value::Pointer(0));
}

#[test]
fn out_of_bounds_is_reported() {
    let types = NativeTypes::new();
    let mut buf = types.allocate(3);
    let ty = types.coerce_type("uint32").unwrap();

    assert_eq!(
        types.read(&buf, 0, &ty),
        Err(TypeError::OutOfBounds {
            offset: 0,
            size: 4,
            len: 3
        })
    );
    assert!(types.write(&mut buf, 2, &Value::UInt(1), &ty).is_err());
    assert_eq!(buf, vec![0, 0, 0]);
}

#[test]
fn mismatched_value_is_rejected() {
    let types = NativeTypes::new();
    let mut buf = types.allocate(4);
    let ty = types.coerce_type("int32").unwrap();

    let err = types
        .write(&mut buf, 0, &Value::Object(vec![]), &ty)
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot store object with 0 fields as `int32`");
}

#[test]
fn signedness_is_probed_and_cached() {
    let types = NativeTypes::new();
    let int = types.coerce_type("int32").unwrap();
    let uint = types.coerce_type("uint32").unwrap();

    assert!(types.is_signed(&int));
    assert!(!types.is_signed(&uint));
    assert!(types.is_signed(&int));
    assert_eq!(types.probed_types(), 2);
}

#[test]
fn bool_and_pointer_are_unsigned() {
    let types = NativeTypes::new();

    assert!(!types.is_signed(&types.coerce_type("bool").unwrap()));
    assert!(!types.is_signed(&types.coerce_type("void *").unwrap()));
    assert!(types.is_signed(&types.coerce_type("double").unwrap()));
}
