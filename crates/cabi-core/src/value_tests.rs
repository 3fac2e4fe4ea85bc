use crate::{Colors, Value};

fn sample() -> Value {
    Value::Object(vec![
        ("a".to_string(), Value::Int(-3)),
        ("b".to_string(), Value::UInt128(1 << 100)),
        ("p".to_string(), Value::Pointer(0x1000)),
        (
            "v".to_string(),
            Value::Array(vec![Value::Float(0.5), Value::Bool(true)]),
        ),
        ("n".to_string(), Value::Object(vec![])),
    ])
}

#[test]
fn serializes_in_declaration_order() {
    let json = serde_json::to_string(&sample()).unwrap();
    insta::assert_snapshot!(json, @r#"{"a":-3,"b":1267650600228229401496703205376,"p":"0x1000","v":[0.5,true],"n":{}}"#);
}

#[test]
fn format_compact_matches_json() {
    let value = sample();
    assert_eq!(
        value.format(false, Colors::OFF),
        serde_json::to_string(&value).unwrap()
    );
}

#[test]
fn format_pretty() {
    insta::assert_snapshot!(sample().format(true, Colors::OFF), @r#"
    {
      "a": -3,
      "b": 1267650600228229401496703205376,
      "p": "0x1000",
      "v": [
        0.5,
        true
      ],
      "n": {}
    }
    "#);
}

#[test]
fn format_colored_keys() {
    let value = Value::Object(vec![("x".to_string(), Value::Null)]);
    let out = value.format(false, Colors::ON);
    assert!(out.contains("\x1b[34m\"x\"\x1b[0m"));
    assert!(out.contains("\x1b[2mnull\x1b[0m"));
}

#[test]
fn integer_views_wrap() {
    assert_eq!(Value::UInt(u64::MAX).as_i128(), Some(u64::MAX as i128));
    assert_eq!(Value::Bool(true).as_i128(), Some(1));
    assert_eq!(Value::Float(1.0).as_i128(), None);
    assert_eq!(Value::Int(2).as_f64(), Some(2.0));
}

#[test]
fn from_primitives() {
    assert_eq!(Value::from(-1i8), Value::Int(-1));
    assert_eq!(Value::from(7u16), Value::UInt(7));
    assert_eq!(Value::from(vec![1u8, 2]), Value::Array(vec![Value::UInt(1), Value::UInt(2)]));
    assert_eq!(Value::from(-5i128), Value::Int128(-5));
}

#[test]
fn object_lookup() {
    let value = sample();
    assert_eq!(value.get("a"), Some(&Value::Int(-3)));
    assert_eq!(value.get("missing"), None);
    assert_eq!(Value::Int(1).get("a"), None);
}

#[test]
fn colors_off_renders_plain_text() {
    assert_eq!(Colors::default(), Colors::OFF);
    assert_eq!(Colors::new(true), Colors::ON);
    assert!(!Colors::OFF.is_enabled());
    assert_eq!(Colors::OFF.field("x"), "x");
    assert_eq!(Colors::ON.meta("x"), "\x1b[2mx\x1b[0m");
}
