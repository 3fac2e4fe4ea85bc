//! Plain values read out of (and written into) raw buffers.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::Colors;

/// Self-contained field value.
///
/// `Object` uses `Vec<(String, Value)>` to preserve declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Values of 128-bit storage; narrower integers use `Int`/`UInt`.
    Int128(i128),
    UInt128(u128),
    Float(f64),
    /// Raw address.
    Pointer(u64),
    Array(Vec<Value>),
    /// Object with ordered fields.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Integer view of the value, wrapping like a C cast.
    ///
    /// Returns `None` for non-integral values.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Bool(b) => Some(b as i128),
            Value::Int(v) => Some(v as i128),
            Value::UInt(v) => Some(v as i128),
            Value::Int128(v) => Some(v),
            Value::UInt128(v) => Some(v as i128),
            Value::Pointer(v) => Some(v as i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(v as f64),
            Value::UInt(v) => Some(v as f64),
            Value::Int128(v) => Some(v as f64),
            Value::UInt128(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        match *self {
            Value::Int(v) => v < 0,
            Value::Int128(v) => v < 0,
            Value::Float(v) => v < 0.0,
            _ => false,
        }
    }

    /// Look up a key of an `Object`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Int128(v) => v.to_string(),
            Value::UInt128(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Pointer(v) => format!("{v:#x}"),
            Value::Array(items) => format!("array of {}", items.len()),
            Value::Object(fields) => format!("object with {} fields", fields.len()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $conv)
                }
            }
        )*
    };
}

value_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    i128 => Int128 as i128,
    u128 => UInt128 as u128,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Int128(v) => serializer.serialize_i128(*v),
            Value::UInt128(v) => serializer.serialize_u128(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Pointer(v) => serializer.serialize_str(&format!("{v:#x}")),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Value {
    /// Format value as colored JSON.
    ///
    /// Keys are blue, pointers green, structure dim.
    pub fn format(&self, pretty: bool, colors: Colors) -> String {
        let mut out = String::new();
        format_value(&mut out, self, &colors, pretty, 0);
        out
    }
}

fn format_value(out: &mut String, value: &Value, c: &Colors, pretty: bool, indent: usize) {
    match value {
        Value::Null => out.push_str(&c.meta("null")),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(v) => out.push_str(&v.to_string()),
        Value::UInt(v) => out.push_str(&v.to_string()),
        Value::Int128(v) => out.push_str(&v.to_string()),
        Value::UInt128(v) => out.push_str(&v.to_string()),
        Value::Float(v) => out.push_str(&format_float(*v)),
        Value::Pointer(v) => out.push_str(&c.type_name(&format!("\"{v:#x}\""))),
        Value::Array(items) => format_array(out, items, c, pretty, indent),
        Value::Object(fields) => format_object(out, fields, c, pretty, indent),
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() {
        // serde_json's rendering, so plain and colored output agree
        serde_json::to_string(&v).unwrap_or_else(|_| v.to_string())
    } else {
        "null".to_string()
    }
}

fn format_array(out: &mut String, items: &[Value], c: &Colors, pretty: bool, indent: usize) {
    punct(out, c, "[");
    if items.is_empty() {
        punct(out, c, "]");
        return;
    }
    let inner = indent + 2;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            punct(out, c, ",");
        }
        newline(out, pretty, inner);
        format_value(out, item, c, pretty, inner);
    }
    newline(out, pretty, indent);
    punct(out, c, "]");
}

fn format_object(
    out: &mut String,
    fields: &[(String, Value)],
    c: &Colors,
    pretty: bool,
    indent: usize,
) {
    punct(out, c, "{");
    if fields.is_empty() {
        punct(out, c, "}");
        return;
    }
    let inner = indent + 2;
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            punct(out, c, ",");
        }
        newline(out, pretty, inner);
        out.push_str(&c.field(&format!("\"{}\"", escape_json_string(key))));
        punct(out, c, ":");
        if pretty {
            out.push(' ');
        }
        format_value(out, value, c, pretty, inner);
    }
    newline(out, pretty, indent);
    punct(out, c, "}");
}

fn punct(out: &mut String, c: &Colors, s: &str) {
    out.push_str(&c.meta(s));
}

fn newline(out: &mut String, pretty: bool, indent: usize) {
    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
