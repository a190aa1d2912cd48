use std::fmt;

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::convert::to_relaxed_json;
use crate::value::Value;

/// Scalar column type. Each width is its own type; nothing widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Time,
}

/// Storable scalar produced by [`canonicalize`]; one per present cell
/// until the column type is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    Time(DateTime<Utc>),
}

impl Cell {
    pub fn field_type(&self) -> FieldType {
        match self {
            Cell::Bool(_) => FieldType::Bool,
            Cell::Int8(_) => FieldType::Int8,
            Cell::Int16(_) => FieldType::Int16,
            Cell::Int32(_) => FieldType::Int32,
            Cell::Int64(_) => FieldType::Int64,
            Cell::UInt8(_) => FieldType::UInt8,
            Cell::UInt16(_) => FieldType::UInt16,
            Cell::UInt32(_) => FieldType::UInt32,
            Cell::UInt64(_) => FieldType::UInt64,
            Cell::Float32(_) => FieldType::Float32,
            Cell::Float64(_) => FieldType::Float64,
            Cell::String(_) => FieldType::String,
            Cell::Time(_) => FieldType::Time,
        }
    }
}

/// Default textual form, used when a column degrades to text.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Int8(v) => write!(f, "{v}"),
            Cell::Int16(v) => write!(f, "{v}"),
            Cell::Int32(v) => write!(f, "{v}"),
            Cell::Int64(v) => write!(f, "{v}"),
            Cell::UInt8(v) => write!(f, "{v}"),
            Cell::UInt16(v) => write!(f, "{v}"),
            Cell::UInt32(v) => write!(f, "{v}"),
            Cell::UInt64(v) => write!(f, "{v}"),
            Cell::Float32(v) => write!(f, "{v}"),
            Cell::Float64(v) => write!(f, "{v}"),
            Cell::String(v) => f.write_str(v),
            Cell::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Map a document value onto a storable cell.
///
/// Text, booleans, every numeric width and timestamps pass through;
/// everything else becomes its shell-style rendering, e.g.
/// `ObjectId("…")`, `BinData(0, "…")`, `/pattern/options`, or relaxed
/// extended JSON for documents and arrays.
pub fn canonicalize(value: Value) -> Cell {
    match value {
        Value::Bool(v) => Cell::Bool(v),
        Value::Int8(v) => Cell::Int8(v),
        Value::Int16(v) => Cell::Int16(v),
        Value::Int32(v) => Cell::Int32(v),
        Value::Int64(v) => Cell::Int64(v),
        Value::UInt8(v) => Cell::UInt8(v),
        Value::UInt16(v) => Cell::UInt16(v),
        Value::UInt32(v) => Cell::UInt32(v),
        Value::UInt64(v) => Cell::UInt64(v),
        Value::Float32(v) => Cell::Float32(v),
        Value::Float64(v) => Cell::Float64(v),
        Value::String(v) => Cell::String(v),
        Value::DateTime(v) => Cell::Time(v),

        Value::Null => Cell::String("null".to_string()),
        Value::Undefined => Cell::String("undefined".to_string()),
        Value::ObjectId(oid) => Cell::String(format!(r#"ObjectId("{}")"#, oid.to_hex())),
        Value::Decimal(d) => Cell::String(d.to_string()),
        Value::Regex { pattern, options } => Cell::String(format!("/{pattern}/{options}")),
        Value::Binary { subtype, bytes } => Cell::String(format!(
            r#"BinData({subtype}, "{}")"#,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )),
        Value::DbPointer { db, target } => {
            Cell::String(format!(r#"DBPointer("{db}", {})"#, canonicalize(*target)))
        }
        json @ (Value::Document(_) | Value::Map(_) | Value::Array(_)) => {
            Cell::String(to_relaxed_json(json))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bson::oid::ObjectId;

    use super::*;

    fn text(s: &str) -> Cell {
        Cell::String(s.to_string())
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(canonicalize(Value::Float32(34.5)), Cell::Float32(34.5));
        assert_eq!(canonicalize(Value::from("hello world")), text("hello world"));
        assert_eq!(canonicalize(Value::Bool(true)), Cell::Bool(true));
        assert_eq!(canonicalize(Value::Int32(32)), Cell::Int32(32));
        assert_eq!(canonicalize(Value::Int64(32)), Cell::Int64(32));
        assert_eq!(canonicalize(Value::UInt16(7)), Cell::UInt16(7));
    }

    #[test]
    fn timestamps_stay_native() {
        let now = DateTime::from_timestamp_millis(1_620_586_358_172).unwrap();
        assert_eq!(canonicalize(Value::DateTime(now)), Cell::Time(now));
    }

    #[test]
    fn renders_documents_and_arrays_as_json() {
        let doc = [("a", Value::Int32(20))].into_iter().collect();
        assert_eq!(canonicalize(Value::Document(doc)), text(r#"{"a":20}"#));

        let map = HashMap::from([("b".to_string(), Value::Int32(45))]);
        assert_eq!(canonicalize(Value::Map(map)), text(r#"{"b":45}"#));

        let array = Value::Array(vec![Value::Int32(1), Value::Int32(5)]);
        assert_eq!(canonicalize(array), text("[1,5]"));
    }

    #[test]
    fn renders_bin_data() {
        let bin = Value::Binary {
            subtype: 0,
            bytes: b"hello world".to_vec(),
        };
        assert_eq!(canonicalize(bin), text(r#"BinData(0, "aGVsbG8gd29ybGQ=")"#));
    }

    #[test]
    fn renders_markers() {
        assert_eq!(canonicalize(Value::Undefined), text("undefined"));
        assert_eq!(canonicalize(Value::Null), text("null"));
    }

    #[test]
    fn renders_object_id_and_pointer() {
        let oid = ObjectId::new();
        assert_eq!(
            canonicalize(Value::ObjectId(oid)),
            Cell::String(format!(r#"ObjectId("{}")"#, oid.to_hex()))
        );

        let ptr = Value::DbPointer {
            db: "mydb".into(),
            target: Box::new(Value::ObjectId(oid)),
        };
        assert_eq!(
            canonicalize(ptr),
            Cell::String(format!(r#"DBPointer("mydb", ObjectId("{}"))"#, oid.to_hex()))
        );
    }

    #[test]
    fn renders_regex_and_decimal() {
        let re = Value::Regex {
            pattern: ".+".into(),
            options: "g".into(),
        };
        assert_eq!(canonicalize(re), text("/.+/g"));

        let json = serde_json::json!({ "$numberDecimal": "555" });
        let decimal = Value::from(bson::Bson::try_from(json).unwrap());
        assert_eq!(canonicalize(decimal), text("555"));
    }

    #[test]
    fn display_gives_default_text() {
        assert_eq!(Cell::Int32(52).to_string(), "52");
        assert_eq!(Cell::Bool(false).to_string(), "false");
        let at = DateTime::from_timestamp_millis(5).unwrap();
        assert_eq!(Cell::Time(at).to_string(), "1970-01-01T00:00:00.005Z");
    }
}
