use bson::spec::BinarySubtype;
use bson::Bson;
use chrono::DateTime;

use crate::value::{Document, Value};

// ═══════════════════════════════════════════════════════════════
//  bson → Value
// ═══════════════════════════════════════════════════════════════

impl From<Bson> for Value {
    fn from(bson: Bson) -> Self {
        match bson {
            Bson::Null => Value::Null,
            Bson::Undefined => Value::Undefined,
            Bson::Boolean(b) => Value::Bool(b),
            Bson::Int32(v) => Value::Int32(v),
            Bson::Int64(v) => Value::Int64(v),
            Bson::Double(v) => Value::Float64(v),
            Bson::String(s) => Value::String(s),
            Bson::Decimal128(d) => Value::Decimal(d),
            Bson::ObjectId(oid) => Value::ObjectId(oid),
            Bson::RegularExpression(re) => Value::Regex {
                pattern: re.pattern,
                options: re.options,
            },
            Bson::Binary(bin) => Value::Binary {
                subtype: u8::from(bin.subtype),
                bytes: bin.bytes,
            },
            Bson::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Bson::Document(doc) => Value::Document(Document::from(doc)),
            Bson::DateTime(dt) => match DateTime::from_timestamp_millis(dt.timestamp_millis()) {
                Some(dt) => Value::DateTime(dt),
                None => Value::String(Bson::DateTime(dt).into_relaxed_extjson().to_string()),
            },
            ptr @ Bson::DbPointer(_) => db_pointer(ptr),
            // Store-internal kinds (code, symbol, internal timestamp, min/max key)
            // have no column representation; keep their extended-JSON text.
            other => Value::String(other.into_relaxed_extjson().to_string()),
        }
    }
}

impl From<bson::Document> for Document {
    fn from(doc: bson::Document) -> Self {
        doc.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

/// `DbPointer` keeps its fields private; read them back from the
/// extended-JSON form `{"$dbPointer": {"$ref": ns, "$id": {"$oid": hex}}}`.
fn db_pointer(ptr: Bson) -> Value {
    let json = ptr.into_relaxed_extjson();
    let inner = &json["$dbPointer"];
    let db = inner["$ref"].as_str().unwrap_or_default().to_string();
    let target = inner["$id"]["$oid"]
        .as_str()
        .and_then(|hex| bson::oid::ObjectId::parse_str(hex).ok())
        .map(Value::ObjectId)
        .unwrap_or(Value::Null);
    Value::DbPointer {
        db,
        target: Box::new(target),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Value → bson
// ═══════════════════════════════════════════════════════════════

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Bson::Null,
            Value::Undefined => Bson::Undefined,
            Value::Bool(b) => Bson::Boolean(b),
            Value::Int8(v) => Bson::Int32(i32::from(v)),
            Value::Int16(v) => Bson::Int32(i32::from(v)),
            Value::Int32(v) => Bson::Int32(v),
            Value::Int64(v) => Bson::Int64(v),
            Value::UInt8(v) => Bson::Int32(i32::from(v)),
            Value::UInt16(v) => Bson::Int32(i32::from(v)),
            Value::UInt32(v) => Bson::Int64(i64::from(v)),
            Value::UInt64(v) => match i64::try_from(v) {
                Ok(v) => Bson::Int64(v),
                Err(_) => Bson::Double(v as f64),
            },
            Value::Float32(v) => Bson::Double(f64::from(v)),
            Value::Float64(v) => Bson::Double(v),
            Value::String(s) => Bson::String(s),
            Value::DateTime(dt) => {
                Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis()))
            }
            Value::Decimal(d) => Bson::Decimal128(d),
            Value::Binary { subtype, bytes } => Bson::Binary(bson::Binary {
                subtype: BinarySubtype::from(subtype),
                bytes,
            }),
            Value::Regex { pattern, options } => {
                Bson::RegularExpression(bson::Regex { pattern, options })
            }
            Value::ObjectId(oid) => Bson::ObjectId(oid),
            // DbPointer cannot be constructed outside the bson crate;
            // send the equivalent DBRef shape instead.
            Value::DbPointer { db, target } => {
                let mut doc = bson::Document::new();
                doc.insert("$ref", db);
                doc.insert("$id", Bson::from(*target));
                Bson::Document(doc)
            }
            Value::Document(doc) => Bson::Document(bson::Document::from(doc)),
            Value::Map(map) => Bson::Document(
                map.into_iter().map(|(k, v)| (k, Bson::from(v))).collect(),
            ),
            Value::Array(items) => Bson::Array(items.into_iter().map(Bson::from).collect()),
        }
    }
}

impl From<Document> for bson::Document {
    fn from(doc: Document) -> Self {
        doc.into_iter().map(|(k, v)| (k, Bson::from(v))).collect()
    }
}

/// Single-line relaxed extended JSON.
pub fn to_relaxed_json(value: Value) -> String {
    Bson::from(value).into_relaxed_extjson().to_string()
}
