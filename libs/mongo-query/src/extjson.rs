use bson::Bson;

use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    ExtJson(#[from] bson::extjson::de::Error),
}

/// Decode a comma-joined extended-JSON argument list (without the
/// surrounding brackets) into one `Value` per argument.
///
/// Integers that fit 32 bits decode as `Int32`, larger ones as `Int64`;
/// wrapper objects such as `{"$oid": ...}` or `{"$date": ...}` decode to
/// their native kinds.
pub fn decode_args(args: &str) -> Result<Vec<Value>, DecodeError> {
    let json: serde_json::Value = serde_json::from_str(&format!("[{args}]"))?;
    let items = match json {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| Ok(Value::from(Bson::try_from(item)?)))
        .collect()
}
