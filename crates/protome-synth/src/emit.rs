//! Canonical JSON rendering of populated instances.
//!
//! Keys are the schema's own field names, in the order the fields were set.
//! Scalars follow the proto3 JSON mapping (64-bit integers as strings, bytes as
//! base64, non-finite floats as strings) except enums, which are rendered as
//! their integer code. Map fields become objects keyed by the entry key.

use crate::error::Result;
use crate::value::{SampleMessage, SampleValue};
use base64::Engine;
use serde_json::{Map, Number, Value};

/// Convert a populated message into a JSON object.
pub fn to_json(message: &SampleMessage) -> Value {
    let mut object = Map::new();
    for field in message.fields() {
        object.insert(field.name.clone(), value_to_json(&field.value));
    }
    Value::Object(object)
}

/// Pretty-printed canonical text.
pub fn to_canonical_string(message: &SampleMessage) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(message))?)
}

/// Single-line canonical text.
pub fn to_compact_string(message: &SampleMessage) -> Result<String> {
    Ok(serde_json::to_string(&to_json(message))?)
}

fn value_to_json(value: &SampleValue) -> Value {
    match value {
        SampleValue::Bool(b) => Value::Bool(*b),
        SampleValue::Int32(i) => Value::from(*i),
        SampleValue::Int64(i) => Value::String(i.to_string()),
        SampleValue::Uint32(u) => Value::from(*u),
        SampleValue::Uint64(u) => Value::String(u.to_string()),
        // Go through the shortest f32 representation so 12.34 stays 12.34
        SampleValue::Float(f) => float_to_json(f.to_string().parse().unwrap_or(f64::from(*f))),
        SampleValue::Double(d) => float_to_json(*d),
        SampleValue::String(s) => Value::String(s.clone()),
        SampleValue::Bytes(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
        SampleValue::Enum(code) => Value::from(*code),
        SampleValue::Message(nested) => to_json(nested),
        SampleValue::Repeated(items) => Value::Array(items.iter().map(value_to_json).collect()),
        SampleValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (map_key(key), value_to_json(value)))
                .collect(),
        ),
    }
}

/// JSON object keys are always strings, including integer and bool map keys.
fn map_key(key: &SampleValue) -> String {
    match key {
        SampleValue::String(s) => s.clone(),
        SampleValue::Bool(b) => b.to_string(),
        SampleValue::Int32(i) | SampleValue::Enum(i) => i.to_string(),
        SampleValue::Int64(i) => i.to_string(),
        SampleValue::Uint32(u) => u.to_string(),
        SampleValue::Uint64(u) => u.to_string(),
        other => value_to_json(other).to_string(),
    }
}

fn float_to_json(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(number) => Value::Number(number),
        None if value.is_nan() => Value::String("NaN".to_string()),
        None if value.is_sign_positive() => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}
