//! Reading user-supplied JSON payloads into [`SampleMessage`]s.
//!
//! Accepts the proto3 JSON mapping: keys may be the schema field name or its
//! lowerCamelCase JSON name, 64-bit integers may be numbers or strings, enums
//! may be codes or symbolic names, bytes are base64, map fields are objects
//! keyed by the entry key. Unknown keys are ignored and `null` leaves a field
//! unset. At most one member of a oneof may be present.

use crate::error::{Error, Result};
use crate::value::{SampleMessage, SampleValue};
use base64::Engine;
use protome_schema::{FieldDescriptor, FieldKind, MessageDescriptor, Schema};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Parse `value` as an instance of the message type `type_name`.
pub fn from_json(schema: &Schema, type_name: &str, value: &Value) -> Result<SampleMessage> {
    let descriptor = schema.get_message(type_name)?;
    read_message(schema, descriptor, value, &descriptor.name)
}

/// Parse JSON text as an instance of the message type `type_name`.
pub fn from_json_str(schema: &Schema, type_name: &str, text: &str) -> Result<SampleMessage> {
    let value: Value = serde_json::from_str(text)?;
    from_json(schema, type_name, &value)
}

fn shape(path: &str, message: impl Into<String>) -> Error {
    Error::JsonShape {
        path: path.to_string(),
        message: message.into(),
    }
}

fn read_message(
    schema: &Schema,
    descriptor: &MessageDescriptor,
    value: &Value,
    path: &str,
) -> Result<SampleMessage> {
    let object = value
        .as_object()
        .ok_or_else(|| shape(path, format!("expected an object for {}", descriptor.name)))?;

    for key in object.keys() {
        if descriptor.get_field_by_json_key(key).is_none() {
            tracing::debug!("Ignoring unknown field {path}.{key}");
        }
    }

    let mut message = SampleMessage::new(descriptor.full_name.clone());
    let mut oneofs_set: HashMap<&str, &str> = HashMap::new();
    for field in &descriptor.fields {
        let Some(raw) = object.get(&field.name).or_else(|| object.get(&field.json_name)) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }

        let field_path = format!("{path}.{}", field.name);
        if let Some(group) = field.oneof_group.as_deref() {
            if let Some(first) = oneofs_set.insert(group, &field.name) {
                return Err(shape(
                    &field_path,
                    format!("field '{first}' of the same oneof '{group}' is already set"),
                ));
            }
        }

        if let Some(entry_fields) = map_entry(schema, field) {
            let entries = raw
                .as_object()
                .ok_or_else(|| shape(&field_path, "expected an object for a map field"))?;
            read_map(schema, field, entry_fields, entries, &field_path, &mut message)?;
        } else if field.is_repeated() {
            let items = raw
                .as_array()
                .ok_or_else(|| shape(&field_path, "expected an array"))?;
            for (index, item) in items.iter().enumerate() {
                let element = read_value(schema, field, item, &format!("{field_path}[{index}]"))?;
                message.push_repeated(field, element);
            }
        } else {
            message.set(field, read_value(schema, field, raw, &field_path)?);
        }
    }
    Ok(message)
}

/// The key and value fields when `field` is a `map<K, V>`.
fn map_entry<'s>(
    schema: &'s Schema,
    field: &FieldDescriptor,
) -> Option<(&'s FieldDescriptor, &'s FieldDescriptor)> {
    if !field.is_repeated() {
        return None;
    }
    schema
        .message(field.kind.referenced_type()?)?
        .map_entry_fields()
}

fn read_map(
    schema: &Schema,
    field: &FieldDescriptor,
    (key_field, value_field): (&FieldDescriptor, &FieldDescriptor),
    entries: &Map<String, Value>,
    path: &str,
    message: &mut SampleMessage,
) -> Result<()> {
    for (key, value) in entries {
        let entry_path = format!("{path}[{key}]");
        let key = read_map_key(schema, key_field, key, &entry_path)?;
        let value = read_value(schema, value_field, value, &entry_path)?;
        message.insert_map_entry(field, key, value);
    }
    Ok(())
}

/// Map keys arrive as JSON object keys, so integer and bool keys are strings.
fn read_map_key(
    schema: &Schema,
    key_field: &FieldDescriptor,
    key: &str,
    path: &str,
) -> Result<SampleValue> {
    match key_field.kind {
        FieldKind::Bool => match key {
            "true" => Ok(SampleValue::Bool(true)),
            "false" => Ok(SampleValue::Bool(false)),
            other => Err(shape(path, format!("'{other}' is not a boolean map key"))),
        },
        _ => read_value(schema, key_field, &Value::String(key.to_string()), path),
    }
}

fn read_value(
    schema: &Schema,
    field: &FieldDescriptor,
    value: &Value,
    path: &str,
) -> Result<SampleValue> {
    Ok(match &field.kind {
        FieldKind::Bool => SampleValue::Bool(
            value
                .as_bool()
                .ok_or_else(|| shape(path, "expected a boolean"))?,
        ),
        FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => {
            SampleValue::Int32(narrow(read_integer(value, path)?, path)?)
        }
        FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => {
            SampleValue::Int64(narrow(read_integer(value, path)?, path)?)
        }
        FieldKind::Uint32 | FieldKind::Fixed32 => {
            SampleValue::Uint32(narrow(read_integer(value, path)?, path)?)
        }
        FieldKind::Uint64 | FieldKind::Fixed64 => {
            SampleValue::Uint64(narrow(read_integer(value, path)?, path)?)
        }
        FieldKind::Float => SampleValue::Float(read_float(value, path)? as f32),
        FieldKind::Double => SampleValue::Double(read_float(value, path)?),
        FieldKind::String => SampleValue::String(
            value
                .as_str()
                .ok_or_else(|| shape(path, "expected a string"))?
                .to_string(),
        ),
        FieldKind::Bytes => {
            let text = value
                .as_str()
                .ok_or_else(|| shape(path, "expected a base64 string"))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(text)
                .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(text))
                .map_err(|e| shape(path, format!("invalid base64: {e}")))?;
            SampleValue::Bytes(bytes)
        }
        FieldKind::Enum(type_name) => SampleValue::Enum(read_enum(schema, type_name, value, path)?),
        FieldKind::Message(type_name) => {
            let nested = schema
                .message(type_name)
                .ok_or_else(|| shape(path, format!("unknown message type {type_name}")))?;
            SampleValue::Message(Box::new(read_message(schema, nested, value, path)?))
        }
    })
}

fn read_integer(value: &Value, path: &str) -> Result<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 1e19)
                    .map(|f| f as i128)
            })
            .ok_or_else(|| shape(path, format!("{n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| shape(path, format!("'{s}' is not an integer"))),
        _ => Err(shape(path, "expected an integer")),
    }
}

fn narrow<T: TryFrom<i128>>(value: i128, path: &str) -> Result<T> {
    T::try_from(value).map_err(|_| shape(path, format!("{value} is out of range")))
}

fn read_float(value: &Value, path: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| shape(path, format!("{n} is not a number"))),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse::<f64>()
                .map_err(|_| shape(path, format!("'{other}' is not a number"))),
        },
        _ => Err(shape(path, "expected a number")),
    }
}

fn read_enum(schema: &Schema, type_name: &str, value: &Value, path: &str) -> Result<i32> {
    if let Value::String(symbol) = value {
        let enum_type = schema
            .get_enum(type_name)
            .ok_or_else(|| shape(path, format!("unknown enum type {type_name}")))?;
        return enum_type
            .value_by_name(symbol)
            .map(|v| v.number)
            .ok_or_else(|| shape(path, format!("'{symbol}' is not a value of {type_name}")));
    }
    narrow(read_integer(value, path)?, path)
}
