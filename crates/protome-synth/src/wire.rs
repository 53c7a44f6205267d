//! Protobuf binary encoding of populated instances.
//!
//! The encoding follows proto3 wire format:
//! - Each field is encoded as (tag, value) pairs
//! - Tag = (field_number << 3) | wire_type
//! - Wire types: 0=varint, 1=64-bit, 2=length-delimited, 5=32-bit
//! - Repeated numeric fields are packed into a single length-delimited record
//! - Map entries are encoded as repeated `{key = 1, value = 2}` entry messages

use crate::error::{Error, Result};
use crate::value::{SampleMessage, SampleValue};
use protobuf::CodedOutputStream;
use protome_schema::{FieldDescriptor, FieldKind, MessageDescriptor, Schema};

const WIRE_VARINT: u32 = 0;
const WIRE_FIXED64: u32 = 1;
const WIRE_LENGTH_DELIMITED: u32 = 2;
const WIRE_FIXED32: u32 = 5;

/// Length of the gRPC message prefix: compression flag + big-endian length.
pub const GRPC_HEADER_LEN: usize = 5;

fn encode_err(e: protobuf::Error) -> Error {
    Error::ProtobufEncode(e.to_string())
}

/// Encode `message` to protobuf binary format using its descriptor.
pub fn encode(schema: &Schema, message: &SampleMessage) -> Result<Vec<u8>> {
    let descriptor = schema.message(&message.type_name).ok_or_else(|| {
        Error::ProtobufEncode(format!("Unknown message type: {}", message.type_name))
    })?;

    let mut buffer = Vec::new();
    {
        let mut stream = CodedOutputStream::vec(&mut buffer);
        encode_message(schema, descriptor, message, &mut stream)?;
        stream.flush().map_err(encode_err)?;
    }
    Ok(buffer)
}

/// Wrap a payload in the gRPC length-prefixed message frame (uncompressed).
pub fn grpc_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| Error::FrameTooLarge(payload.len()))?;

    let mut framed = Vec::with_capacity(GRPC_HEADER_LEN + payload.len());
    framed.push(0);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

fn encode_message(
    schema: &Schema,
    descriptor: &MessageDescriptor,
    message: &SampleMessage,
    stream: &mut CodedOutputStream,
) -> Result<()> {
    for field in &descriptor.fields {
        let Some(value) = message.get(&field.name) else {
            continue;
        };

        match value {
            SampleValue::Repeated(items) if items.is_empty() => {}
            SampleValue::Repeated(items) if field.kind.is_packable() => {
                let mut payload = Vec::new();
                {
                    let mut packed = CodedOutputStream::vec(&mut payload);
                    for item in items {
                        write_value(schema, field, item, &mut packed)?;
                    }
                    packed.flush().map_err(encode_err)?;
                }
                write_tag(stream, field.number, WIRE_LENGTH_DELIMITED)?;
                stream.write_bytes_no_tag(&payload).map_err(encode_err)?;
            }
            SampleValue::Repeated(items) => {
                for item in items {
                    write_tag(stream, field.number, wire_type(&field.kind))?;
                    write_value(schema, field, item, stream)?;
                }
            }
            SampleValue::Map(entries) => {
                let (key_field, value_field) = map_entry_fields(schema, field)?;
                let entry_type = field.kind.referenced_type().unwrap_or_default();
                for (key, value) in entries {
                    let mut entry = SampleMessage::new(entry_type);
                    entry.set(key_field, key.clone());
                    entry.set(value_field, value.clone());
                    write_tag(stream, field.number, WIRE_LENGTH_DELIMITED)?;
                    write_value(schema, field, &SampleValue::Message(Box::new(entry)), stream)?;
                }
            }
            single => {
                write_tag(stream, field.number, wire_type(&field.kind))?;
                write_value(schema, field, single, stream)?;
            }
        }
    }
    Ok(())
}

fn map_entry_fields<'s>(
    schema: &'s Schema,
    field: &FieldDescriptor,
) -> Result<(&'s FieldDescriptor, &'s FieldDescriptor)> {
    field
        .kind
        .referenced_type()
        .and_then(|type_name| schema.message(type_name))
        .and_then(MessageDescriptor::map_entry_fields)
        .ok_or_else(|| {
            Error::ProtobufEncode(format!(
                "Field '{}' holds map entries but is not a map",
                field.name
            ))
        })
}

fn wire_type(kind: &FieldKind) -> u32 {
    match kind {
        FieldKind::Double | FieldKind::Fixed64 | FieldKind::Sfixed64 => WIRE_FIXED64,
        FieldKind::Float | FieldKind::Fixed32 | FieldKind::Sfixed32 => WIRE_FIXED32,
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => WIRE_LENGTH_DELIMITED,
        _ => WIRE_VARINT,
    }
}

fn write_tag(stream: &mut CodedOutputStream, number: u32, wire_type: u32) -> Result<()> {
    stream
        .write_raw_varint32((number << 3) | wire_type)
        .map_err(encode_err)
}

/// Write one value without its tag.
fn write_value(
    schema: &Schema,
    field: &FieldDescriptor,
    value: &SampleValue,
    stream: &mut CodedOutputStream,
) -> Result<()> {
    let written = match (&field.kind, value) {
        (FieldKind::Bool, SampleValue::Bool(b)) => stream.write_bool_no_tag(*b),
        (FieldKind::Int32, SampleValue::Int32(i)) => stream.write_int32_no_tag(*i),
        (FieldKind::Sint32, SampleValue::Int32(i)) => stream.write_sint32_no_tag(*i),
        (FieldKind::Sfixed32, SampleValue::Int32(i)) => stream.write_sfixed32_no_tag(*i),
        (FieldKind::Int64, SampleValue::Int64(i)) => stream.write_int64_no_tag(*i),
        (FieldKind::Sint64, SampleValue::Int64(i)) => stream.write_sint64_no_tag(*i),
        (FieldKind::Sfixed64, SampleValue::Int64(i)) => stream.write_sfixed64_no_tag(*i),
        (FieldKind::Uint32, SampleValue::Uint32(u)) => stream.write_uint32_no_tag(*u),
        (FieldKind::Fixed32, SampleValue::Uint32(u)) => stream.write_fixed32_no_tag(*u),
        (FieldKind::Uint64, SampleValue::Uint64(u)) => stream.write_uint64_no_tag(*u),
        (FieldKind::Fixed64, SampleValue::Uint64(u)) => stream.write_fixed64_no_tag(*u),
        (FieldKind::Float, SampleValue::Float(f)) => stream.write_float_no_tag(*f),
        (FieldKind::Double, SampleValue::Double(d)) => stream.write_double_no_tag(*d),
        (FieldKind::String, SampleValue::String(s)) => stream.write_string_no_tag(s),
        (FieldKind::Bytes, SampleValue::Bytes(b)) => stream.write_bytes_no_tag(b),
        (FieldKind::Enum(_), SampleValue::Enum(code)) => stream.write_enum_no_tag(*code),
        (FieldKind::Message(type_name), SampleValue::Message(nested)) => {
            let descriptor = schema.message(type_name).ok_or_else(|| {
                Error::ProtobufEncode(format!("Unknown message type: {type_name}"))
            })?;
            let mut bytes = Vec::new();
            {
                let mut nested_stream = CodedOutputStream::vec(&mut bytes);
                encode_message(schema, descriptor, nested, &mut nested_stream)?;
                nested_stream.flush().map_err(encode_err)?;
            }
            stream.write_bytes_no_tag(&bytes)
        }
        (kind, other) => {
            return Err(Error::ProtobufEncode(format!(
                "Field '{}' is {kind} but holds a {} value",
                field.name,
                other.kind_name()
            )))
        }
    };
    written.map_err(encode_err)
}
