//! The fixed placeholder policy.
//!
//! Maps a field kind to the action the synthesizer takes for it. Traversal
//! lives in [`crate::synthesizer`]; this table is the only place literals are
//! chosen.

use crate::value::SampleValue;
use protome_schema::{FieldDescriptor, FieldKind};

/// Element appended to repeated string fields.
pub const REPEATED_STRING: &str = "sample_string";
/// Element appended to repeated int32/int64 fields.
pub const REPEATED_INT: i32 = 123;
/// Value of singular int32/int64/uint32/uint64 fields.
pub const SINGULAR_INT: i32 = 12345;
/// Value of singular float fields.
pub const SINGULAR_FLOAT: f32 = 12.34;

/// What to put into a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    /// Use this value as-is
    Literal(SampleValue),
    /// Build a nested message of the referenced type and recurse into it
    Nested,
    /// Pick a declared code of the referenced enum
    EnumCode,
    /// No placeholder is defined; leave the field unset
    Unsupported,
}

/// Policy for a singular field.
pub fn singular(field: &FieldDescriptor) -> Policy {
    match &field.kind {
        FieldKind::Message(_) => Policy::Nested,
        FieldKind::Enum(_) => Policy::EnumCode,
        FieldKind::String => Policy::Literal(SampleValue::String(format!("{}_value", field.name))),
        FieldKind::Bool => Policy::Literal(SampleValue::Bool(true)),
        FieldKind::Int32 => Policy::Literal(SampleValue::Int32(SINGULAR_INT)),
        FieldKind::Int64 => Policy::Literal(SampleValue::Int64(SINGULAR_INT.into())),
        FieldKind::Uint32 => Policy::Literal(SampleValue::Uint32(SINGULAR_INT.unsigned_abs())),
        FieldKind::Uint64 => {
            Policy::Literal(SampleValue::Uint64(SINGULAR_INT.unsigned_abs().into()))
        }
        FieldKind::Float => Policy::Literal(SampleValue::Float(SINGULAR_FLOAT)),
        FieldKind::Double
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Fixed32
        | FieldKind::Fixed64
        | FieldKind::Sfixed32
        | FieldKind::Sfixed64
        | FieldKind::Bytes => Policy::Unsupported,
    }
}

/// Policy for the single representative element of a repeated field.
pub fn repeated_element(kind: &FieldKind) -> Policy {
    match kind {
        FieldKind::Message(_) => Policy::Nested,
        FieldKind::String => Policy::Literal(SampleValue::String(REPEATED_STRING.to_string())),
        FieldKind::Int32 => Policy::Literal(SampleValue::Int32(REPEATED_INT)),
        FieldKind::Int64 => Policy::Literal(SampleValue::Int64(REPEATED_INT.into())),
        FieldKind::Bool => Policy::Literal(SampleValue::Bool(true)),
        _ => Policy::Unsupported,
    }
}

/// Index of the enum value to sample: the second declared value when there is
/// one, since the first is usually the zero/unspecified sentinel.
pub fn enum_value_index(value_count: usize) -> Option<usize> {
    match value_count {
        0 => None,
        1 => Some(0),
        _ => Some(1),
    }
}
